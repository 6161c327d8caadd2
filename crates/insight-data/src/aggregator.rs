//! Aggregations over the normalized record set.
//!
//! Every function here is a pure function of a record slice: channel,
//! recruiter and department rollups, the per-vacancy detail table, and the
//! daily activity timeline. Empty input yields well-formed empty output,
//! never an error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use insight_core::formatting::display_or_unknown;
use insight_core::models::{StatusCategory, VacancyRecord, CHANNEL_CATALOG};
use insight_core::periods::DateRange;

// ── Channel rollup ────────────────────────────────────────────────────────────

/// Totals for one recruitment channel across the filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelRollup {
    /// Channel label from the catalog.
    pub channel: String,
    /// Position in the catalog; the tie-break key.
    pub catalog_index: usize,
    pub submitted: u64,
    pub hired: u64,
    pub rejected: u64,
    /// `hired / submitted × 100`, unrounded.
    pub conversion_rate: f64,
}

/// Roll up channel tallies.
///
/// A channel appears only when its "submitted" column existed in the
/// source and its total across the set is > 0. Sorted descending by
/// submitted volume, ties broken by catalog order.
pub fn channel_rollup(records: &[VacancyRecord]) -> Vec<ChannelRollup> {
    let mut totals: BTreeMap<usize, (u64, u64, u64)> = BTreeMap::new();
    for record in records {
        for (&index, tally) in &record.channels {
            let entry = totals.entry(index).or_default();
            entry.0 += u64::from(tally.submitted);
            entry.1 += u64::from(tally.hired);
            entry.2 += u64::from(tally.rejected);
        }
    }

    let mut rollups: Vec<ChannelRollup> = totals
        .into_iter()
        .filter(|(_, (submitted, _, _))| *submitted > 0)
        .map(|(index, (submitted, hired, rejected))| ChannelRollup {
            channel: CHANNEL_CATALOG[index].to_string(),
            catalog_index: index,
            submitted,
            hired,
            rejected,
            conversion_rate: hired as f64 / submitted as f64 * 100.0,
        })
        .collect();

    rollups.sort_by(|a, b| {
        b.submitted
            .cmp(&a.submitted)
            .then(a.catalog_index.cmp(&b.catalog_index))
    });
    rollups
}

// ── Recruiter rollup ──────────────────────────────────────────────────────────

/// Performance figures for one (recruiter, department) pair.
#[derive(Debug, Clone, Serialize)]
pub struct RecruiterRollup {
    pub recruiter: String,
    pub department: Option<String>,
    pub vacancies: usize,
    pub responses: u64,
    pub filled: usize,
    /// `filled / vacancies × 100`, unrounded.
    pub fill_rate: f64,
    /// Mean responses per vacancy.
    pub mean_responses: f64,
}

/// Group by (recruiter, department), skipping records without a recruiter.
///
/// Sorted descending by vacancy count, then by recruiter name. Low-volume
/// suppression is the caller's call; see [`retain_min_vacancies`].
pub fn recruiter_rollup(records: &[VacancyRecord]) -> Vec<RecruiterRollup> {
    let mut groups: BTreeMap<(String, Option<String>), (usize, u64, usize)> = BTreeMap::new();
    for record in records {
        let Some(recruiter) = record
            .recruiter
            .as_ref()
            .filter(|name| !name.trim().is_empty())
        else {
            continue;
        };
        let key = (recruiter.clone(), record.department.clone());
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        entry.1 += u64::from(record.responses);
        if record.is_filled() {
            entry.2 += 1;
        }
    }

    let mut rows: Vec<RecruiterRollup> = groups
        .into_iter()
        .map(
            |((recruiter, department), (vacancies, responses, filled))| RecruiterRollup {
                recruiter,
                department,
                vacancies,
                responses,
                filled,
                fill_rate: filled as f64 / vacancies as f64 * 100.0,
                mean_responses: responses as f64 / vacancies as f64,
            },
        )
        .collect();

    rows.sort_by(|a, b| {
        b.vacancies
            .cmp(&a.vacancies)
            .then_with(|| a.recruiter.cmp(&b.recruiter))
    });
    rows
}

/// Presentation policy: keep only rows with at least `min` vacancies.
pub fn retain_min_vacancies(rows: Vec<RecruiterRollup>, min: usize) -> Vec<RecruiterRollup> {
    rows.into_iter().filter(|r| r.vacancies >= min).collect()
}

// ── Department rollup ─────────────────────────────────────────────────────────

/// Performance figures for one department.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentRollup {
    pub department: String,
    pub vacancies: usize,
    pub responses: u64,
    /// Distinct recruiters owning vacancies in this department.
    pub recruiters: usize,
    pub filled: usize,
    pub fill_rate: f64,
    pub mean_responses: f64,
}

/// Group by department, skipping records without one.
pub fn department_rollup(records: &[VacancyRecord]) -> Vec<DepartmentRollup> {
    #[derive(Default)]
    struct Acc {
        vacancies: usize,
        responses: u64,
        filled: usize,
        recruiters: BTreeSet<String>,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for record in records {
        let Some(department) = record
            .department
            .as_ref()
            .filter(|name| !name.trim().is_empty())
        else {
            continue;
        };
        let acc = groups.entry(department.clone()).or_default();
        acc.vacancies += 1;
        acc.responses += u64::from(record.responses);
        if record.is_filled() {
            acc.filled += 1;
        }
        if let Some(recruiter) = &record.recruiter {
            acc.recruiters.insert(recruiter.clone());
        }
    }

    let mut rows: Vec<DepartmentRollup> = groups
        .into_iter()
        .map(|(department, acc)| DepartmentRollup {
            department,
            vacancies: acc.vacancies,
            responses: acc.responses,
            recruiters: acc.recruiters.len(),
            filled: acc.filled,
            fill_rate: acc.filled as f64 / acc.vacancies as f64 * 100.0,
            mean_responses: acc.responses as f64 / acc.vacancies as f64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.vacancies
            .cmp(&a.vacancies)
            .then_with(|| a.department.cmp(&b.department))
    });
    rows
}

// ── Per-vacancy detail ────────────────────────────────────────────────────────

/// Derived figures for a single vacancy.
#[derive(Debug, Clone, Serialize)]
pub struct VacancyDetail {
    pub title: Option<String>,
    pub recruiter: Option<String>,
    pub department: Option<String>,
    pub status_label: String,
    pub category: StatusCategory,
    pub created: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub responses: u32,
    pub interviews: u32,
    pub rejected_after_screening: u32,
    pub rejected_after_interview: u32,
    pub hired: u32,
    /// `hired / responses × 100`, unrounded, 0 when there are no responses.
    pub conversion_rate: f64,
    /// `interviews / responses × 100`, unrounded.
    pub interview_rate: f64,
    /// Days from creation to close; `None` when either date is unknown.
    pub duration_days: Option<i64>,
    /// Close before creation: kept, but a correctness smell in the source.
    pub negative_duration: bool,
    /// Channel with the highest submitted count; catalog order breaks ties.
    pub top_channel: Option<String>,
}

/// Build the detail table, one row per record.
pub fn vacancy_details(records: &[VacancyRecord]) -> Vec<VacancyDetail> {
    records.iter().map(detail_for).collect()
}

fn detail_for(record: &VacancyRecord) -> VacancyDetail {
    let duration_days = record.duration_days();
    let negative_duration = record.has_negative_duration();
    if negative_duration {
        warn!(
            "vacancy \"{}\" closes {} days before it was created",
            display_or_unknown(record.title.as_deref()),
            duration_days.unwrap_or(0).abs()
        );
    }

    VacancyDetail {
        title: record.title.clone(),
        recruiter: record.recruiter.clone(),
        department: record.department.clone(),
        status_label: record.status_label.clone(),
        category: record.status_category(),
        created: record.created,
        close_date: record.close_date(),
        responses: record.responses,
        interviews: record.funnel.interviews,
        rejected_after_screening: record.funnel.rejected_after_screening,
        rejected_after_interview: record.funnel.rejected_after_interview,
        hired: record.funnel.hired,
        conversion_rate: rate(record.funnel.hired, record.responses),
        interview_rate: rate(record.funnel.interviews, record.responses),
        duration_days,
        negative_duration,
        top_channel: top_channel(record).map(str::to_string),
    }
}

/// The channel with the highest submitted count for one record.
///
/// Returns `None` when no channel has a positive count. The sparse map is
/// keyed by catalog index and iterates in ascending order, so a strict
/// comparison makes the earliest catalog entry win ties.
pub fn top_channel(record: &VacancyRecord) -> Option<&'static str> {
    let mut best: Option<(usize, u32)> = None;
    for (&index, tally) in &record.channels {
        if tally.submitted > 0 && best.map_or(true, |(_, s)| tally.submitted > s) {
            best = Some((index, tally.submitted));
        }
    }
    best.map(|(index, _)| CHANNEL_CATALOG[index])
}

fn rate(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(whole) * 100.0
}

// ── Daily activity ────────────────────────────────────────────────────────────

/// New and closed vacancy counts for one day.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub created: u32,
    pub closed: u32,
}

/// Per-day activity across `range`, zero-filled for quiet days.
pub fn daily_activity(records: &[VacancyRecord], range: &DateRange) -> Vec<DailyActivity> {
    let mut per_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for record in records {
        if let Some(created) = record.created {
            if range.contains(created) {
                per_day.entry(created).or_default().0 += 1;
            }
        }
        if let Some(closed) = record.close_date() {
            if range.contains(closed) {
                per_day.entry(closed).or_default().1 += 1;
            }
        }
    }

    let mut timeline = Vec::with_capacity(range.days().max(0) as usize);
    let mut day = range.start;
    loop {
        let (created, closed) = per_day.get(&day).copied().unwrap_or_default();
        timeline.push(DailyActivity { day, created, closed });
        if day >= range.end {
            break;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    timeline
}

// ── Tests ─────────────────────────────────────────────────────────────────────
