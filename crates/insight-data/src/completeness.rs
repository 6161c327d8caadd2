//! Data-completeness scoring.
//!
//! The pipeline normalizes anomalies away silently (sentinel dates,
//! unparsable values, absent columns); this report makes their aggregate
//! effect visible so the user can judge how far to trust each analysis.

use serde::Serialize;

use insight_core::models::VacancyRecord;

use crate::normalizer::DateQuality;

/// One scored data category.
#[derive(Debug, Clone, Serialize)]
pub struct CompletenessScore {
    pub category: &'static str,
    /// 0–100, one-decimal rounding happens at display time.
    pub percent: f64,
}

/// All category scores plus their mean.
#[derive(Debug, Clone, Serialize)]
pub struct CompletenessReport {
    pub scores: Vec<CompletenessScore>,
    pub average: f64,
}

/// Score the record set.
///
/// An empty set scores 0 everywhere rather than erroring.
pub fn completeness_report(
    records: &[VacancyRecord],
    quality: &DateQuality,
) -> CompletenessReport {
    let scores = vec![
        CompletenessScore {
            category: "Vacature-informatie",
            percent: fraction(records, |r| r.title.is_some()),
        },
        CompletenessScore {
            category: "Statusinformatie",
            percent: fraction(records, |r| !r.status_label.is_empty()),
        },
        CompletenessScore {
            category: "Datuminformatie",
            percent: fraction(records, |r| r.created.is_some()),
        },
        CompletenessScore {
            category: "Recruiterinformatie",
            percent: fraction(records, |r| r.recruiter.is_some()),
        },
        CompletenessScore {
            category: "Sollicitatiedata",
            percent: fraction(records, |r| r.responses > 0),
        },
        CompletenessScore {
            category: "Kanaaldata",
            percent: fraction(records, |r| {
                r.channels.values().any(|tally| tally.submitted > 0)
            }),
        },
        CompletenessScore {
            category: "Datumkwaliteit",
            percent: if records.is_empty() {
                0.0
            } else {
                quality.usable_fraction() * 100.0
            },
        },
    ];

    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|s| s.percent).sum::<f64>() / scores.len() as f64
    };

    CompletenessReport { scores, average }
}

fn fraction(records: &[VacancyRecord], predicate: impl Fn(&VacancyRecord) -> bool) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let hits = records.iter().filter(|r| predicate(r)).count();
    hits as f64 / records.len() as f64 * 100.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
