//! Named and custom reporting periods.
//!
//! Resolves a period choice into a concrete inclusive date range, clipped
//! to the range actually covered by the loaded data. Periods that do not
//! overlap the data are simply left out of the selectable set.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

// ── DateRange ─────────────────────────────────────────────────────────────────

/// An inclusive `[start, end]` pair of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a validated range.
    ///
    /// A start after the end is a user-facing validation failure, never a
    /// silent swap.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(InsightError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `day` falls within the range (both bounds inclusive).
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, counting both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Intersect with `bounds`, returning `None` when there is no overlap.
    pub fn clip(&self, bounds: &DateRange) -> Option<DateRange> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        if start > end {
            return None;
        }
        Some(DateRange { start, end })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} t/m {}",
            self.start.format("%d-%m-%Y"),
            self.end.format("%d-%m-%Y")
        )
    }
}

// ── NamedPeriod ───────────────────────────────────────────────────────────────

/// The predefined reporting periods offered alongside custom ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedPeriod {
    Last7Days,
    Last14Days,
    Last30Days,
    Last90Days,
    CurrentMonth,
    PreviousMonth,
    CurrentQuarter,
    CurrentCalendarYear,
    LastYear,
}

impl NamedPeriod {
    /// Every named period, in presentation order.
    pub const ALL: [NamedPeriod; 9] = [
        NamedPeriod::Last7Days,
        NamedPeriod::Last14Days,
        NamedPeriod::Last30Days,
        NamedPeriod::Last90Days,
        NamedPeriod::CurrentMonth,
        NamedPeriod::PreviousMonth,
        NamedPeriod::CurrentQuarter,
        NamedPeriod::CurrentCalendarYear,
        NamedPeriod::LastYear,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            NamedPeriod::Last7Days => "Laatste 7 dagen",
            NamedPeriod::Last14Days => "Laatste 14 dagen",
            NamedPeriod::Last30Days => "Laatste 30 dagen",
            NamedPeriod::Last90Days => "Laatste 90 dagen",
            NamedPeriod::CurrentMonth => "Huidige maand",
            NamedPeriod::PreviousMonth => "Vorige maand",
            NamedPeriod::CurrentQuarter => "Huidige kwartaal",
            NamedPeriod::CurrentCalendarYear => "Huidige kalenderjaar",
            NamedPeriod::LastYear => "Laatste jaar",
        }
    }

    /// Stable command-line key.
    pub fn key(&self) -> &'static str {
        match self {
            NamedPeriod::Last7Days => "last-7-days",
            NamedPeriod::Last14Days => "last-14-days",
            NamedPeriod::Last30Days => "last-30-days",
            NamedPeriod::Last90Days => "last-90-days",
            NamedPeriod::CurrentMonth => "current-month",
            NamedPeriod::PreviousMonth => "previous-month",
            NamedPeriod::CurrentQuarter => "current-quarter",
            NamedPeriod::CurrentCalendarYear => "current-year",
            NamedPeriod::LastYear => "last-year",
        }
    }

    /// Inverse of [`Self::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Resolve to a concrete inclusive range relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            NamedPeriod::Last7Days => trailing_days(today, 7),
            NamedPeriod::Last14Days => trailing_days(today, 14),
            NamedPeriod::Last30Days => trailing_days(today, 30),
            NamedPeriod::Last90Days => trailing_days(today, 90),
            NamedPeriod::CurrentMonth => DateRange {
                start: first_of_month(today),
                end: today,
            },
            NamedPeriod::PreviousMonth => previous_month(today),
            NamedPeriod::CurrentQuarter => DateRange {
                start: quarter_start(today),
                end: today,
            },
            NamedPeriod::CurrentCalendarYear => DateRange {
                start: NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                end: today,
            },
            NamedPeriod::LastYear => trailing_days(today, 365),
        }
    }
}

/// Clip every named period to the data's own bounds, keeping only those
/// that overlap. A period with no overlap is omitted, not an error.
pub fn available_periods(today: NaiveDate, data: &DateRange) -> Vec<(NamedPeriod, DateRange)> {
    NamedPeriod::ALL
        .into_iter()
        .filter_map(|period| period.resolve(today).clip(data).map(|range| (period, range)))
        .collect()
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn trailing_days(today: NaiveDate, days: i64) -> DateRange {
    DateRange {
        start: today - Duration::days(days),
        end: today,
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Full previous calendar month, handling the year rollover in January.
fn previous_month(today: NaiveDate) -> DateRange {
    let end = first_of_month(today).pred_opt().unwrap_or(today);
    DateRange {
        start: first_of_month(end),
        end,
    }
}

fn quarter_start(today: NaiveDate) -> NaiveDate {
    let start_month = 3 * (today.month0() / 3) + 1;
    NaiveDate::from_ymd_opt(today.year(), start_month, 1).unwrap_or(today)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
