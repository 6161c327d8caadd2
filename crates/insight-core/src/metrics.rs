use serde::{Deserialize, Serialize};

use crate::models::{StatusCategory, VacancyRecord};
use crate::periods::DateRange;

// ── CategoryCounts ────────────────────────────────────────────────────────────

/// Record counts per derived [`StatusCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub active: usize,
    pub filled: usize,
    pub closed: usize,
    pub in_preparation: usize,
    pub parked: usize,
}

impl CategoryCounts {
    /// Count one record in its category.
    pub fn add(&mut self, category: StatusCategory) {
        match category {
            StatusCategory::Active => self.active += 1,
            StatusCategory::Filled => self.filled += 1,
            StatusCategory::Closed => self.closed += 1,
            StatusCategory::InPreparation => self.in_preparation += 1,
            StatusCategory::Parked => self.parked += 1,
        }
    }

    /// Count for one category.
    pub fn get(&self, category: StatusCategory) -> usize {
        match category {
            StatusCategory::Active => self.active,
            StatusCategory::Filled => self.filled,
            StatusCategory::Closed => self.closed,
            StatusCategory::InPreparation => self.in_preparation,
            StatusCategory::Parked => self.parked,
        }
    }
}

// ── KpiSet ────────────────────────────────────────────────────────────────────

/// The scalar KPI set for one record set and one resolved period.
///
/// `fill_rate` is an unrounded percentage; rounding to one decimal happens
/// at the presentation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSet {
    /// Number of records in the set.
    pub total: usize,
    /// Per-category counts over the set.
    pub categories: CategoryCounts,
    /// `filled / total × 100`; 0 when the set is empty, never NaN.
    pub fill_rate: f64,
    /// Records whose creation date falls inside the period.
    pub new_in_period: usize,
    /// Records whose resolved close date falls inside the period.
    ///
    /// Uses the single precedence-resolved close date, so a record closed
    /// by more than one criterion is counted exactly once.
    pub closed_in_period: usize,
}

impl KpiSet {
    /// Compute the KPI set for `records` against `period`.
    pub fn calculate(records: &[VacancyRecord], period: &DateRange) -> Self {
        let mut categories = CategoryCounts::default();
        let mut new_in_period = 0usize;
        let mut closed_in_period = 0usize;

        for record in records {
            categories.add(record.status_category());

            if record.created.is_some_and(|d| period.contains(d)) {
                new_in_period += 1;
            }
            if record.close_date().is_some_and(|d| period.contains(d)) {
                closed_in_period += 1;
            }
        }

        let total = records.len();
        let fill_rate = if total == 0 {
            0.0
        } else {
            categories.filled as f64 / total as f64 * 100.0
        };

        Self {
            total,
            categories,
            fill_rate,
            new_in_period,
            closed_in_period,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
