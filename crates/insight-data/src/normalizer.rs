//! Date normalization and record construction.
//!
//! Every recognized date-bearing column is parsed with the source's fixed
//! DD-MM-YYYY format. The source writes "no date" as a zero date that the
//! parser decodes to year 1900, so any parsed date with exactly that year
//! is reinterpreted as absent. Unparsable values also become absent; both
//! cases are tallied so the aggregate effect stays visible.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use insight_core::models::{
    ChannelTally, FunnelCounts, StatusCategory, VacancyRecord, VacancyStatus, CHANNEL_CATALOG,
};
use insight_core::schema::{self, columns};

use crate::loader::RawTable;
use crate::privacy::clean_html;

/// Year the source's zero-date placeholder decodes to.
///
/// Detection is strict equality, not a range check, so legitimately old
/// dates survive.
pub const SENTINEL_YEAR: i32 = 1900;

/// The export's fixed date format.
pub const SOURCE_DATE_FORMAT: &str = "%d-%m-%Y";

// ── Date parsing ──────────────────────────────────────────────────────────────

/// Outcome of parsing one date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    /// A usable calendar date.
    Parsed(NaiveDate),
    /// Empty cell or absent column.
    Blank,
    /// The year-1900 placeholder.
    Sentinel,
    /// Present but not DD-MM-YYYY.
    Unparsable,
}

impl DateOutcome {
    /// The normalized value: only parsed dates survive.
    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            DateOutcome::Parsed(d) => Some(d),
            _ => None,
        }
    }
}

/// Parse one raw date cell per the rules above.
pub fn parse_source_date(raw: &str) -> DateOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateOutcome::Blank;
    }
    match NaiveDate::parse_from_str(trimmed, SOURCE_DATE_FORMAT) {
        Ok(date) if date.year() == SENTINEL_YEAR => DateOutcome::Sentinel,
        Ok(date) => DateOutcome::Parsed(date),
        Err(_) => DateOutcome::Unparsable,
    }
}

// ── DateQuality ───────────────────────────────────────────────────────────────

/// Tally of date-cell outcomes across all recognized date columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateQuality {
    pub parsed: u64,
    pub blank: u64,
    pub sentinel: u64,
    pub unparsable: u64,
}

impl DateQuality {
    fn record(&mut self, outcome: DateOutcome) {
        match outcome {
            DateOutcome::Parsed(_) => self.parsed += 1,
            DateOutcome::Blank => self.blank += 1,
            DateOutcome::Sentinel => self.sentinel += 1,
            DateOutcome::Unparsable => self.unparsable += 1,
        }
    }

    /// Share of non-blank date values that parsed to a usable date.
    ///
    /// Returns 1.0 when there were no non-blank values at all: nothing
    /// present means nothing was lost.
    pub fn usable_fraction(&self) -> f64 {
        let considered = self.parsed + self.sentinel + self.unparsable;
        if considered == 0 {
            return 1.0;
        }
        self.parsed as f64 / considered as f64
    }
}

// ── NormalizedDates ───────────────────────────────────────────────────────────

/// Normalized per-row dates for every recognized date column that exists
/// in the table.
#[derive(Debug, Clone)]
pub struct NormalizedDates {
    columns: HashMap<&'static str, Vec<Option<NaiveDate>>>,
    pub quality: DateQuality,
}

impl NormalizedDates {
    /// Normalized value for one column and row; `None` for missing
    /// columns, blanks, sentinels, and unparsable cells alike.
    pub fn get(&self, column: &str, row: usize) -> Option<NaiveDate> {
        self.columns.get(column)?.get(row).copied().flatten()
    }
}

/// Normalize every recognized date column in the table.
///
/// A column that exists but is entirely empty yields all-absent values,
/// not an error.
pub fn normalize_dates(table: &RawTable) -> NormalizedDates {
    let mut normalized: HashMap<&'static str, Vec<Option<NaiveDate>>> = HashMap::new();
    let mut quality = DateQuality::default();

    for column in schema::date_columns() {
        if !table.schema().has(column) {
            continue;
        }
        let mut values = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let outcome = match table.cell(row, column) {
                Some(value) => parse_source_date(value),
                None => DateOutcome::Blank,
            };
            quality.record(outcome);
            values.push(outcome.into_date());
        }
        normalized.insert(*column, values);
    }

    NormalizedDates {
        columns: normalized,
        quality,
    }
}

// ── Record construction ───────────────────────────────────────────────────────

/// Records plus the data-quality signals collected while building them.
#[derive(Debug, Clone)]
pub struct RecordBuild {
    pub records: Vec<VacancyRecord>,
    /// Distinct status labels outside the catalog, in first-seen order.
    pub unmapped_statuses: Vec<String>,
}

/// Build the normalized record set from a (privacy-scrubbed) table and its
/// normalized dates.
pub fn build_records(table: &RawTable, dates: &NormalizedDates) -> RecordBuild {
    // Channel participation is column-driven: resolve the column names per
    // batch, not per row.
    struct ChannelColumns {
        index: usize,
        submitted: String,
        hired: String,
        rejected: String,
    }
    let channel_columns: Vec<ChannelColumns> = CHANNEL_CATALOG
        .iter()
        .enumerate()
        .filter(|(_, channel)| table.schema().has(&schema::channel_submitted_column(channel)))
        .map(|(index, channel)| ChannelColumns {
            index,
            submitted: schema::channel_submitted_column(channel),
            hired: schema::channel_hired_column(channel),
            rejected: schema::channel_rejected_column(channel),
        })
        .collect();

    let mut records = Vec::with_capacity(table.row_count());
    let mut unmapped_statuses: Vec<String> = Vec::new();

    for row in 0..table.row_count() {
        let status_label = table
            .cell(row, columns::STATUS)
            .unwrap_or_default()
            .to_string();
        let status = VacancyStatus::parse(&status_label);
        if status.is_none()
            && !status_label.is_empty()
            && !unmapped_statuses.contains(&status_label)
        {
            warn!(
                "unmapped vacancy status \"{}\"; falling back to category {}",
                status_label,
                StatusCategory::Active
            );
            unmapped_statuses.push(status_label.clone());
        }

        let mut channels = BTreeMap::new();
        for cc in &channel_columns {
            channels.insert(
                cc.index,
                ChannelTally {
                    submitted: table.count(row, &cc.submitted),
                    hired: table.count(row, &cc.hired),
                    rejected: table.count(row, &cc.rejected),
                },
            );
        }

        records.push(VacancyRecord {
            title: text_field(table, row, columns::TITLE),
            recruiter: text_field(table, row, columns::RECRUITER),
            department: text_field(table, row, columns::DEPARTMENT),
            location: text_field(table, row, columns::LOCATION),
            status_label,
            status,
            created: dates.get(columns::CREATED, row),
            published_internal: dates.get(columns::PUBLISHED_INTERNAL, row),
            published: dates.get(columns::PUBLISHED, row),
            in_procedure: dates.get(columns::IN_PROCEDURE, row),
            filled_internal: dates.get(columns::FILLED_INTERNAL, row),
            filled_external: dates.get(columns::FILLED_EXTERNAL, row),
            withdrawn: dates.get(columns::WITHDRAWN, row),
            not_filled: dates.get(columns::NOT_FILLED, row),
            responses: table.count(row, columns::RESPONSES),
            funnel: FunnelCounts {
                interviews: table.count(row, columns::INTERVIEWS),
                rejected_after_screening: table.count(row, columns::REJECTED_AFTER_SCREENING),
                rejected_after_interview: table.count(row, columns::REJECTED_AFTER_INTERVIEW),
                hired: table.count(row, columns::HIRED),
            },
            channels,
        });
    }

    RecordBuild {
        records,
        unmapped_statuses,
    }
}

/// Entity-decoded, markup-stripped text cell; `None` when absent or empty
/// after cleaning.
fn text_field(table: &RawTable, row: usize, column: &str) -> Option<String> {
    table
        .cell(row, column)
        .map(clean_html)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(text: &str) -> RawTable {
        let (table, _) = loader::load(text.as_bytes()).unwrap();
        table
    }

    // ── parse_source_date ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_valid_date() {
        assert_eq!(
            parse_source_date("09-02-2024"),
            DateOutcome::Parsed(date(2024, 2, 9))
        );
        assert_eq!(
            parse_source_date("29-02-2024"),
            DateOutcome::Parsed(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(parse_source_date(""), DateOutcome::Blank);
        assert_eq!(parse_source_date("   "), DateOutcome::Blank);
    }

    #[test]
    fn test_parse_sentinel_any_month_day() {
        assert_eq!(parse_source_date("01-01-1900"), DateOutcome::Sentinel);
        assert_eq!(parse_source_date("17-06-1900"), DateOutcome::Sentinel);
        assert_eq!(parse_source_date("31-12-1900"), DateOutcome::Sentinel);
    }

    #[test]
    fn test_sentinel_is_strict_equality_not_a_range() {
        assert_eq!(
            parse_source_date("01-01-1899"),
            DateOutcome::Parsed(date(1899, 1, 1))
        );
        assert_eq!(
            parse_source_date("01-01-1901"),
            DateOutcome::Parsed(date(1901, 1, 1))
        );
    }

    #[test]
    fn test_parse_unparsable() {
        assert_eq!(parse_source_date("2024-02-09"), DateOutcome::Unparsable);
        assert_eq!(parse_source_date("morgen"), DateOutcome::Unparsable);
        assert_eq!(parse_source_date("31-02-2024"), DateOutcome::Unparsable);
    }

    // ── DateQuality ───────────────────────────────────────────────────────────

    #[test]
    fn test_usable_fraction_ignores_blanks() {
        let quality = DateQuality {
            parsed: 3,
            blank: 10,
            sentinel: 1,
            unparsable: 0,
        };
        assert!((quality.usable_fraction() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_usable_fraction_with_nothing_present() {
        let quality = DateQuality {
            blank: 5,
            ..Default::default()
        };
        assert_eq!(quality.usable_fraction(), 1.0);
    }

    // ── normalize_dates ───────────────────────────────────────────────────────

    #[test]
    fn test_normalize_dates_basic() {
        let t = table("Datum aanmaak;Extern vervuld\n10-01-2024;09-02-2024\n01-01-1900;");
        let dates = normalize_dates(&t);

        assert_eq!(dates.get("Datum aanmaak", 0), Some(date(2024, 1, 10)));
        assert_eq!(dates.get("Extern vervuld", 0), Some(date(2024, 2, 9)));
        // Sentinel normalizes to absent.
        assert_eq!(dates.get("Datum aanmaak", 1), None);
        assert_eq!(dates.get("Extern vervuld", 1), None);

        assert_eq!(dates.quality.parsed, 2);
        assert_eq!(dates.quality.sentinel, 1);
        assert_eq!(dates.quality.blank, 1);
    }

    #[test]
    fn test_normalize_dates_entirely_empty_column_is_fine() {
        let t = table("Functie;Ingetrokken\nA;\nB;\nC;");
        let dates = normalize_dates(&t);
        for row in 0..3 {
            assert_eq!(dates.get("Ingetrokken", row), None);
        }
        assert_eq!(dates.quality.blank, 3);
        assert_eq!(dates.quality.usable_fraction(), 1.0);
    }

    #[test]
    fn test_normalize_dates_skips_unrecognized_columns() {
        let t = table("Functie;Datum aanmaak\n10-01-2024;10-01-2024");
        let dates = normalize_dates(&t);
        // "Functie" is not a date column even if its value looks like one.
        assert_eq!(dates.get("Functie", 0), None);
        assert_eq!(dates.quality.parsed, 1);
    }

    // ── build_records ─────────────────────────────────────────────────────────

    fn full_export() -> &'static str {
        "Functie;Status vacature;Eigenaar;Afdeling;Locatie;Datum aanmaak;Extern vervuld;Aantal reacties;Aantal in status: Aangenomen;Totaal per wervingskanaal: Indeed;Totaal per wervingskanaal (aangenomen): Indeed\n\
         Verpleegkundige;Extern vervuld;Jan;Zorg;Heemstede;10-01-2024;09-02-2024;25;1;20;1\n\
         Beleidsadviseur;In procedure;Piet;Staf;;01-03-2024;;10;0;5;0"
    }

    #[test]
    fn test_build_records_full_row() {
        let t = table(full_export());
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);

        assert_eq!(build.records.len(), 2);
        let first = &build.records[0];
        assert_eq!(first.title.as_deref(), Some("Verpleegkundige"));
        assert_eq!(first.status, Some(VacancyStatus::FilledExternal));
        assert_eq!(first.created, Some(date(2024, 1, 10)));
        assert_eq!(first.filled_external, Some(date(2024, 2, 9)));
        assert_eq!(first.responses, 25);
        assert_eq!(first.funnel.hired, 1);
        assert_eq!(first.duration_days(), Some(30));

        // Indeed is catalog index 1.
        let tally = first.channels.get(&1).unwrap();
        assert_eq!(tally.submitted, 20);
        assert_eq!(tally.hired, 1);
        assert!(build.unmapped_statuses.is_empty());
    }

    #[test]
    fn test_build_records_missing_columns_default() {
        let t = table("Functie\nVerpleegkundige");
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);

        let record = &build.records[0];
        assert_eq!(record.recruiter, None);
        assert_eq!(record.created, None);
        assert_eq!(record.responses, 0);
        assert_eq!(record.funnel, FunnelCounts::default());
        assert!(record.channels.is_empty());
        assert_eq!(record.status, None);
        assert_eq!(record.status_label, "");
    }

    #[test]
    fn test_build_records_channel_needs_submitted_column() {
        // Only the hired column exists: the channel does not participate.
        let t = table("Functie;Totaal per wervingskanaal (aangenomen): Indeed\nA;3");
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);
        assert!(build.records[0].channels.is_empty());
    }

    #[test]
    fn test_build_records_channel_with_blank_counts() {
        let t = table("Functie;Totaal per wervingskanaal: Indeed\nA;");
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);
        // The column exists, so the channel participates with a 0 tally.
        let tally = build.records[0].channels.get(&1).unwrap();
        assert_eq!(tally.submitted, 0);
    }

    #[test]
    fn test_build_records_collects_unmapped_statuses_once() {
        let t = table(
            "Functie;Status vacature\nA;Vreemde status\nB;Vreemde status\nC;In procedure",
        );
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);

        assert_eq!(build.unmapped_statuses, vec!["Vreemde status".to_string()]);
        assert_eq!(
            build.records[0].status_category(),
            StatusCategory::Active
        );
    }

    #[test]
    fn test_build_records_blank_status_is_not_unmapped() {
        let t = table("Functie;Status vacature\nA;");
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);
        assert!(build.unmapped_statuses.is_empty());
    }

    #[test]
    fn test_build_records_cleans_text_fields() {
        let t = table("Functie;Locatie\nCo&ouml;rdinator Zorg;<b>Heemstede</b>");
        let dates = normalize_dates(&t);
        let build = build_records(&t, &dates);

        let record = &build.records[0];
        assert_eq!(record.title.as_deref(), Some("Coördinator Zorg"));
        assert_eq!(record.location.as_deref(), Some("Heemstede"));
    }
}
