//! The ingestion pipeline and its per-upload context.
//!
//! One call to [`ingest`] runs loader → date normalizer → privacy filter →
//! record build and returns an immutable [`IngestBatch`]. Per-period views
//! are fresh filtered copies; re-deriving anything means re-running the
//! pipeline on the raw bytes. There is no ambient state.

use tracing::{info, warn};

use insight_core::error::Result;
use insight_core::models::VacancyRecord;
use insight_core::periods::DateRange;
use insight_core::schema::{self, SchemaWarning};

use crate::loader;
use crate::normalizer::{self, DateQuality};
use crate::privacy::{self, PrivacyDisclosure};

// ── IngestBatch ───────────────────────────────────────────────────────────────

/// Everything produced by one upload: the normalized record set plus the
/// quality and privacy signals gathered along the way.
#[derive(Debug, Clone)]
pub struct IngestBatch {
    /// The normalized, privacy-filtered record set.
    pub records: Vec<VacancyRecord>,
    /// Name of the encoding that decoded the file.
    pub encoding: &'static str,
    /// What the privacy filter removed and anonymized.
    pub disclosure: PrivacyDisclosure,
    /// Expected-but-missing columns.
    pub schema_warnings: Vec<SchemaWarning>,
    /// Aggregate date-anomaly tally.
    pub date_quality: DateQuality,
    /// Status labels outside the catalog, in first-seen order.
    pub unmapped_statuses: Vec<String>,
}

impl IngestBatch {
    /// Observed min/max creation date, the bounds every named period is
    /// clipped against. `None` when no record has a creation date.
    pub fn data_range(&self) -> Option<DateRange> {
        let mut dates = self.records.iter().filter_map(|r| r.created);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
        DateRange::new(min, max).ok()
    }

    /// A fresh per-period view: records whose creation date falls inside
    /// `range`. Records without a creation date are excluded; they cannot
    /// be placed in any period.
    pub fn filter_by_range(&self, range: &DateRange) -> Vec<VacancyRecord> {
        self.records
            .iter()
            .filter(|r| r.created.is_some_and(|d| range.contains(d)))
            .cloned()
            .collect()
    }

    /// True when the upload produced no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── ingest ────────────────────────────────────────────────────────────────────

/// Run the full pipeline over one uploaded file.
pub fn ingest(bytes: &[u8]) -> Result<IngestBatch> {
    // ── Step 1: Decode and parse ──────────────────────────────────────────────
    let (mut table, encoding) = loader::load(bytes)?;

    let schema_warnings = schema::missing_optional_columns(table.schema());
    for warning in &schema_warnings {
        warn!("{}", warning);
    }

    // ── Step 2: Date normalization ────────────────────────────────────────────
    let dates = normalizer::normalize_dates(&table);

    // ── Step 3: Privacy filter, before anything reaches a consumer ────────────
    let disclosure = privacy::apply(&mut table);

    // ── Step 4: Record construction ───────────────────────────────────────────
    let build = normalizer::build_records(&table, &dates);

    info!(
        "ingested {} records ({} encoding, {} sentinel dates, {} unparsable dates)",
        build.records.len(),
        encoding,
        dates.quality.sentinel,
        dates.quality.unparsable,
    );

    Ok(IngestBatch {
        records: build.records,
        encoding,
        disclosure,
        schema_warnings,
        date_quality: dates.quality,
        unmapped_statuses: build.unmapped_statuses,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insight_core::metrics::KpiSet;
    use insight_core::models::StatusCategory;
    use insight_core::schema::columns;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_export() -> &'static str {
        "\
Functie;Status vacature;Eigenaar;Afdeling;Datum aanmaak;Extern vervuld;Niet vervuld;Aantal reacties;E-mail\n\
Verpleegkundige;Extern vervuld;Jan de Boer;Zorg;10-01-2024;09-02-2024;;25;jan@voorbeeld.nl\n\
Beleidsadviseur;In procedure;Piet Klaassen;Staf;01-03-2024;;;10;piet@voorbeeld.nl\n\
Teamleider;Niet vervuld;Jan de Boer;Zorg;01-01-1900;;15-03-2024;0;jan@voorbeeld.nl"
    }

    // ── ingest ────────────────────────────────────────────────────────────────

    #[test]
    fn test_ingest_end_to_end() {
        let batch = ingest(sample_export().as_bytes()).unwrap();

        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.encoding, "utf-8");

        // Privacy ran before the records were built.
        assert_eq!(batch.records[0].recruiter.as_deref(), Some("Jan"));
        assert_eq!(
            batch.disclosure.removed_columns,
            vec!["E-mail".to_string()]
        );

        // The sentinel creation date on the third row became absent.
        assert_eq!(batch.records[2].created, None);
        assert_eq!(batch.date_quality.sentinel, 1);
    }

    #[test]
    fn test_ingest_kpi_scenario() {
        let batch = ingest(sample_export().as_bytes()).unwrap();
        let period = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let kpis = KpiSet::calculate(&batch.records, &period);

        assert_eq!(kpis.total, 3);
        assert_eq!(kpis.categories.filled, 1);
        assert!((kpis.fill_rate - 100.0 / 3.0).abs() < 1e-9);
        // Filled on 09-02 and not-filled on 15-03: both close in 2024.
        assert_eq!(kpis.closed_in_period, 2);
    }

    #[test]
    fn test_ingest_reports_schema_warnings() {
        let batch = ingest(b"Functie;Status vacature\nVerpleegkundige;Nieuw").unwrap();
        assert!(batch
            .schema_warnings
            .iter()
            .any(|w| w.column == columns::RESPONSES));
    }

    #[test]
    fn test_ingest_collects_unmapped_statuses() {
        let batch =
            ingest(b"Functie;Status vacature\nA;Heel eigen status\nB;In procedure").unwrap();
        assert_eq!(
            batch.unmapped_statuses,
            vec!["Heel eigen status".to_string()]
        );
        assert_eq!(
            batch.records[0].status_category(),
            StatusCategory::Active
        );
    }

    #[test]
    fn test_ingest_header_only_file() {
        let batch = ingest(b"Functie;Status vacature\n").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.data_range(), None);
    }

    // ── data_range / filter_by_range ──────────────────────────────────────────

    #[test]
    fn test_data_range_spans_created_dates() {
        let batch = ingest(sample_export().as_bytes()).unwrap();
        let range = batch.data_range().unwrap();
        assert_eq!(range.start, date(2024, 1, 10));
        assert_eq!(range.end, date(2024, 3, 1));
    }

    #[test]
    fn test_filter_by_range_excludes_undated_records() {
        let batch = ingest(sample_export().as_bytes()).unwrap();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let filtered = batch.filter_by_range(&range);
        // The sentinel-dated record has no creation date and drops out.
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_by_range_empty_period_is_well_formed() {
        let batch = ingest(sample_export().as_bytes()).unwrap();
        let range = DateRange::new(date(2030, 1, 1), date(2030, 12, 31)).unwrap();
        let filtered = batch.filter_by_range(&range);
        assert!(filtered.is_empty());

        // Downstream aggregation over the empty view stays well-formed.
        let kpis = KpiSet::calculate(&filtered, &range);
        assert_eq!(kpis.total, 0);
        assert_eq!(kpis.fill_rate, 0.0);
        assert!(crate::aggregator::channel_rollup(&filtered).is_empty());
        assert!(crate::aggregator::recruiter_rollup(&filtered).is_empty());
    }

    // ── Immutability contract ─────────────────────────────────────────────────

    #[test]
    fn test_filtering_does_not_mutate_the_batch() {
        let batch = ingest(sample_export().as_bytes()).unwrap();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let _view = batch.filter_by_range(&range);
        assert_eq!(batch.records.len(), 3);
    }
}
