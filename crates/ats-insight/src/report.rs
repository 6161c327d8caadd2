//! Plain-text report rendering.
//!
//! The presentation boundary: unrounded core figures become one-decimal
//! percentages here. Rendering is string-building only; printing happens
//! in `main`.

use insight_core::formatting::{display_or_unknown, format_number, format_rate};
use insight_core::metrics::KpiSet;
use insight_core::periods::DateRange;
use insight_data::aggregator::{ChannelRollup, DepartmentRollup, RecruiterRollup};
use insight_data::completeness::CompletenessReport;
use insight_data::pipeline::IngestBatch;

/// Compose the full report.
pub fn render_report(
    period_label: &str,
    range: &DateRange,
    batch: &IngestBatch,
    kpis: &KpiSet,
    channels: &[ChannelRollup],
    recruiters: &[RecruiterRollup],
    departments: &[DepartmentRollup],
    completeness: &CompletenessReport,
) -> String {
    let mut out = String::new();
    out.push_str(&render_kpis(period_label, range, kpis));
    out.push_str(&render_channels(channels));
    out.push_str(&render_recruiters(recruiters));
    out.push_str(&render_departments(departments));
    out.push_str(&render_completeness(completeness));
    out.push_str(&render_quality(batch));
    out
}

/// The KPI block for the selected period.
pub fn render_kpis(period_label: &str, range: &DateRange, kpis: &KpiSet) -> String {
    let mut out = String::new();
    out.push_str(&format!("KPI's: {} ({})\n", period_label, range));
    out.push_str(&format!("  Vacatures:             {}\n", kpis.total));
    out.push_str(&format!("  Nieuw in periode:      {}\n", kpis.new_in_period));
    out.push_str(&format!(
        "  Gesloten in periode:   {}\n",
        kpis.closed_in_period
    ));
    out.push_str(&format!(
        "  Vervuld:               {}\n",
        kpis.categories.filled
    ));
    out.push_str(&format!(
        "  Openstaand:            {}\n",
        kpis.categories.active
    ));
    out.push_str(&format!(
        "  In voorbereiding:      {}\n",
        kpis.categories.in_preparation
    ));
    out.push_str(&format!(
        "  Gesloten:              {}\n",
        kpis.categories.closed
    ));
    out.push_str(&format!(
        "  Geparkeerd:            {}\n",
        kpis.categories.parked
    ));
    out.push_str(&format!(
        "  Fill rate:             {}\n\n",
        format_rate(kpis.fill_rate)
    ));
    out
}

/// The channel rollup table.
pub fn render_channels(channels: &[ChannelRollup]) -> String {
    let mut out = String::from("Kanaalanalyse\n");
    if channels.is_empty() {
        out.push_str("  Geen kanaaldata beschikbaar in deze export.\n\n");
        return out;
    }
    out.push_str(&format!(
        "  {:<26} {:>12} {:>10} {:>10} {:>10}\n",
        "Kanaal", "Sollicitanten", "Aangenomen", "Afgewezen", "Conversie"
    ));
    for channel in channels {
        out.push_str(&format!(
            "  {:<26} {:>12} {:>10} {:>10} {:>10}\n",
            channel.channel,
            format_number(channel.submitted as f64, 0),
            channel.hired,
            channel.rejected,
            format_rate(channel.conversion_rate),
        ));
    }
    out.push('\n');
    out
}

/// The recruiter rollup table (already threshold-filtered by the caller).
pub fn render_recruiters(recruiters: &[RecruiterRollup]) -> String {
    let mut out = String::from("Recruiterprestaties\n");
    if recruiters.is_empty() {
        out.push_str("  Geen recruiterdata voor de geselecteerde periode.\n\n");
        return out;
    }
    out.push_str(&format!(
        "  {:<20} {:<20} {:>10} {:>10} {:>8} {:>10} {:>14}\n",
        "Recruiter", "Afdeling", "Vacatures", "Reacties", "Vervuld", "Fill rate", "Gem. reacties"
    ));
    for row in recruiters {
        out.push_str(&format!(
            "  {:<20} {:<20} {:>10} {:>10} {:>8} {:>10} {:>14}\n",
            row.recruiter,
            display_or_unknown(row.department.as_deref()),
            row.vacancies,
            row.responses,
            row.filled,
            format_rate(row.fill_rate),
            format!("{:.1}", row.mean_responses),
        ));
    }
    out.push('\n');
    out
}

/// The department rollup table.
pub fn render_departments(departments: &[DepartmentRollup]) -> String {
    let mut out = String::from("Afdelingsanalyse\n");
    if departments.is_empty() {
        out.push_str("  Geen afdelingsdata beschikbaar.\n\n");
        return out;
    }
    out.push_str(&format!(
        "  {:<24} {:>10} {:>10} {:>11} {:>8} {:>10}\n",
        "Afdeling", "Vacatures", "Reacties", "Recruiters", "Vervuld", "Fill rate"
    ));
    for row in departments {
        out.push_str(&format!(
            "  {:<24} {:>10} {:>10} {:>11} {:>8} {:>10}\n",
            row.department,
            row.vacancies,
            row.responses,
            row.recruiters,
            row.filled,
            format_rate(row.fill_rate),
        ));
    }
    out.push('\n');
    out
}

/// The data-completeness block.
pub fn render_completeness(report: &CompletenessReport) -> String {
    let mut out = String::from("Datacompleetheid\n");
    for score in &report.scores {
        out.push_str(&format!(
            "  {:<24} {:>7}\n",
            score.category,
            format_rate(score.percent)
        ));
    }
    out.push_str(&format!(
        "  {:<24} {:>7}\n\n",
        "Gemiddeld",
        format_rate(report.average)
    ));
    out
}

/// Privacy disclosure and data-quality signals from the ingest.
pub fn render_quality(batch: &IngestBatch) -> String {
    let mut out = String::from("Dataverwerking\n");
    out.push_str(&format!("  Encoding: {}\n", batch.encoding));

    if !batch.disclosure.removed_columns.is_empty() {
        out.push_str(&format!(
            "  Verwijderde gevoelige kolommen: {}\n",
            batch.disclosure.removed_columns.join(", ")
        ));
    }
    if !batch.disclosure.anonymized_columns.is_empty() {
        out.push_str(&format!(
            "  Geanonimiseerde kolommen (voornaam): {}\n",
            batch.disclosure.anonymized_columns.join(", ")
        ));
    }
    if !batch.unmapped_statuses.is_empty() {
        out.push_str(&format!(
            "  Onbekende statuslabels: {}\n",
            batch.unmapped_statuses.join(", ")
        ));
    }
    if !batch.schema_warnings.is_empty() {
        let names: Vec<&str> = batch
            .schema_warnings
            .iter()
            .map(|w| w.column.as_str())
            .collect();
        out.push_str(&format!("  Ontbrekende kolommen: {}\n", names.join(", ")));
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insight_data::{aggregator, pipeline};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn batch() -> pipeline::IngestBatch {
        pipeline::ingest(
            "Functie;Status vacature;Eigenaar;Datum aanmaak;Aantal reacties;Totaal per wervingskanaal: Indeed;Totaal per wervingskanaal (aangenomen): Indeed\n\
             Verpleegkundige;Extern vervuld;Jan de Boer;10-01-2024;25;40;4\n\
             Beleidsadviseur;In procedure;Piet Klaassen;01-03-2024;10;0;0\n\
             Teamleider;Niet vervuld;Jan de Boer;05-02-2024;0;0;0"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_kpis_rounds_to_one_decimal() {
        let b = batch();
        let kpis = KpiSet::calculate(&b.records, &range());
        let text = render_kpis("Alles", &range(), &kpis);
        assert!(text.contains("Fill rate:             33.3%"), "{text}");
        assert!(text.contains("Vacatures:             3"));
    }

    #[test]
    fn test_render_channels_scenario() {
        let b = batch();
        let channels = aggregator::channel_rollup(&b.records);
        let text = render_channels(&channels);
        assert!(text.contains("Indeed"));
        assert!(text.contains("10.0%"), "{text}");
    }

    #[test]
    fn test_render_channels_empty_message() {
        let text = render_channels(&[]);
        assert!(text.contains("Geen kanaaldata"));
    }

    #[test]
    fn test_render_recruiters_uses_unknown_label_for_absent_department() {
        let b = batch();
        let recruiters = aggregator::recruiter_rollup(&b.records);
        let text = render_recruiters(&recruiters);
        assert!(text.contains("Jan"));
        assert!(text.contains("Onbekend"));
        // No raw full name may survive to the report.
        assert!(!text.contains("Jan de Boer"));
    }

    #[test]
    fn test_render_quality_mentions_encoding() {
        let b = batch();
        let text = render_quality(&b);
        assert!(text.contains("Encoding: utf-8"));
    }

    #[test]
    fn test_render_report_composes_all_sections() {
        let b = batch();
        let kpis = KpiSet::calculate(&b.records, &range());
        let channels = aggregator::channel_rollup(&b.records);
        let recruiters = aggregator::recruiter_rollup(&b.records);
        let departments = aggregator::department_rollup(&b.records);
        let completeness =
            insight_data::completeness::completeness_report(&b.records, &b.date_quality);

        let text = render_report(
            "Alles",
            &range(),
            &b,
            &kpis,
            &channels,
            &recruiters,
            &departments,
            &completeness,
        );
        for section in [
            "KPI's",
            "Kanaalanalyse",
            "Recruiterprestaties",
            "Afdelingsanalyse",
            "Datacompleetheid",
            "Dataverwerking",
        ] {
            assert!(text.contains(section), "missing section {section}");
        }
    }
}
