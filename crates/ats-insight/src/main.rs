mod bootstrap;
mod report;

use std::path::Path;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;

use insight_core::error::InsightError;
use insight_core::metrics::KpiSet;
use insight_core::models::VacancyRecord;
use insight_core::periods::{available_periods, DateRange, NamedPeriod};
use insight_core::settings::Settings;
use insight_data::aggregator::{self, VacancyDetail};
use insight_data::completeness;
use insight_data::export;
use insight_data::pipeline::{self, IngestBatch};

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("ats-insight v{} starting", env!("CARGO_PKG_VERSION"));

    let bytes = std::fs::read(&settings.input).map_err(|source| InsightError::FileRead {
        path: settings.input.clone(),
        source,
    })?;
    let batch = pipeline::ingest(&bytes)?;

    if batch.is_empty() {
        println!("Geen records gevonden in {}", settings.input.display());
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let (period_label, range) = resolve_period(&settings, &batch, today)?;

    let records = match &range {
        Some(range) => batch.filter_by_range(range),
        None => batch.records.clone(),
    };

    // The KPI period: the selected range, or the whole data range when no
    // period filter applies.
    let kpi_range = range
        .or_else(|| batch.data_range())
        .unwrap_or(DateRange {
            start: today,
            end: today,
        });

    let kpis = KpiSet::calculate(&records, &kpi_range);
    let channels = aggregator::channel_rollup(&records);
    let recruiters = aggregator::retain_min_vacancies(
        aggregator::recruiter_rollup(&records),
        settings.min_vacancies,
    );
    let departments = aggregator::department_rollup(&records);
    let details = aggregator::vacancy_details(&records);
    let data_completeness = completeness::completeness_report(&records, &batch.date_quality);

    if settings.json {
        let payload = serde_json::json!({
            "period": period_label,
            "range": kpi_range,
            "kpis": kpis,
            "channels": channels,
            "recruiters": recruiters,
            "departments": departments,
            "vacancies": details,
            "completeness": data_completeness,
            "privacy": batch.disclosure,
            "schema_warnings": batch.schema_warnings,
            "unmapped_statuses": batch.unmapped_statuses,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!(
            "{}",
            report::render_report(
                &period_label,
                &kpi_range,
                &batch,
                &kpis,
                &channels,
                &recruiters,
                &departments,
                &data_completeness,
            )
        );
    }

    if let Some(dir) = &settings.export_dir {
        write_exports(dir, &records, &details, &channels, &recruiters, &departments)?;
        println!("Exporttabellen geschreven naar {}", dir.display());
    }

    Ok(())
}

/// Resolve the CLI period choice against the batch.
///
/// Returns the display label plus the filter range; `None` means the full
/// record set without period filtering.
fn resolve_period(
    settings: &Settings,
    batch: &IngestBatch,
    today: NaiveDate,
) -> Result<(String, Option<DateRange>)> {
    match settings.period.as_str() {
        "all" => Ok(("Volledige dataset".to_string(), None)),

        "custom" => {
            let (Some(start), Some(end)) = (&settings.start, &settings.end) else {
                bail!("--period custom vereist --start en --end");
            };
            let range = DateRange::new(parse_cli_date(start)?, parse_cli_date(end)?)?;
            let clipped = clip_to_data(range, batch);
            let Some(clipped) = clipped else {
                bail!("de gekozen periode ({}) overlapt de data niet", range);
            };
            Ok((format!("Aangepast ({})", clipped), Some(clipped)))
        }

        key => {
            // The clap value parser restricts the keys; an unknown one here
            // is a programming error, not user input.
            let Some(period) = NamedPeriod::from_key(key) else {
                bail!("onbekende periode: {}", key);
            };
            let resolved = period.resolve(today);
            let Some(clipped) = clip_to_data(resolved, batch) else {
                let selectable: Vec<&str> = match batch.data_range() {
                    Some(data) => available_periods(today, &data)
                        .into_iter()
                        .map(|(p, _)| p.label())
                        .collect(),
                    None => Vec::new(),
                };
                bail!(
                    "periode \"{}\" ({}) overlapt de data niet; beschikbaar: {}",
                    period.label(),
                    resolved,
                    selectable.join(", ")
                );
            };
            Ok((period.label().to_string(), Some(clipped)))
        }
    }
}

/// Clip a requested range to the data's observed bounds.
fn clip_to_data(range: DateRange, batch: &IngestBatch) -> Option<DateRange> {
    match batch.data_range() {
        Some(data) => range.clip(&data),
        None => Some(range),
    }
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .map_err(|_| InsightError::DateArgument(raw.to_string()).into())
}

/// Write all export tables into `dir`, creating it when needed.
fn write_exports(
    dir: &Path,
    records: &[VacancyRecord],
    details: &[VacancyDetail],
    channels: &[aggregator::ChannelRollup],
    recruiters: &[aggregator::RecruiterRollup],
    departments: &[aggregator::DepartmentRollup],
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    export::write_records(records, std::fs::File::create(dir.join("records.csv"))?)?;
    export::write_vacancy_details(details, std::fs::File::create(dir.join("vacatures.csv"))?)?;
    export::write_channel_rollup(channels, std::fs::File::create(dir.join("kanalen.csv"))?)?;
    export::write_recruiter_rollup(
        recruiters,
        std::fs::File::create(dir.join("recruiters.csv"))?,
    )?;
    export::write_department_rollup(
        departments,
        std::fs::File::create(dir.join("afdelingen.csv"))?,
    )?;
    tracing::info!("export tables written to {}", dir.display());
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
