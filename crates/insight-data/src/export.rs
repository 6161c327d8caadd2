//! CSV re-export of filtered and derived tables.
//!
//! Uses the same `;` delimiter convention as the input. The record table
//! keeps the source column naming so an exported file re-ingests cleanly;
//! the derived tables are presentation artifacts and format their rates at
//! one decimal.

use std::collections::BTreeSet;
use std::io::Write;

use insight_core::error::Result;
use insight_core::formatting::{format_date, format_duration};
use insight_core::models::{VacancyRecord, CHANNEL_CATALOG};
use insight_core::schema::{self, columns};

use crate::aggregator::{ChannelRollup, DepartmentRollup, RecruiterRollup, VacancyDetail};

/// Write the normalized record table in source column naming.
///
/// Absent values become empty cells (re-ingesting reads them back as
/// absent); dates use the source's DD-MM-YYYY format. Channel columns are
/// emitted for every channel that participates in the batch.
pub fn write_records<W: Write>(records: &[VacancyRecord], writer: W) -> Result<()> {
    let present: BTreeSet<usize> = records
        .iter()
        .flat_map(|r| r.channels.keys().copied())
        .collect();

    let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    let mut header: Vec<String> = [
        columns::TITLE,
        columns::STATUS,
        columns::RECRUITER,
        columns::DEPARTMENT,
        columns::LOCATION,
        columns::CREATED,
        columns::PUBLISHED_INTERNAL,
        columns::PUBLISHED,
        columns::IN_PROCEDURE,
        columns::FILLED_INTERNAL,
        columns::FILLED_EXTERNAL,
        columns::WITHDRAWN,
        columns::NOT_FILLED,
        columns::RESPONSES,
        columns::INTERVIEWS,
        columns::REJECTED_AFTER_SCREENING,
        columns::REJECTED_AFTER_INTERVIEW,
        columns::HIRED,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for &index in &present {
        let channel = CHANNEL_CATALOG[index];
        header.push(schema::channel_submitted_column(channel));
        header.push(schema::channel_hired_column(channel));
        header.push(schema::channel_rejected_column(channel));
    }
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = vec![
            record.title.clone().unwrap_or_default(),
            record.status_label.clone(),
            record.recruiter.clone().unwrap_or_default(),
            record.department.clone().unwrap_or_default(),
            record.location.clone().unwrap_or_default(),
            export_date(record.created),
            export_date(record.published_internal),
            export_date(record.published),
            export_date(record.in_procedure),
            export_date(record.filled_internal),
            export_date(record.filled_external),
            export_date(record.withdrawn),
            export_date(record.not_filled),
            record.responses.to_string(),
            record.funnel.interviews.to_string(),
            record.funnel.rejected_after_screening.to_string(),
            record.funnel.rejected_after_interview.to_string(),
            record.funnel.hired.to_string(),
        ];
        for &index in &present {
            let tally = record.channels.get(&index).copied().unwrap_or_default();
            row.push(tally.submitted.to_string());
            row.push(tally.hired.to_string());
            row.push(tally.rejected.to_string());
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the per-vacancy performance table.
pub fn write_vacancy_details<W: Write>(details: &[VacancyDetail], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv_writer.write_record([
        "Vacature",
        "Recruiter",
        "Afdeling",
        "Status",
        "Categorie",
        "Aanmaakdatum",
        "Sluitdatum",
        "Doorlooptijd",
        "Reacties",
        "Gesprekken",
        "Afgewezen na brief",
        "Afgewezen na gesprek",
        "Aangenomen",
        "Conversieratio (%)",
        "Topkanaal",
    ])?;

    for detail in details {
        csv_writer.write_record([
            detail.title.clone().unwrap_or_default(),
            detail.recruiter.clone().unwrap_or_default(),
            detail.department.clone().unwrap_or_default(),
            detail.status_label.clone(),
            detail.category.label().to_string(),
            format_date(detail.created),
            format_date(detail.close_date),
            format_duration(detail.duration_days),
            detail.responses.to_string(),
            detail.interviews.to_string(),
            detail.rejected_after_screening.to_string(),
            detail.rejected_after_interview.to_string(),
            detail.hired.to_string(),
            format!("{:.1}", detail.conversion_rate),
            detail.top_channel.clone().unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the channel rollup table.
pub fn write_channel_rollup<W: Write>(rollup: &[ChannelRollup], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv_writer.write_record([
        "Kanaal",
        "Totaal sollicitanten",
        "Aangenomen",
        "Afgewezen",
        "Conversieratio (%)",
    ])?;
    for row in rollup {
        csv_writer.write_record([
            row.channel.clone(),
            row.submitted.to_string(),
            row.hired.to_string(),
            row.rejected.to_string(),
            format!("{:.1}", row.conversion_rate),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the recruiter rollup table.
pub fn write_recruiter_rollup<W: Write>(rollup: &[RecruiterRollup], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv_writer.write_record([
        "Recruiter",
        "Afdeling",
        "Totaal vacatures",
        "Totaal reacties",
        "Vervulde vacatures",
        "Fill rate (%)",
        "Gem. reacties",
    ])?;
    for row in rollup {
        csv_writer.write_record([
            row.recruiter.clone(),
            row.department.clone().unwrap_or_default(),
            row.vacancies.to_string(),
            row.responses.to_string(),
            row.filled.to_string(),
            format!("{:.1}", row.fill_rate),
            format!("{:.1}", row.mean_responses),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the department rollup table.
pub fn write_department_rollup<W: Write>(rollup: &[DepartmentRollup], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv_writer.write_record([
        "Afdeling",
        "Totaal vacatures",
        "Totaal reacties",
        "Aantal recruiters",
        "Vervulde vacatures",
        "Fill rate (%)",
        "Gem. reacties per vacature",
    ])?;
    for row in rollup {
        csv_writer.write_record([
            row.department.clone(),
            row.vacancies.to_string(),
            row.responses.to_string(),
            row.recruiters.to_string(),
            row.filled.to_string(),
            format!("{:.1}", row.fill_rate),
            format!("{:.1}", row.mean_responses),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Dates in re-ingestable form: DD-MM-YYYY or the empty cell for absence.
fn export_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
