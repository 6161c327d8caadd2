use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Recruitment analytics for ATS CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ats-insight",
    about = "Recruitment analytics for ATS CSV exports",
    version
)]
pub struct Settings {
    /// Path to the semicolon-delimited ATS export
    pub input: PathBuf,

    /// Reporting period
    #[arg(long, default_value = "all", value_parser = [
        "all",
        "last-7-days",
        "last-14-days",
        "last-30-days",
        "last-90-days",
        "current-month",
        "previous-month",
        "current-quarter",
        "current-year",
        "last-year",
        "custom",
    ])]
    pub period: String,

    /// Custom period start (DD-MM-YYYY, requires --period custom)
    #[arg(long)]
    pub start: Option<String>,

    /// Custom period end (DD-MM-YYYY, requires --period custom)
    #[arg(long)]
    pub end: Option<String>,

    /// Minimum vacancies before a recruiter row is shown
    #[arg(long, default_value = "3")]
    pub min_vacancies: usize,

    /// Directory to write the CSV export tables into
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Print the computed metrics as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
