use std::path::PathBuf;
use thiserror::Error;

use chrono::NaiveDate;

/// All errors produced by the ATS analytics pipeline.
///
/// Only ingestion-level failures are fatal; everything below that level
/// (missing optional columns, unparsable dates, empty period results)
/// degrades gracefully and never surfaces as an `Err`.
#[derive(Error, Debug)]
pub enum InsightError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// None of the trial encodings could decode the byte stream.
    #[error("No supported text encoding could decode the file (tried: {})", .attempted.join(", "))]
    EncodingDetection {
        /// Names of the encodings that were attempted, in trial order.
        attempted: Vec<String>,
    },

    /// The CSV structure could not be parsed after a clean decode, or a
    /// CSV re-export failed to write.
    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    /// The file decoded and parsed but contains no header row.
    #[error("CSV file has no header row")]
    MissingHeader,

    /// A custom period with start after end.
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// A date string supplied on the command line did not match DD-MM-YYYY.
    #[error("Invalid date \"{0}\", expected DD-MM-YYYY")]
    DateArgument(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insight crates.
pub type Result<T> = std::result::Result<T, InsightError>;
