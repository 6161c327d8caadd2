//! Ingestion and aggregation layer for the ATS analytics pipeline.
//!
//! Responsible for decoding and parsing the semicolon-delimited export,
//! normalizing dates, applying the privacy filter, building the record
//! set, and computing the rollup tables, completeness report and CSV
//! re-export.

pub mod aggregator;
pub mod completeness;
pub mod export;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod privacy;

pub use insight_core as core;
