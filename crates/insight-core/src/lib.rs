//! Domain layer for the ATS recruitment analytics pipeline.
//!
//! Holds the normalized record model and status taxonomy, the source
//! column catalog, KPI calculations, period resolution, display
//! formatting and the CLI settings. Everything here is pure; the
//! ingestion stages live in `insight-data`.

pub mod error;
pub mod formatting;
pub mod metrics;
pub mod models;
pub mod periods;
pub mod schema;
pub mod settings;
