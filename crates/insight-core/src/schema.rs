//! Column catalog and header registry for the ATS export format.
//!
//! The source system emits string-keyed, optionally-present columns. This
//! module gives every logical field an explicit name constant and wraps the
//! header row in a [`SchemaMap`] so that presence checks and index lookups
//! live in one place instead of being scattered through aggregation code.

use std::collections::HashMap;

/// Exact, case-sensitive column names from the ATS export.
pub mod columns {
    /// Job title.
    pub const TITLE: &str = "Functie";
    /// Raw vacancy status label.
    pub const STATUS: &str = "Status vacature";
    /// Owning recruiter.
    pub const RECRUITER: &str = "Eigenaar";
    /// Department.
    pub const DEPARTMENT: &str = "Afdeling";
    /// Work location.
    pub const LOCATION: &str = "Locatie";
    /// Requisition creation date.
    pub const CREATED: &str = "Datum aanmaak";
    /// Total applicant responses.
    pub const RESPONSES: &str = "Aantal reacties";

    // Lifecycle status dates. Each column holds the date the vacancy
    // entered that status.
    pub const NEW: &str = "Nieuw";
    pub const INTAKE: &str = "Intake";
    pub const DRAFT_WITH_HOLDER: &str = "Tekst bij vacaturehouder";
    pub const DRAFT_APPROVED: &str = "Tekst akkoord";
    pub const PUBLISHED_INTERNAL: &str = "Publicatie intern";
    pub const PUBLISHED: &str = "Publicatie in- en extern";
    pub const IN_PROCEDURE: &str = "In procedure";
    pub const FILLED_INTERNAL: &str = "Intern vervuld";
    pub const FILLED_EXTERNAL: &str = "Extern vervuld";
    pub const WITHDRAWN: &str = "Ingetrokken";
    pub const NOT_FILLED: &str = "Niet vervuld";

    // Internal/external posting windows.
    pub const START_INTERNAL: &str = "Startdatum intern";
    pub const END_INTERNAL: &str = "Einddatum intern";
    pub const START_EXTERNAL: &str = "Startdatum extern";
    pub const END_EXTERNAL: &str = "Einddatum extern";

    // Per-stage candidate counts.
    pub const INTERVIEWS: &str = "Aantal in status: Gesprek gevoerd";
    pub const REJECTED_AFTER_SCREENING: &str = "Aantal in status: Afgewezen na briefselectie";
    pub const REJECTED_AFTER_INTERVIEW: &str = "Aantal in status: Afgewezen na gesprek";
    pub const HIRED: &str = "Aantal in status: Aangenomen";
}

/// Column name carrying a channel's submitted-applicant count.
pub fn channel_submitted_column(channel: &str) -> String {
    format!("Totaal per wervingskanaal: {channel}")
}

/// Column name carrying a channel's hired count.
pub fn channel_hired_column(channel: &str) -> String {
    format!("Totaal per wervingskanaal (aangenomen): {channel}")
}

/// Column name carrying a channel's rejected count.
pub fn channel_rejected_column(channel: &str) -> String {
    format!("Totaal per wervingskanaal (afgewezen): {channel}")
}

/// All recognized date-bearing columns, in catalog order.
///
/// The date normalizer scans exactly this set; anything else stays text.
pub fn date_columns() -> &'static [&'static str] {
    &[
        columns::CREATED,
        columns::NEW,
        columns::INTAKE,
        columns::DRAFT_WITH_HOLDER,
        columns::DRAFT_APPROVED,
        columns::PUBLISHED_INTERNAL,
        columns::PUBLISHED,
        columns::IN_PROCEDURE,
        columns::FILLED_INTERNAL,
        columns::FILLED_EXTERNAL,
        columns::WITHDRAWN,
        columns::NOT_FILLED,
        columns::START_INTERNAL,
        columns::END_INTERNAL,
        columns::START_EXTERNAL,
        columns::END_EXTERNAL,
    ]
}

/// Columns the analytics expect but that exports routinely omit.
///
/// A missing entry degrades the related feature and produces a
/// [`SchemaWarning`]; it never aborts ingestion.
pub fn expected_optional_columns() -> &'static [&'static str] {
    &[
        columns::STATUS,
        columns::RECRUITER,
        columns::DEPARTMENT,
        columns::LOCATION,
        columns::CREATED,
        columns::RESPONSES,
        columns::FILLED_INTERNAL,
        columns::FILLED_EXTERNAL,
        columns::WITHDRAWN,
        columns::NOT_FILLED,
        columns::INTERVIEWS,
        columns::HIRED,
    ]
}

// ── SchemaMap ─────────────────────────────────────────────────────────────────

/// Header-name → column-index registry for one parsed table.
#[derive(Debug, Clone, Default)]
pub struct SchemaMap {
    index: HashMap<String, usize>,
}

impl SchemaMap {
    /// Build the registry from a trimmed header row.
    ///
    /// On duplicate header names the first occurrence wins.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { index }
    }

    /// Index of a column, if present.
    pub fn col(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether a column exists in this table.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered columns.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the header row was empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// ── SchemaWarning ─────────────────────────────────────────────────────────────

/// Non-fatal note that an expected-but-optional column is missing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchemaWarning {
    /// The missing column name.
    pub column: String,
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected column \"{}\" is missing; related analytics are degraded",
            self.column
        )
    }
}

/// Compare the registry against the expected-optional catalog.
pub fn missing_optional_columns(schema: &SchemaMap) -> Vec<SchemaWarning> {
    expected_optional_columns()
        .iter()
        .filter(|name| !schema.has(name))
        .map(|name| SchemaWarning {
            column: (*name).to_string(),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
