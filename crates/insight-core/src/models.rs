use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display label used wherever an absent text value must be shown.
pub const UNKNOWN_LABEL: &str = "Onbekend";

/// The closed catalog of recruitment channels tracked by the source system.
///
/// Order matters: ties in channel rankings are broken by position in this
/// list, and the sparse per-record channel maps are keyed by index into it.
/// `"Anders"` is the catch-all bucket.
pub const CHANNEL_CATALOG: &[&str] = &[
    "V&VN",
    "Indeed",
    "Infopuntzorg",
    "Zorgselect",
    "Facebook",
    "Linkedin",
    "Twitter",
    "Instagram",
    "Via medewerker van SEIN",
    "Anders",
];

// ── Status taxonomy ───────────────────────────────────────────────────────────

/// One of the known vacancy statuses from the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacancyStatus {
    /// Freshly entered requisition ("Nieuw").
    New,
    /// Intake with the hiring manager ("Intake").
    Intake,
    /// Vacancy text with the hiring manager ("Tekst bij vacaturehouder").
    DraftWithHolder,
    /// Vacancy text approved ("Tekst akkoord").
    DraftApproved,
    /// Published internally only ("Publicatie intern").
    PublishedInternal,
    /// Published internally and externally ("Publicatie in- en extern").
    Published,
    /// Candidates in procedure ("In procedure").
    InProcedure,
    /// Filled by an internal candidate ("Intern vervuld").
    FilledInternal,
    /// Filled by an external candidate ("Extern vervuld").
    FilledExternal,
    /// Withdrawn before being filled ("Ingetrokken").
    Withdrawn,
    /// Closed without a hire ("Niet vervuld").
    NotFilled,
    /// Put on hold ("Geparkeerd").
    Parked,
}

/// The reviewable mapping from the exact source label to its status.
///
/// Matching is case-sensitive: labels are part of the export contract.
pub const STATUS_LABELS: &[(&str, VacancyStatus)] = &[
    ("Nieuw", VacancyStatus::New),
    ("Intake", VacancyStatus::Intake),
    ("Tekst bij vacaturehouder", VacancyStatus::DraftWithHolder),
    ("Tekst akkoord", VacancyStatus::DraftApproved),
    ("Publicatie intern", VacancyStatus::PublishedInternal),
    ("Publicatie in- en extern", VacancyStatus::Published),
    ("In procedure", VacancyStatus::InProcedure),
    ("Intern vervuld", VacancyStatus::FilledInternal),
    ("Extern vervuld", VacancyStatus::FilledExternal),
    ("Ingetrokken", VacancyStatus::Withdrawn),
    ("Niet vervuld", VacancyStatus::NotFilled),
    ("Geparkeerd", VacancyStatus::Parked),
];

impl VacancyStatus {
    /// Look up a raw status label in the catalog.
    ///
    /// Returns `None` for labels outside the closed enumeration; callers
    /// decide how to flag those (see [`VacancyRecord::status_category`]).
    pub fn parse(label: &str) -> Option<Self> {
        STATUS_LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, s)| *s)
    }

    /// The source label for this status.
    pub fn label(&self) -> &'static str {
        STATUS_LABELS
            .iter()
            .find(|(_, s)| s == self)
            .map(|(l, _)| *l)
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Single-hop mapping onto the coarse [`StatusCategory`].
    pub fn category(&self) -> StatusCategory {
        match self {
            VacancyStatus::New
            | VacancyStatus::Intake
            | VacancyStatus::DraftWithHolder
            | VacancyStatus::DraftApproved => StatusCategory::InPreparation,
            VacancyStatus::PublishedInternal
            | VacancyStatus::Published
            | VacancyStatus::InProcedure => StatusCategory::Active,
            VacancyStatus::FilledInternal | VacancyStatus::FilledExternal => {
                StatusCategory::Filled
            }
            VacancyStatus::Withdrawn | VacancyStatus::NotFilled => StatusCategory::Closed,
            VacancyStatus::Parked => StatusCategory::Parked,
        }
    }
}

/// Coarse lifecycle bucket derived from [`VacancyStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Published or in procedure.
    Active,
    /// Filled internally or externally.
    Filled,
    /// Withdrawn or closed without a hire.
    Closed,
    /// Not yet published.
    InPreparation,
    /// On hold.
    Parked,
}

impl StatusCategory {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Active => "Actief",
            StatusCategory::Filled => "Vervuld",
            StatusCategory::Closed => "Gesloten",
            StatusCategory::InPreparation => "In voorbereiding",
            StatusCategory::Parked => "Geparkeerd",
        }
    }
}

impl std::fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Counts ────────────────────────────────────────────────────────────────────

/// Per-stage candidate counts for one vacancy.
///
/// Each count comes from an independently optional source column and
/// defaults to 0 when that column is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounts {
    /// Candidates interviewed ("Gesprek gevoerd").
    pub interviews: u32,
    /// Rejected after the written screening ("Afgewezen na briefselectie").
    pub rejected_after_screening: u32,
    /// Rejected after an interview ("Afgewezen na gesprek").
    pub rejected_after_interview: u32,
    /// Hired ("Aangenomen").
    pub hired: u32,
}

/// Submitted / hired / rejected counts for one channel on one vacancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTally {
    pub submitted: u32,
    pub hired: u32,
    pub rejected: u32,
}

// ── VacancyRecord ─────────────────────────────────────────────────────────────

/// One normalized row of the ATS export: a single job requisition.
///
/// Absent text values are `None`, never the empty string. All dates are
/// calendar dates with the source's year-1900 placeholder already
/// normalized away. After the privacy stage `recruiter` holds a first
/// name only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VacancyRecord {
    /// Job title.
    pub title: Option<String>,
    /// Owning recruiter (first-name-only after anonymization).
    pub recruiter: Option<String>,
    /// Department owning the requisition.
    pub department: Option<String>,
    /// Work location.
    pub location: Option<String>,
    /// Raw status label as found in the export (trimmed).
    pub status_label: String,
    /// Parsed status; `None` when the label is outside the catalog.
    pub status: Option<VacancyStatus>,
    /// Date the requisition was created.
    pub created: Option<NaiveDate>,
    /// Date of internal-only publication.
    pub published_internal: Option<NaiveDate>,
    /// Date of internal-and-external publication.
    pub published: Option<NaiveDate>,
    /// Date the procedure started.
    pub in_procedure: Option<NaiveDate>,
    /// Date filled by an internal candidate.
    pub filled_internal: Option<NaiveDate>,
    /// Date filled by an external candidate.
    pub filled_external: Option<NaiveDate>,
    /// Date the vacancy was withdrawn.
    pub withdrawn: Option<NaiveDate>,
    /// Date the vacancy was closed without a hire.
    pub not_filled: Option<NaiveDate>,
    /// Total applicant responses.
    pub responses: u32,
    /// Per-stage candidate counts.
    pub funnel: FunnelCounts,
    /// Sparse channel tallies, keyed by index into [`CHANNEL_CATALOG`].
    ///
    /// An entry exists only when the channel's "submitted" column existed
    /// in the source file.
    pub channels: BTreeMap<usize, ChannelTally>,
}

impl VacancyRecord {
    /// The date the vacancy was filled.
    ///
    /// The external fill date takes precedence over the internal one when
    /// both exist; this is a policy choice, not an ordering artifact.
    pub fn fill_date(&self) -> Option<NaiveDate> {
        self.filled_external.or(self.filled_internal)
    }

    /// The single date the vacancy stopped being active.
    ///
    /// Fixed precedence, first match wins: fill date, then not-filled,
    /// then withdrawn.
    pub fn close_date(&self) -> Option<NaiveDate> {
        self.fill_date().or(self.not_filled).or(self.withdrawn)
    }

    /// The derived coarse status bucket.
    ///
    /// Labels outside the catalog fall back to [`StatusCategory::Active`]
    /// so aggregation never drops a row; the batch quality report carries
    /// the list of unmapped labels.
    pub fn status_category(&self) -> StatusCategory {
        self.status
            .map(|s| s.category())
            .unwrap_or(StatusCategory::Active)
    }

    /// Whether the vacancy counts as filled.
    pub fn is_filled(&self) -> bool {
        self.status_category() == StatusCategory::Filled
    }

    /// Days between creation and close, when both dates are known.
    ///
    /// May be negative for malformed source data; callers treat that as an
    /// anomaly (see [`Self::has_negative_duration`]), not as a value to
    /// clamp or discard.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.created, self.close_date()) {
            (Some(created), Some(closed)) => Some((closed - created).num_days()),
            _ => None,
        }
    }

    /// True when the close date precedes the creation date.
    pub fn has_negative_duration(&self) -> bool {
        self.duration_days().is_some_and(|d| d < 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
