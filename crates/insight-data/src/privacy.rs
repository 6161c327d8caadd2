//! GDPR-style privacy filtering.
//!
//! Two catalogs drive the filter: high-sensitivity columns (direct contact
//! identifiers) are removed outright, and medium-sensitivity person-name
//! columns are reduced to a first name. The transform is one-way and a
//! fixed point (running it again changes nothing) and it runs before any
//! column reaches aggregation, display, or export.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::RawTable;

/// Replacement for a name that is empty after stripping; never the empty
/// string.
pub const ANONYMOUS_PLACEHOLDER: &str = "Anoniem";

/// Direct contact identifiers, removed unconditionally when present.
pub const HIGH_RISK_COLUMNS: &[&str] = &[
    "Mobiel",
    "E-mail",
    "E-mail werk",
    "Gekoppelde kandidaten",
    "Contactpersoon telefoonnummer",
    "Contactpersoon e-mail",
    "Tweede contactpersoon telefoonnummer",
    "Tweede contactpersoon e-mail",
];

/// Person-name columns, reduced to a first name when present.
pub const NAME_COLUMNS: &[&str] = &[
    "Eigenaar",
    "Vacaturehouder",
    "HR-adviseur",
    "Eigenaar afdeling",
    "Selectiecommissielid 1",
    "Selectiecommissielid 2",
    "Selectiecommissielid 3",
    "Contactpersoon voor sollicitanten",
    "Tweede contactpersoon voor sollicitanten",
];

// ── PrivacyDisclosure ─────────────────────────────────────────────────────────

/// What the filter did, for transparency toward the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyDisclosure {
    /// High-sensitivity columns that were present and removed.
    pub removed_columns: Vec<String>,
    /// Name columns that were present and anonymized.
    pub anonymized_columns: Vec<String>,
}

impl PrivacyDisclosure {
    /// True when the source contained nothing sensitive.
    pub fn is_empty(&self) -> bool {
        self.removed_columns.is_empty() && self.anonymized_columns.is_empty()
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

/// Scrub the table in place and disclose what happened.
pub fn apply(table: &mut RawTable) -> PrivacyDisclosure {
    let mut disclosure = PrivacyDisclosure::default();

    for column in HIGH_RISK_COLUMNS {
        if table.remove_column(column) {
            disclosure.removed_columns.push((*column).to_string());
        }
    }
    if !disclosure.removed_columns.is_empty() {
        info!(
            "privacy: removed sensitive columns: {}",
            disclosure.removed_columns.join(", ")
        );
    }

    for column in NAME_COLUMNS {
        if !table.schema().has(column) {
            continue;
        }
        for row in 0..table.row_count() {
            // Blank cells stay blank: absence is not a name to anonymize.
            let Some(value) = table.cell(row, column).map(str::to_string) else {
                continue;
            };
            let anonymized = anonymize_name(&value);
            if anonymized != value {
                table.set_cell(row, column, anonymized);
            }
        }
        disclosure.anonymized_columns.push((*column).to_string());
    }
    if !disclosure.anonymized_columns.is_empty() {
        info!(
            "privacy: anonymized name columns to first name: {}",
            disclosure.anonymized_columns.join(", ")
        );
    }

    disclosure
}

/// Reduce a person name to its first name.
///
/// Decodes HTML entities and strips markup first, then keeps only the
/// first whitespace-delimited token, filtered down to letters (including
/// extended Latin diacritics), hyphen, apostrophe, and period. An empty
/// result maps to [`ANONYMOUS_PLACEHOLDER`].
pub fn anonymize_name(raw: &str) -> String {
    let cleaned = clean_html(raw);
    let first = cleaned.split_whitespace().next().unwrap_or("");
    let kept: String = first
        .chars()
        .filter(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
        .collect();
    if kept.is_empty() {
        ANONYMOUS_PLACEHOLDER.to_string()
    } else {
        kept
    }
}

/// Decode HTML entities and strip markup from a text value.
///
/// Exports from the source system routinely carry entity-encoded
/// diacritics (e.g. `Co&ouml;rdinator`).
pub fn clean_html(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    tag_pattern().replace_all(&decoded, "").into_owned()
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    fn table(text: &str) -> RawTable {
        let (table, _) = loader::load(text.as_bytes()).unwrap();
        table
    }

    // ── anonymize_name ────────────────────────────────────────────────────────

    #[test]
    fn test_anonymize_keeps_first_name_only() {
        assert_eq!(anonymize_name("Jan de Boer"), "Jan");
        assert_eq!(anonymize_name("Anne-Marie Jansen"), "Anne-Marie");
    }

    #[test]
    fn test_anonymize_decodes_entities() {
        assert_eq!(anonymize_name("&Eacute;lise van Dam"), "Élise");
        assert_eq!(anonymize_name("Co&ouml;rdinator"), "Coördinator");
    }

    #[test]
    fn test_anonymize_strips_markup() {
        assert_eq!(anonymize_name("<b>Jan</b> de Boer"), "Jan");
    }

    #[test]
    fn test_anonymize_keeps_diacritics() {
        assert_eq!(anonymize_name("Jürgen Müller"), "Jürgen");
        assert_eq!(anonymize_name("François Dupont"), "François");
    }

    #[test]
    fn test_anonymize_all_stripped_becomes_placeholder() {
        assert_eq!(anonymize_name("12345"), ANONYMOUS_PLACEHOLDER);
        assert_eq!(anonymize_name("(!)"), ANONYMOUS_PLACEHOLDER);
        assert_ne!(anonymize_name("12345"), "");
    }

    #[test]
    fn test_anonymize_is_a_fixed_point() {
        for input in ["Jan de Boer", "Anne-Marie", "12345", "J.P. Balkenende"] {
            let once = anonymize_name(input);
            assert_eq!(anonymize_name(&once), once, "input: {input}");
        }
        assert_eq!(
            anonymize_name(ANONYMOUS_PLACEHOLDER),
            ANONYMOUS_PLACEHOLDER
        );
    }

    // ── clean_html ────────────────────────────────────────────────────────────

    #[test]
    fn test_clean_html_decodes_common_entities() {
        assert_eq!(clean_html("Zorg &amp; Welzijn"), "Zorg & Welzijn");
        assert_eq!(clean_html("Co&ouml;rdinator"), "Coördinator");
    }

    #[test]
    fn test_clean_html_strips_tags() {
        assert_eq!(clean_html("<p>Verpleegkundige</p>"), "Verpleegkundige");
    }

    #[test]
    fn test_clean_html_plain_text_unchanged() {
        assert_eq!(clean_html("Verpleegkundige IC"), "Verpleegkundige IC");
    }

    // ── apply ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_removes_high_risk_columns() {
        let mut t = table("Functie;E-mail;Mobiel\nVerpleegkundige;j@x.nl;0612345678");
        let disclosure = apply(&mut t);

        assert!(!t.schema().has("E-mail"));
        assert!(!t.schema().has("Mobiel"));
        assert!(t.schema().has("Functie"));
        assert_eq!(
            disclosure.removed_columns,
            vec!["Mobiel".to_string(), "E-mail".to_string()]
        );
    }

    #[test]
    fn test_apply_anonymizes_name_columns() {
        let mut t = table("Eigenaar;Vacaturehouder\nJan de Boer;Piet Klaassen");
        let disclosure = apply(&mut t);

        assert_eq!(t.cell(0, "Eigenaar"), Some("Jan"));
        assert_eq!(t.cell(0, "Vacaturehouder"), Some("Piet"));
        assert!(disclosure
            .anonymized_columns
            .contains(&"Eigenaar".to_string()));
    }

    #[test]
    fn test_apply_leaves_blank_names_blank() {
        let mut t = table("Eigenaar;Functie\n;Verpleegkundige");
        apply(&mut t);
        // An absent recruiter must stay absent so rollups can exclude it.
        assert_eq!(t.cell(0, "Eigenaar"), None);
    }

    #[test]
    fn test_apply_untouched_table_discloses_nothing() {
        let mut t = table("Functie;Status vacature\nVerpleegkundige;Nieuw");
        let disclosure = apply(&mut t);
        assert!(disclosure.is_empty());
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let mut t = table("Eigenaar;E-mail\nJan de Boer;j@x.nl");
        apply(&mut t);
        let first_pass = t.cell(0, "Eigenaar").map(str::to_string);

        let second = apply(&mut t);
        assert_eq!(t.cell(0, "Eigenaar").map(str::to_string), first_pass);
        assert!(second.removed_columns.is_empty());
    }
}
