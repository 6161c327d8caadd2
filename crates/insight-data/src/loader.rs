//! CSV ingestion: encoding detection and table parsing.
//!
//! The export's encoding is unknown a priori, so decoding walks a fixed
//! ordered trial list; the first encoding that decodes the whole buffer
//! without error wins. Correctness is judged by decode success alone;
//! garbled-but-decodable content passes by design (best effort, not
//! content validation).

use insight_core::error::{InsightError, Result};
use insight_core::schema::SchemaMap;
use tracing::debug;

/// Encoding names tried in order against the raw bytes.
pub const ENCODING_TRIALS: &[&str] = &["utf-8", "windows-1252", "latin-1"];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ── RawTable ──────────────────────────────────────────────────────────────────

/// A parsed export: trimmed headers plus string cells, with a header
/// registry for presence checks and index lookups.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    schema: SchemaMap,
}

impl RawTable {
    /// Trimmed header names, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The header registry.
    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row index and column name.
    ///
    /// Returns `None` when the column does not exist, the row index is out
    /// of bounds, or the cell is blank; absence and blankness collapse to
    /// the same "no value" answer for callers.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.schema.col(column)?;
        let value = self.rows.get(row)?.get(col)?.as_str();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Numeric cell with a 0 default for absent columns and blank or
    /// unparsable values.
    ///
    /// Exports sometimes render counts as floats ("12.0"); those are
    /// accepted and truncated. Negative values clamp to 0; counts are
    /// non-negative by contract.
    pub fn count(&self, row: usize, column: &str) -> u32 {
        let Some(value) = self.cell(row, column) else {
            return 0;
        };
        if let Ok(n) = value.parse::<u32>() {
            return n;
        }
        match value.parse::<f64>() {
            Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u32,
            _ => 0,
        }
    }

    /// Overwrite a cell in place. Returns `false` when the column or row
    /// does not exist.
    pub fn set_cell(&mut self, row: usize, column: &str, value: String) -> bool {
        let Some(col) = self.schema.col(column) else {
            return false;
        };
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Drop a column and reindex. Returns `true` when the column existed.
    pub fn remove_column(&mut self, column: &str) -> bool {
        let Some(col) = self.schema.col(column) else {
            return false;
        };
        self.headers.remove(col);
        for row in &mut self.rows {
            if col < row.len() {
                row.remove(col);
            }
        }
        self.schema = SchemaMap::from_headers(&self.headers);
        true
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Decode and parse a raw export.
///
/// Returns the table plus the name of the encoding that won the trial.
/// Decode failure for one encoding is recoverable (the next trial runs);
/// a CSV structure failure after a clean decode is fatal.
pub fn load(bytes: &[u8]) -> Result<(RawTable, &'static str)> {
    let (text, encoding) = decode(bytes)?;
    let table = parse_table(&text)?;
    debug!(
        "loaded {} rows, {} columns ({} encoding)",
        table.row_count(),
        table.headers().len(),
        encoding
    );
    Ok((table, encoding))
}

/// Walk the encoding trial list over the whole buffer.
fn decode(bytes: &[u8]) -> Result<(String, &'static str)> {
    // A UTF-8 BOM is metadata, not content.
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    for &name in ENCODING_TRIALS {
        match try_decode(bytes, name) {
            Some(text) => {
                debug!("decoded input as {}", name);
                return Ok((text, name));
            }
            None => debug!("{} could not decode the file, trying next", name),
        }
    }

    Err(InsightError::EncodingDetection {
        attempted: ENCODING_TRIALS.iter().map(|s| s.to_string()).collect(),
    })
}

/// Strict whole-buffer decode for one named trial; `None` on any
/// malformed sequence.
fn try_decode(bytes: &[u8], name: &str) -> Option<String> {
    match name {
        "utf-8" => encoding_rs::UTF_8
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|cow| cow.into_owned()),
        "windows-1252" => {
            // encoding_rs follows the WHATWG index, which maps the five
            // bytes Microsoft left undefined onto C1 controls instead of
            // erroring. Reject them here so this trial can genuinely fail
            // and fall through to latin-1.
            const UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];
            if bytes.iter().any(|b| UNDEFINED.contains(b)) {
                return None;
            }
            encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|cow| cow.into_owned())
        }
        // The WHATWG label set folds iso-8859-1 into windows-1252, so the
        // final trial is the lossless 1:1 byte widening. It cannot fail.
        "latin-1" => Some(bytes.iter().map(|&b| b as char).collect()),
        _ => None,
    }
}

/// Parse decoded text as `;`-delimited CSV with a header row.
fn parse_table(text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(InsightError::MissingHeader);
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(RawTable {
        schema: SchemaMap::from_headers(&headers),
        headers,
        rows,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(text: &str) -> RawTable {
        let (table, _) = load(text.as_bytes()).unwrap();
        table
    }

    // ── Encoding trials ───────────────────────────────────────────────────────

    #[test]
    fn test_decode_valid_utf8() {
        let (table, encoding) = load("Functie;Eigenaar\nCoördinator;Jan".as_bytes()).unwrap();
        assert_eq!(encoding, "utf-8");
        assert_eq!(table.cell(0, "Functie"), Some("Coördinator"));
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // "Coördinator" with ö as the single 0xF6 byte: invalid UTF-8,
        // valid windows-1252.
        let mut bytes = b"Functie;Eigenaar\nCo".to_vec();
        bytes.push(0xF6);
        bytes.extend_from_slice(b"rdinator;Jan");

        let (table, encoding) = load(&bytes).unwrap();
        assert_eq!(encoding, "windows-1252");
        assert_eq!(table.cell(0, "Functie"), Some("Coördinator"));
    }

    #[test]
    fn test_decode_latin1_last_resort() {
        // 0x81 is invalid UTF-8 and unmapped in windows-1252; only the
        // final latin-1 widening accepts it.
        let mut bytes = b"Functie\nx".to_vec();
        bytes.push(0x81);

        let (_, encoding) = load(&bytes).unwrap();
        assert_eq!(encoding, "latin-1");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Functie;Status vacature\nVerpleegkundige;Nieuw");

        let (table, _) = load(&bytes).unwrap();
        assert_eq!(table.cell(0, "Functie"), Some("Verpleegkundige"));
        assert!(table.schema().has("Functie"));
    }

    // ── Table parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_headers_are_trimmed() {
        let table = load_str("  Functie ; Status vacature \nVerpleegkundige;Nieuw");
        assert!(table.schema().has("Functie"));
        assert!(table.schema().has("Status vacature"));
    }

    #[test]
    fn test_blank_cell_reads_as_none() {
        let table = load_str("Functie;Afdeling\nVerpleegkundige;\n;Zorg");
        assert_eq!(table.cell(0, "Afdeling"), None);
        assert_eq!(table.cell(1, "Functie"), None);
        assert_eq!(table.cell(1, "Afdeling"), Some("Zorg"));
    }

    #[test]
    fn test_missing_column_reads_as_none() {
        let table = load_str("Functie\nVerpleegkundige");
        assert_eq!(table.cell(0, "Afdeling"), None);
    }

    #[test]
    fn test_row_out_of_bounds_reads_as_none() {
        let table = load_str("Functie\nVerpleegkundige");
        assert_eq!(table.cell(5, "Functie"), None);
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let err = load("a;b\n1;2;3".as_bytes()).unwrap_err();
        assert!(matches!(err, InsightError::Csv(_)));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = load(b"").unwrap_err();
        assert!(matches!(err, InsightError::MissingHeader));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let table = load_str("Functie;Status vacature\n");
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    // ── count ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_count_parses_integers_and_floats() {
        let table = load_str("Aantal reacties\n12\n12.0\n\nabc\n-3");
        assert_eq!(table.count(0, "Aantal reacties"), 12);
        assert_eq!(table.count(1, "Aantal reacties"), 12);
        assert_eq!(table.count(2, "Aantal reacties"), 0);
        assert_eq!(table.count(3, "Aantal reacties"), 0);
        assert_eq!(table.count(4, "Aantal reacties"), 0);
    }

    #[test]
    fn test_count_defaults_to_zero_for_missing_column() {
        let table = load_str("Functie\nVerpleegkundige");
        assert_eq!(table.count(0, "Aantal reacties"), 0);
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    #[test]
    fn test_set_cell() {
        let mut table = load_str("Eigenaar\nJan de Boer");
        assert!(table.set_cell(0, "Eigenaar", "Jan".to_string()));
        assert_eq!(table.cell(0, "Eigenaar"), Some("Jan"));
        assert!(!table.set_cell(0, "Onbestaand", "x".to_string()));
    }

    #[test]
    fn test_remove_column_reindexes() {
        let mut table = load_str("Functie;E-mail;Afdeling\nVerpleegkundige;j@x.nl;Zorg");
        assert!(table.remove_column("E-mail"));
        assert!(!table.schema().has("E-mail"));
        // Columns after the removed one still resolve correctly.
        assert_eq!(table.cell(0, "Afdeling"), Some("Zorg"));
        assert!(!table.remove_column("E-mail"));
    }
}
