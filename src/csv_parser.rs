//! CSV reader producing untyped rows.
//!
//! Parses CSV text into [`Row`]s whose cells are raw strings (or
//! [`Value::Null`] for null markers). No typing happens here: a column of
//! `"1.5"` strings is recognized as numeric later by
//! [`detect_column_type`](crate::profiling::detect_column_type), exactly as
//! if it had arrived as JSON strings.
//!
//! # Features
//!
//! - RFC 4180 compliant (quoted fields, escaped quotes, delimiters and
//!   newlines inside quotes)
//! - CRLF, bare CR and LF line endings; UTF-8 BOM stripped
//! - Standard null markers recognized: empty, `NA`, `N/A`, `null`, `NULL`,
//!   `None`, `NaN`, `#N/A`, `.`
//! - Configurable delimiter, header row and null markers
//!
//! # Example
//!
//! ```
//! use u_eda::csv_parser::CsvParser;
//! use u_eda::value::Value;
//!
//! let csv = "name,value\nAlice,1.5\nBob,NA\n";
//! let rows = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0]["value"], Value::Text("1.5".into()));
//! assert_eq!(rows[1]["value"], Value::Null);
//! ```

use crate::error::EdaError;
use crate::table::Row;
use crate::value::Value;

/// Standard null value markers recognized during parsing.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", ".",
    "NaN", "nan", "NAN", "#N/A", "#NA",
];

/// CSV parser configuration and entry point.
///
/// ```
/// use u_eda::csv_parser::CsvParser;
///
/// let rows = CsvParser::new().delimiter(b';').parse_str("a;b\n1;2\n").unwrap();
/// assert_eq!(rows[0].len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Creates a parser with default settings (comma delimiter, header row, standard null markers).
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets whether the first row is a header (default: true).
    ///
    /// Without a header, columns are named `col_0`, `col_1`, ...
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Sets custom null markers (replaces defaults).
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text into rows keyed by header name.
    ///
    /// Every data row must have as many fields as the header. A repeated
    /// header name keeps its first position; the later field's value wins.
    pub fn parse_str(&self, input: &str) -> Result<Vec<Row>, EdaError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let raw_rows = self.parse_raw(input);
        let Some((_, first)) = raw_rows.first() else {
            return Ok(Vec::new());
        };

        let (headers, data_rows): (Vec<String>, &[(usize, Vec<String>)]) = if self.has_header {
            let headers = first.iter().map(|h| h.trim().to_string()).collect();
            (headers, &raw_rows[1..])
        } else {
            let headers = (0..first.len()).map(|i| format!("col_{i}")).collect();
            (headers, &raw_rows[..])
        };

        let n_cols = headers.len();
        let mut rows = Vec::with_capacity(data_rows.len());
        for (line, fields) in data_rows {
            if fields.len() != n_cols {
                return Err(EdaError::CsvParse {
                    line: *line,
                    message: format!("expected {n_cols} fields, got {}", fields.len()),
                });
            }
            let row: Row = headers
                .iter()
                .zip(fields)
                .map(|(name, field)| (name.clone(), self.cell(field)))
                .collect();
            rows.push(row);
        }

        Ok(rows)
    }

    /// Parses a CSV file from disk into rows.
    pub fn parse_file(&self, path: &str) -> Result<Vec<Row>, EdaError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    // ── Internal parsing ─────────────────────────────────────────

    /// Converts a raw field to a cell: null marker → `Null`, else trimmed text.
    ///
    /// Quoting is not consulted, so a quoted `""` or `"NA"` is a null
    /// marker like its bare form.
    fn cell(&self, field: &str) -> Value {
        let trimmed = field.trim();
        if self.null_markers.iter().any(|m| m == trimmed) {
            Value::Null
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    /// Splits raw CSV text into records of string fields, each tagged with
    /// the 1-based line on which it starts.
    ///
    /// Only an empty line is skipped. A record of empty fields such as `,`
    /// is kept, and so is a lone `""`.
    fn parse_raw(&self, input: &str) -> Vec<(usize, Vec<String>)> {
        let delim = self.delimiter as char;
        let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
        let mut current_row: Vec<String> = Vec::new();
        let mut current_field = String::new();
        let mut in_quotes = false;
        let mut field_quoted = false;
        let mut line = 1usize;
        let mut row_start = 1usize;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current_field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    // a CR followed by LF is counted once, at the LF
                    if c == '\n' || (c == '\r' && chars.peek() != Some(&'\n')) {
                        line += 1;
                    }
                    current_field.push(c);
                }
            } else if c == '"' && current_field.is_empty() {
                in_quotes = true;
                field_quoted = true;
            } else if c == delim {
                current_row.push(std::mem::take(&mut current_field));
                field_quoted = false;
            } else if c == '\n' || c == '\r' {
                // \r\n counts as one line break
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                let blank = current_row.is_empty() && current_field.is_empty() && !field_quoted;
                if !blank {
                    current_row.push(std::mem::take(&mut current_field));
                    rows.push((row_start, std::mem::take(&mut current_row)));
                }
                field_quoted = false;
                line += 1;
                row_start = line;
            } else {
                current_field.push(c);
            }
        }

        if !current_field.is_empty() || !current_row.is_empty() || field_quoted {
            current_row.push(current_field);
            rows.push((row_start, current_row));
        }

        rows
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
