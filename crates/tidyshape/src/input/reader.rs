//! Typed delimited-text and JSON table reader with delimiter detection.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, DataType, Table, Value};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the first line is a `name:type` header.
    pub has_header: bool,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads tables from typed delimited text or JSON.
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    config: ReaderConfig,
}

impl TableReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read a file; `.json` files are read as JSON, anything else as
    /// delimited text.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| TidyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let table = if is_json {
            self.read_json(&contents)?
        } else {
            self.read_bytes(&contents)?
        };
        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "read table"
        );
        Ok(table)
    }

    /// Parse delimited text held in a string.
    pub fn read_str(&self, text: &str) -> Result<Table> {
        self.read_bytes(text.as_bytes())
    }

    /// Parse delimited text.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);
        let mut records = reader.records();

        let schema: Vec<(String, DataType)>;
        let mut pending = None;
        if self.config.has_header {
            let header = records
                .next()
                .ok_or_else(|| TidyError::EmptyData("No header row found".to_string()))??;
            schema = header.iter().map(parse_header_cell).collect();
        } else {
            let first = records
                .next()
                .ok_or_else(|| TidyError::EmptyData("No data rows found".to_string()))??;
            schema = (0..first.len())
                .map(|i| (format!("column_{}", i + 1), DataType::Text))
                .collect();
            pending = Some(first);
        }
        if schema.is_empty() {
            return Err(TidyError::EmptyData("No columns found".to_string()));
        }

        let mut cells: Vec<Vec<Option<Value>>> = vec![Vec::new(); schema.len()];
        let rows = pending.into_iter().map(Ok).chain(records);
        for (row, result) in rows.enumerate() {
            if self.config.max_rows.is_some_and(|max| row >= max) {
                break;
            }
            let record = result?;
            // Short rows are padded with absent cells; extra cells are ignored.
            for (column, (_, data_type)) in schema.iter().enumerate() {
                let raw = record.get(column).unwrap_or("");
                let value = if is_missing_token(raw) {
                    None
                } else {
                    let parsed = Value::parse(raw, *data_type).map_err(|message| TidyError::Parse {
                        row,
                        column,
                        message,
                    })?;
                    Some(parsed)
                };
                cells[column].push(value);
            }
        }

        let columns = schema
            .into_iter()
            .zip(cells)
            .map(|((name, data_type), values)| Column::new(name, data_type, values))
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Parse the JSON table format: `{"columns": [{"name", "type", "values"}]}`.
    pub fn read_json(&self, bytes: &[u8]) -> Result<Table> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Whether a raw token denotes a missing value.
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// `name:type` header cell; the type token is validated separately.
static TYPED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.+):(?P<ty>[A-Za-z0-9_]+)$").unwrap());

/// Split `name:type`. A suffix that is not a type name stays part of the name.
fn parse_header_cell(cell: &str) -> (String, DataType) {
    let cell = cell.trim();
    TYPED_HEADER
        .captures(cell)
        .and_then(|caps| {
            let data_type = caps["ty"].parse::<DataType>().ok()?;
            Some((caps["name"].to_string(), data_type))
        })
        .unwrap_or_else(|| (cell.to_string(), DataType::Text))
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(TidyError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b'\t';
    let mut best_score = 0;
    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();
        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines win; tab breaks ties.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + usize::from(delim == b'\t') * 100
        } else {
            first_count
        };
        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
