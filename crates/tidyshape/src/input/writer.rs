//! Table output in the same typed formats the reader accepts.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::Table;

/// Token written for absent cells in delimited output.
pub const MISSING_TOKEN: &str = "NA";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Csv => Some(b','),
            OutputFormat::Json => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(TidyError::Config(format!("Unknown output format '{}'", other))),
        }
    }
}

/// Write `table` to `out`.
///
/// Delimited output starts with a `name:type` header and writes absent cells
/// as `NA`, so it reads back into an equal table. JSON output is the
/// `{"columns": [...]}` form.
pub fn write_table<W: Write>(table: &Table, format: OutputFormat, out: W) -> Result<()> {
    let Some(delimiter) = format.delimiter() else {
        serde_json::to_writer_pretty(out, table)?;
        return Ok(());
    };

    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);
    writer.write_record(
        table
            .columns()
            .map(|c| format!("{}:{}", c.name(), c.data_type())),
    )?;
    let columns: Vec<_> = table.columns().collect();
    for row in 0..table.row_count() {
        writer.write_record(columns.iter().map(|c| {
            c.get(row)
                .map_or_else(|| MISSING_TOKEN.to_string(), ToString::to_string)
        }))?;
    }
    writer.flush().map_err(|e| TidyError::Csv(e.into()))?;
    Ok(())
}

/// Render `table` as a string.
pub fn table_to_string(table: &Table, format: OutputFormat) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(table, format, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| TidyError::Config(format!("Output is not UTF-8: {}", e)))
}
