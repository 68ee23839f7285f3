//! CLI command implementations.

pub mod aggregate;
pub mod cast;
pub mod corr;
pub mod describe;
pub mod extract;
pub mod join;
pub mod melt;
pub mod rank;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tidyshape::input::write_table;
use tidyshape::{DataType, OutputFormat, Reduction, Table, TidyConfig};

use crate::cli::OutputArgs;

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// `NAME=TYPE` target column of an extraction.
static GROUP_SPEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<ty>[A-Za-z_]+)\s*$").unwrap());

/// `NAME=REDUCTION(SOURCE)` aggregation output.
static AGG_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[^=\s][^=]*?)\s*=\s*(?P<reduction>[A-Za-z_]+)\s*\(\s*(?P<source>[^()]+?)\s*\)\s*$")
        .unwrap()
});

/// Load `--config`, or the defaults when none was given.
pub fn load_config(path: Option<&Path>) -> CommandResult<TidyConfig> {
    match path {
        Some(path) => Ok(TidyConfig::from_path(path)?),
        None => Ok(TidyConfig::default()),
    }
}

/// Explicit `--format`, else the output extension, else the configured format.
pub fn resolve_format(args: &OutputArgs, config: &TidyConfig) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }
    args.output
        .as_deref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
        .unwrap_or(config.output_format)
}

/// Write a result table to `--output` or stdout.
pub fn write_output(table: &Table, args: &OutputArgs, config: &TidyConfig) -> CommandResult {
    let format = resolve_format(args, config);
    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut out = BufWriter::new(file);
            write_table(table, format, &mut out)?;
            out.flush()?;
            tracing::info!(
                path = %path.display(),
                rows = table.row_count(),
                columns = table.column_count(),
                "wrote table"
            );
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_table(table, format, &mut out)?;
            if format == OutputFormat::Json {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Parse `NAME=TYPE`.
pub fn parse_group(text: &str) -> CommandResult<(String, DataType)> {
    let caps = GROUP_SPEC
        .captures(text)
        .ok_or_else(|| format!("Invalid group '{}'. Use NAME=TYPE, e.g. time=integer.", text))?;
    let data_type: DataType = caps["ty"].parse()?;
    Ok((caps["name"].to_string(), data_type))
}

/// Parse `NAME=REDUCTION(SOURCE)`.
pub fn parse_agg(text: &str) -> CommandResult<(String, Reduction, String)> {
    let caps = AGG_SPEC.captures(text).ok_or_else(|| {
        format!(
            "Invalid aggregation '{}'. Use NAME=REDUCTION(SOURCE), e.g. mean_level=mean(level).",
            text
        )
    })?;
    let reduction: Reduction = caps["reduction"].parse()?;
    Ok((caps["name"].to_string(), reduction, caps["source"].to_string()))
}

/// Parse `COLUMN` or `LEFT=RIGHT`.
pub fn parse_join_key(text: &str) -> (String, String) {
    match text.split_once('=') {
        Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
        None => (text.trim().to_string(), text.trim().to_string()),
    }
}

/// Parse `MARKER=PATTERN`; the pattern keeps any further `=`.
pub fn parse_partition(text: &str) -> CommandResult<(String, String)> {
    match text.split_once('=') {
        Some((marker, pattern)) if !marker.is_empty() && !pattern.is_empty() => {
            Ok((marker.to_string(), pattern.to_string()))
        }
        _ => Err(format!("Invalid partition '{}'. Use MARKER=PATTERN.", text).into()),
    }
}
