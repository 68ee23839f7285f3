//! Extract command - split a label column into typed key columns.

use std::path::PathBuf;

use regex::Regex;
use tidyshape::{DataType, ExtractMode, KeySpec, Partition, Tidy, TidyConfig};

use super::{parse_group, parse_partition, write_output, CommandResult};
use crate::cli::OutputArgs;

#[allow(clippy::too_many_arguments)]
pub fn run(
    mut config: TidyConfig,
    file: PathBuf,
    column: String,
    pattern: Option<String>,
    groups: Vec<String>,
    partitions: Vec<String>,
    lenient: bool,
    output: OutputArgs,
) -> CommandResult {
    let groups = groups
        .iter()
        .map(|g| parse_group(g))
        .collect::<CommandResult<Vec<_>>>()?;
    if lenient {
        config.extract_mode = ExtractMode::Lenient;
    }

    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;
    let keyed = match pattern {
        Some(pattern) => {
            let spec = KeySpec::new(&pattern, &groups)?;
            tidy.extract(&table, &column, &spec)?
        }
        None => {
            let partitions = partitions
                .iter()
                .map(|p| build_partition(p, &groups))
                .collect::<CommandResult<Vec<_>>>()?;
            tidy.extract_partitioned(&table, &column, &partitions)?
        }
    };
    write_output(&keyed, &output, tidy.config())
}

/// A partition declares the subset of `--group` targets its pattern captures.
fn build_partition(text: &str, groups: &[(String, DataType)]) -> CommandResult<Partition> {
    let (marker, pattern) = parse_partition(text)?;
    let names: Vec<String> = Regex::new(&pattern)?
        .capture_names()
        .flatten()
        .map(str::to_string)
        .collect();
    let declared: Vec<(String, DataType)> = groups
        .iter()
        .filter(|(name, _)| names.contains(name))
        .cloned()
        .collect();
    Ok(Partition::new(marker, KeySpec::new(&pattern, &declared)?))
}
