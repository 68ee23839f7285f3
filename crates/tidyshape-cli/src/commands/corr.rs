//! Corr command - pairwise-complete correlation matrix.

use std::path::PathBuf;

use tidyshape::{CorrelationMethod, Tidy, TidyConfig};

use super::{write_output, CommandResult};
use crate::cli::OutputArgs;

pub fn run(
    mut config: TidyConfig,
    file: PathBuf,
    columns: Vec<String>,
    method: Option<CorrelationMethod>,
    output: OutputArgs,
) -> CommandResult {
    if let Some(method) = method {
        config.correlation_method = method;
    }

    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;
    let columns: Vec<String> = if columns.is_empty() {
        table
            .columns()
            .filter(|c| c.data_type().is_numeric())
            .map(|c| c.name().to_string())
            .collect()
    } else {
        columns
    };
    if columns.is_empty() {
        return Err(format!("{} has no numeric columns to correlate", file.display()).into());
    }

    let matrix = tidy.correlation(&table, &columns)?;
    let insufficient = (0..matrix.len())
        .flat_map(|i| (i..matrix.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| matrix.cell(i, j).value().is_none())
        .count();
    if insufficient > 0 {
        tracing::warn!(
            cells = insufficient,
            "some correlations are undefined or lack paired observations; written as NA"
        );
    }
    write_output(&matrix.to_table()?, &output, tidy.config())
}
