//! Aggregate command - reduce groups of rows to one row each.

use std::path::PathBuf;

use tidyshape::{AggSpec, Tidy, TidyConfig};

use super::{parse_agg, write_output, CommandResult};
use crate::cli::OutputArgs;

pub fn run(
    config: TidyConfig,
    file: PathBuf,
    by: Vec<String>,
    aggs: Vec<String>,
    output: OutputArgs,
) -> CommandResult {
    let mut spec = AggSpec::new(by);
    for text in &aggs {
        let (name, reduction, source) = parse_agg(text)?;
        spec = spec.output(name, source, reduction);
    }

    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;
    let summary = tidy.aggregate(&table, &spec)?;
    write_output(&summary, &output, tidy.config())
}
