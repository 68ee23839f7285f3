//! Melt command - collapse measurement columns into variable/value rows.

use std::path::PathBuf;

use tidyshape::{Tidy, TidyConfig};

use super::{write_output, CommandResult};
use crate::cli::OutputArgs;

pub fn run(
    mut config: TidyConfig,
    file: PathBuf,
    ids: Vec<String>,
    variable_name: Option<String>,
    value_name: Option<String>,
    drop_absent: bool,
    output: OutputArgs,
) -> CommandResult {
    if let Some(name) = variable_name {
        config.melt.variable_name = name;
    }
    if let Some(name) = value_name {
        config.melt.value_name = name;
    }
    config.melt.drop_absent |= drop_absent;

    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;
    let long = tidy.melt(&table, &ids)?;
    write_output(&long, &output, tidy.config())
}
