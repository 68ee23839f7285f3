//! Cast command - spread key/value rows into one column per key.

use std::path::PathBuf;

use tidyshape::{Tidy, TidyConfig};

use super::{write_output, CommandResult};
use crate::cli::OutputArgs;

pub fn run(
    config: TidyConfig,
    file: PathBuf,
    ids: Vec<String>,
    key: String,
    value: String,
    output: OutputArgs,
) -> CommandResult {
    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;
    let wide = tidy.cast(&table, &ids, &key, &value)?;
    write_output(&wide, &output, tidy.config())
}
