//! Join command - left-join a second table onto the first.

use std::path::PathBuf;

use tidyshape::{JoinSpec, Tidy, TidyConfig};

use super::{parse_join_key, write_output, CommandResult};
use crate::cli::OutputArgs;

pub fn run(
    mut config: TidyConfig,
    left: PathBuf,
    right: PathBuf,
    keys: Vec<String>,
    no_match_absent: bool,
    output: OutputArgs,
) -> CommandResult {
    let mut pairs = keys.iter().map(|k| parse_join_key(k));
    let (l, r) = pairs.next().ok_or("At least one --on key is required")?;
    let spec = pairs.fold(JoinSpec::new(l, r), |spec, (l, r)| spec.and(l, r));
    if no_match_absent {
        config.join.match_absent = false;
    }

    let tidy = Tidy::with_config(config);
    let left = tidy.load(&left)?;
    let right = tidy.load(&right)?;
    let joined = tidy.left_join(&left, &right, &spec)?;
    write_output(&joined, &output, tidy.config())
}
