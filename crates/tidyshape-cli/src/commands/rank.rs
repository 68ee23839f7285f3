//! Rank command - order entities by a key.

use std::path::PathBuf;

use tidyshape::{Column, SortOrder, Tidy, TidyConfig, TidyError};

use super::{write_output, CommandResult};
use crate::cli::OutputArgs;

const RANK_COLUMN: &str = "rank";

pub fn run(
    config: TidyConfig,
    file: PathBuf,
    id: String,
    key: String,
    descending: bool,
    apply: Option<PathBuf>,
    output: OutputArgs,
) -> CommandResult {
    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };

    if apply.is_none() && (id == RANK_COLUMN || key == RANK_COLUMN) {
        return Err(TidyError::Schema(format!(
            "Column '{}' would be overwritten by the rank column; rename it or use --apply",
            RANK_COLUMN
        ))
        .into());
    }

    let tidy = Tidy::with_config(config);
    let entities = tidy.load(&file)?;
    let index = tidy.rank(&entities, &id, &key, order)?;

    let result = match apply {
        Some(path) => {
            let target = tidy.load(&path)?;
            index.apply(&target, &id)?
        }
        None => {
            // One row per entity in rank order, with its 1-based rank.
            let ordered = index.apply(&entities, &id)?;
            let ranks = Column::integer(RANK_COLUMN, (1..=index.len() as i64).map(Some));
            ordered.select(&[id.as_str(), key.as_str()])?.with_column(ranks)?
        }
    };
    write_output(&result, &output, tidy.config())
}
