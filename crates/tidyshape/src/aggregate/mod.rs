//! Grouped aggregation: partition rows by key columns and reduce each group.

mod grouped;
mod reduction;

pub use grouped::{aggregate, group_rows, AggOutput, AggSpec};
pub use reduction::Reduction;
