//! Key extraction from compound string labels.

mod extractor;
mod spec;

pub use extractor::{extract, extract_partitioned, Partition};
pub use spec::{ExtractMode, KeySpec};
