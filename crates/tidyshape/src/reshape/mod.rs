//! Pivot engine: wide-to-long and long-to-wide reshaping.

mod cast;
mod melt;

pub use cast::{cast, duplicate_pairs};
pub use melt::{melt, MeltOptions};
