//! Reading and writing tables as typed delimited text or JSON.

mod reader;
mod writer;

pub use reader::{is_missing_token, ReaderConfig, TableReader};
pub use writer::{table_to_string, write_table, OutputFormat, MISSING_TOKEN};
