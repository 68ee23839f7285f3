//! Table data model: typed values, columns and the immutable table.

mod column;
mod frame;
mod types;

pub use column::Column;
pub use frame::Table;
pub use types::{DataType, Value};

pub(crate) use types::KeyAtom;
