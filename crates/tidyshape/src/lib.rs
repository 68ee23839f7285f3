//! Tidyshape: in-memory tidy-table engine for measurement data.
//!
//! Tidyshape reshapes and summarizes typed column tables: wide-to-long and
//! long-to-wide pivots, key extraction from compound labels, left joins,
//! grouped reductions, correlation matrices and rank orders.
//!
//! # Core Principles
//!
//! - **Immutable tables**: Every transform returns a new table
//! - **Explicit missingness**: Absent cells are `None`, never a sentinel value
//! - **Deterministic order**: Rows, groups and columns follow first-seen order
//!
//! # Example
//!
//! ```
//! use tidyshape::{Column, KeySpec, DataType, Tidy, Table};
//!
//! let wide = Table::new(vec![
//!     Column::text("gene", vec![Some("YAL001C")]),
//!     Column::real("cdc15_10", vec![Some(0.5)]),
//!     Column::real("cdc15_30", vec![Some(1.5)]),
//! ])
//! .unwrap();
//!
//! let tidy = Tidy::new();
//! let long = tidy.melt(&wide, &["gene"]).unwrap();
//! let spec = KeySpec::new(
//!     r"(?P<expt>[a-z]+\d*)_(?P<time>\d+)",
//!     &[("expt", DataType::Categorical), ("time", DataType::Integer)],
//! )
//! .unwrap();
//! let keyed = tidy.extract(&long, "variable", &spec).unwrap();
//!
//! assert_eq!(keyed.column_names(), vec!["gene", "expt", "time", "value"]);
//! ```

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod input;
pub mod join;
pub mod reshape;
pub mod stats;
pub mod table;

mod engine;

pub use crate::engine::{Tidy, TidyConfig};
pub use aggregate::{aggregate, AggSpec, Reduction};
pub use error::{Result, TidyError};
pub use extract::{ExtractMode, KeySpec, Partition};
pub use input::{OutputFormat, ReaderConfig, TableReader};
pub use join::{left_join, JoinOptions, JoinSpec};
pub use reshape::{cast, melt, MeltOptions};
pub use stats::{correlation_matrix, CorrelationCell, CorrelationMatrix, CorrelationMethod, RankIndex, SortOrder};
pub use table::{Column, DataType, Table, Value};
