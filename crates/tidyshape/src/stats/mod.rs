//! Derived views over aggregated tables: correlation matrices and rank orders.

mod correlation;
mod rank;

pub use correlation::{correlation_matrix, CorrelationCell, CorrelationMatrix, CorrelationMethod};
pub use rank::{RankIndex, SortOrder};
