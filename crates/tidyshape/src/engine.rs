//! `Tidy` facade: configured entry point to every transform.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::{self, AggSpec};
use crate::error::{Result, TidyError};
use crate::extract::{self, ExtractMode, KeySpec, Partition};
use crate::input::{OutputFormat, ReaderConfig, TableReader};
use crate::join::{self, JoinOptions, JoinSpec};
use crate::reshape::{self, MeltOptions};
use crate::stats::{self, CorrelationMatrix, CorrelationMethod, RankIndex, SortOrder};
use crate::table::Table;

/// Configuration shared by every operation of a [`Tidy`] instance.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    /// How fixture files are read.
    pub reader: ReaderConfig,
    /// Defaults for wide-to-long reshaping.
    pub melt: MeltOptions,
    /// Defaults for left joins.
    pub join: JoinOptions,
    /// Behavior when a key pattern does not match.
    pub extract_mode: ExtractMode,
    /// Coefficient used by [`Tidy::correlation`].
    pub correlation_method: CorrelationMethod,
    /// Format for written tables.
    pub output_format: OutputFormat,
}

impl TidyConfig {
    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TidyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text)
            .map_err(|e| TidyError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Entry point bundling a configuration with the table transforms.
#[derive(Debug, Clone, Default)]
pub struct Tidy {
    config: TidyConfig,
    reader: TableReader,
}

impl Tidy {
    /// Create an instance with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance with custom configuration.
    pub fn with_config(config: TidyConfig) -> Self {
        let reader = TableReader::with_config(config.reader.clone());
        Self { config, reader }
    }

    /// The active configuration.
    pub fn config(&self) -> &TidyConfig {
        &self.config
    }

    /// Read a table from a delimited or JSON file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Table> {
        self.reader.read_path(path)
    }

    /// Wide to long with the configured [`MeltOptions`].
    pub fn melt<S: AsRef<str>>(&self, table: &Table, id_columns: &[S]) -> Result<Table> {
        reshape::melt(table, id_columns, &self.config.melt)
    }

    /// Long to wide.
    pub fn cast<S: AsRef<str>>(
        &self,
        table: &Table,
        id_columns: &[S],
        key_column: &str,
        value_column: &str,
    ) -> Result<Table> {
        reshape::cast(table, id_columns, key_column, value_column)
    }

    /// Split a label column into typed key columns.
    pub fn extract(&self, table: &Table, column: &str, spec: &KeySpec) -> Result<Table> {
        extract::extract(table, column, spec, self.config.extract_mode)
    }

    /// Split a label column with a different pattern per row partition.
    pub fn extract_partitioned(
        &self,
        table: &Table,
        column: &str,
        partitions: &[Partition],
    ) -> Result<Table> {
        extract::extract_partitioned(table, column, partitions, self.config.extract_mode)
    }

    /// Left join with the configured [`JoinOptions`].
    pub fn left_join(&self, left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table> {
        join::left_join(left, right, spec, &self.config.join)
    }

    /// Grouped aggregation.
    pub fn aggregate(&self, table: &Table, spec: &AggSpec) -> Result<Table> {
        aggregate::aggregate(table, spec)
    }

    /// Correlation matrix with the configured method.
    pub fn correlation<S: AsRef<str>>(&self, table: &Table, columns: &[S]) -> Result<CorrelationMatrix> {
        stats::correlation_matrix(table, columns, self.config.correlation_method)
    }

    /// Rank entities of `table` by `key_column`.
    pub fn rank(
        &self,
        table: &Table,
        id_column: &str,
        key_column: &str,
        order: SortOrder,
    ) -> Result<RankIndex> {
        RankIndex::build(table, id_column, key_column, order)
    }
}
