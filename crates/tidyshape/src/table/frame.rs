//! The immutable in-memory table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::Column;
use super::types::{DataType, KeyAtom, Value};
use crate::error::{Result, TidyError};

/// An ordered mapping from column name to [`Column`], all of equal length.
///
/// Tables are values: every operation returns a new table and leaves its
/// inputs untouched. Equality compares the named columns and the row count;
/// column order is not part of equality (use [`Table::column_names`] when the
/// order matters).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct Table {
    columns: IndexMap<String, Column>,
    rows: usize,
}

impl Table {
    /// Build a table from columns, checking unique names and equal lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        Self::with_row_count(columns, rows)
    }

    /// Build a table with an explicit row count, which also covers tables
    /// that have rows but no columns.
    pub fn with_row_count(columns: Vec<Column>, rows: usize) -> Result<Self> {
        let mut map = IndexMap::with_capacity(columns.len());
        for column in columns {
            if column.len() != rows {
                return Err(TidyError::Schema(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    rows
                )));
            }
            let name = column.name().to_string();
            if map.insert(name.clone(), column).is_some() {
                return Err(TidyError::Schema(format!("Duplicate column name '{}'", name)));
            }
        }
        Ok(Self { columns: map, rows })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows (observations).
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Columns in table order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get a column by name, failing with a schema error when absent.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| TidyError::missing_column(name))
    }

    /// Zero-based position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Cell value; `None` when absent or out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Resolve several column names at once.
    pub fn columns_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Column>> {
        names.iter().map(|n| self.column(n.as_ref())).collect()
    }

    /// Keep only the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let columns = self.columns_by_name(names)?.into_iter().cloned().collect();
        Table::with_row_count(columns, self.rows)
    }

    /// Rows at the given indices, in that order. Indices may repeat.
    pub fn take(&self, rows: &[usize]) -> Result<Table> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.rows) {
            return Err(TidyError::Schema(format!(
                "Row index {} out of range for table with {} rows",
                bad, self.rows
            )));
        }
        let columns = self.columns().map(|c| c.gather(rows)).collect();
        Table::with_row_count(columns, rows.len())
    }

    /// A new table with `column` appended, or replacing the column of the
    /// same name in place.
    pub fn with_column(&self, column: Column) -> Result<Table> {
        if column.len() != self.rows && !(self.columns.is_empty() && self.rows == 0) {
            return Err(TidyError::Schema(format!(
                "Column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                self.rows
            )));
        }
        let mut columns = self.columns.clone();
        let rows = column.len();
        columns.insert(column.name().to_string(), column);
        Ok(Self { columns, rows })
    }

    /// A new table without the named column.
    pub fn without_column(&self, name: &str) -> Result<Table> {
        let mut columns = self.columns.clone();
        columns
            .shift_remove(name)
            .ok_or_else(|| TidyError::missing_column(name))?;
        Ok(Self {
            columns,
            rows: self.rows,
        })
    }

    /// Stack tables row-wise.
    ///
    /// The result has the union of all columns in first-seen order. A table
    /// lacking a column contributes absent cells to it. The same name with
    /// different types is a schema error.
    pub fn bind_rows(tables: &[Table]) -> Result<Table> {
        let mut schema: IndexMap<&str, DataType> = IndexMap::new();
        for table in tables {
            for column in table.columns() {
                match schema.get(column.name()) {
                    Some(&existing) if existing != column.data_type() => {
                        return Err(TidyError::Schema(format!(
                            "Column '{}' is {} in one table and {} in another",
                            column.name(),
                            existing,
                            column.data_type()
                        )));
                    }
                    Some(_) => {}
                    None => {
                        schema.insert(column.name(), column.data_type());
                    }
                }
            }
        }

        let rows = tables.iter().map(Table::row_count).sum();
        let columns = schema
            .iter()
            .map(|(&name, &data_type)| {
                let mut values = Vec::with_capacity(rows);
                for table in tables {
                    match table.get_column(name) {
                        Some(column) => values.extend_from_slice(column.values()),
                        None => values.extend(std::iter::repeat_n(None, table.row_count())),
                    }
                }
                Column::new(name, data_type, values)
            })
            .collect::<Result<Vec<_>>>()?;
        Table::with_row_count(columns, rows)
    }

    /// Equality keys of one row across the given columns.
    pub(crate) fn row_key(columns: &[&Column], row: usize) -> Vec<KeyAtom> {
        columns.iter().map(|c| KeyAtom::of(c.get(row))).collect()
    }
}

/// Serialized form of a table: `{"columns": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTable {
    columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
}

impl TryFrom<RawTable> for Table {
    type Error = TidyError;

    fn try_from(raw: RawTable) -> Result<Self> {
        match raw.rows {
            Some(rows) => Table::with_row_count(raw.columns, rows),
            None => Table::new(raw.columns),
        }
    }
}

impl From<Table> for RawTable {
    fn from(table: Table) -> Self {
        // Row count is only needed when there are no columns to carry it.
        let rows = table.columns.is_empty().then_some(table.rows).filter(|&r| r > 0);
        Self {
            columns: table.columns.into_values().collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::integer("id", vec![Some(1), Some(2), Some(3)]),
            Column::text("name", vec![Some("a"), None, Some("c")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged() {
        let err = Table::new(vec![
            Column::integer("a", vec![Some(1)]),
            Column::integer("b", vec![Some(1), Some(2)]),
        ])
        .unwrap_err();
        assert!(matches!(err, TidyError::Schema(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::integer("a", vec![Some(1)]),
            Column::integer("a", vec![Some(2)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.get(0, "name"), Some(&Value::Text("a".into())));
        assert_eq!(table.get(1, "name"), None);
        assert!(table.column("missing").is_err());
    }

    #[test]
    fn test_take_and_select() {
        let table = sample();
        let picked = table.take(&[2, 0]).unwrap();
        assert_eq!(picked.row_count(), 2);
        assert_eq!(picked.get(0, "id"), Some(&Value::Integer(3)));
        assert!(table.take(&[3]).is_err());

        let selected = table.select(&["name"]).unwrap();
        assert_eq!(selected.column_names(), vec!["name"]);
    }

    #[test]
    fn test_with_and_without_column_leave_source_untouched() {
        let table = sample();
        let added = table
            .with_column(Column::boolean("flag", vec![Some(true), Some(false), None]))
            .unwrap();
        assert_eq!(added.column_count(), 3);
        assert_eq!(table.column_count(), 2);

        let removed = added.without_column("id").unwrap();
        assert_eq!(removed.column_names(), vec!["name", "flag"]);
        assert!(added.without_column("nope").is_err());
    }

    #[test]
    fn test_bind_rows_union() {
        let a = Table::new(vec![Column::integer("x", vec![Some(1)])]).unwrap();
        let b = Table::new(vec![
            Column::integer("x", vec![Some(2)]),
            Column::text("y", vec![Some("b")]),
        ])
        .unwrap();
        let bound = Table::bind_rows(&[a, b]).unwrap();
        assert_eq!(bound.row_count(), 2);
        assert_eq!(bound.column_names(), vec!["x", "y"]);
        assert_eq!(bound.get(0, "y"), None);
        assert_eq!(bound.get(1, "y"), Some(&Value::Text("b".into())));
    }

    #[test]
    fn test_bind_rows_type_conflict() {
        let a = Table::new(vec![Column::integer("x", vec![Some(1)])]).unwrap();
        let b = Table::new(vec![Column::text("x", vec![Some("1")])]).unwrap();
        assert!(Table::bind_rows(&[a, b]).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let table = sample();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.column_names(), table.column_names());
    }
}
