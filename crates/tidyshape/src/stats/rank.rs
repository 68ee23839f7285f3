//! Stable rank orders over entities, reusable across tables.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{DataType, KeyAtom, Table, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A total order over entity identifiers, built from one key per entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RankIndex {
    id_type: DataType,
    ids: Vec<Option<Value>>,
    positions: HashMap<KeyAtom, usize>,
}

impl RankIndex {
    /// Order the entities of `table` by `key_column`.
    ///
    /// `table` holds one row per entity. The sort is stable: ties keep their
    /// input order. Absent and NaN keys sort last in either direction. A
    /// repeated identifier is a schema error.
    pub fn build(table: &Table, id_column: &str, key_column: &str, order: SortOrder) -> Result<Self> {
        let ids = table.column(id_column)?;
        let keys = table.column(key_column)?;

        let key = |row: usize| keys.get(row).filter(|v| !is_nan(v));
        let mut rows: Vec<usize> = (0..table.row_count()).collect();
        rows.sort_by(|&a, &b| match (key(a), key(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match order {
                SortOrder::Ascending => x.total_cmp(y),
                SortOrder::Descending => y.total_cmp(x),
            },
        });

        let mut positions = HashMap::with_capacity(rows.len());
        let mut ordered = Vec::with_capacity(rows.len());
        for (position, &row) in rows.iter().enumerate() {
            let id = ids.get(row);
            if positions.insert(KeyAtom::of(id), position).is_some() {
                return Err(TidyError::Schema(format!(
                    "Identifier '{}' appears more than once in column '{}'",
                    id.map_or_else(|| "NA".to_string(), Value::to_string),
                    id_column
                )));
            }
            ordered.push(id.cloned());
        }

        tracing::debug!(entities = ordered.len(), ?order, "built rank index");
        Ok(Self {
            id_type: ids.data_type(),
            ids: ordered,
            positions,
        })
    }

    /// Identifiers from first to last rank.
    pub fn ids(&self) -> &[Option<Value>] {
        &self.ids
    }

    /// Number of ranked entities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no entity is ranked.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rank position (0 = first) of an identifier.
    pub fn position(&self, id: Option<&Value>) -> Option<usize> {
        self.positions.get(&KeyAtom::of(id)).copied()
    }

    /// Row order that sorts `table` by rank of its `id_column`.
    ///
    /// Rows of the same entity keep their relative order; rows whose
    /// identifier is not ranked come last, in input order.
    pub fn permutation(&self, table: &Table, id_column: &str) -> Result<Vec<usize>> {
        let ids = table.column(id_column)?;
        if !ids.data_type().comparable_with(self.id_type) {
            return Err(TidyError::Schema(format!(
                "Column '{}' is {}, but the index ranks {} identifiers",
                id_column,
                ids.data_type(),
                self.id_type
            )));
        }
        let mut rows: Vec<usize> = (0..table.row_count()).collect();
        rows.sort_by_key(|&row| self.position(ids.get(row)).unwrap_or(self.len()));
        Ok(rows)
    }

    /// Reorder any table sharing the identifier column.
    pub fn apply(&self, table: &Table, id_column: &str) -> Result<Table> {
        let rows = self.permutation(table, id_column)?;
        table.take(&rows)
    }
}

fn is_nan(value: &Value) -> bool {
    value.as_f64().is_some_and(f64::is_nan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn peaks() -> Table {
        Table::new(vec![
            Column::text("gene", vec![Some("a"), Some("b"), Some("c"), Some("d")]),
            Column::real("peak", vec![Some(2.0), None, Some(5.0), Some(2.0)]),
        ])
        .unwrap()
    }

    fn label(index: &RankIndex) -> Vec<String> {
        index
            .ids()
            .iter()
            .map(|id| id.as_ref().map_or("NA".to_string(), Value::to_string))
            .collect()
    }

    #[test]
    fn test_descending_with_stable_ties_and_absent_last() {
        let index = RankIndex::build(&peaks(), "gene", "peak", SortOrder::Descending).unwrap();
        assert_eq!(label(&index), vec!["c", "a", "d", "b"]);
        assert_eq!(index.position(Some(&Value::Text("a".into()))), Some(1));
    }

    #[test]
    fn test_ascending() {
        let index = RankIndex::build(&peaks(), "gene", "peak", SortOrder::Ascending).unwrap();
        assert_eq!(label(&index), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_apply_groups_rows_by_rank() {
        let index = RankIndex::build(&peaks(), "gene", "peak", SortOrder::Descending).unwrap();
        let long = Table::new(vec![
            Column::categorical("gene", vec![Some("a"), Some("c"), Some("z"), Some("a"), Some("c")]),
            Column::integer("time", vec![Some(0), Some(0), Some(0), Some(10), Some(10)]),
        ])
        .unwrap();

        let sorted = index.apply(&long, "gene").unwrap();
        let order: Vec<(String, String)> = (0..sorted.row_count())
            .map(|r| {
                (
                    sorted.get(r, "gene").unwrap().to_string(),
                    sorted.get(r, "time").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("c".into(), "0".into()),
                ("c".into(), "10".into()),
                ("a".into(), "0".into()),
                ("a".into(), "10".into()),
                ("z".into(), "0".into()),
            ]
        );

        let again = index.apply(&sorted, "gene").unwrap();
        assert_eq!(index.permutation(&sorted, "gene").unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(again, sorted);
    }

    #[test]
    fn test_nan_key_ranks_with_absent() {
        let table = Table::new(vec![
            Column::text("gene", vec![Some("a"), Some("b"), Some("c"), Some("d")]),
            Column::real("peak", vec![Some(1.0), Some(f64::NAN), None, Some(3.0)]),
        ])
        .unwrap();
        let desc = RankIndex::build(&table, "gene", "peak", SortOrder::Descending).unwrap();
        assert_eq!(label(&desc), vec!["d", "a", "b", "c"]);
        let asc = RankIndex::build(&table, "gene", "peak", SortOrder::Ascending).unwrap();
        assert_eq!(label(&asc), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let table = Table::new(vec![
            Column::text("gene", vec![Some("a"), Some("a")]),
            Column::real("peak", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap();
        assert!(RankIndex::build(&table, "gene", "peak", SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_apply_rejects_incomparable_ids() {
        let index = RankIndex::build(&peaks(), "gene", "peak", SortOrder::Ascending).unwrap();
        let other = Table::new(vec![Column::integer("gene", vec![Some(1)])]).unwrap();
        assert!(index.apply(&other, "gene").is_err());
    }
}
