//! Long-to-wide reshaping.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::melt::first_duplicate;
use crate::error::{Result, TidyError};
use crate::table::{Column, KeyAtom, Table};

/// Spread a key/value column pair into one column per distinct key.
///
/// Produces one row per distinct combination of identifier values, in
/// first-seen order, and one column per distinct key, in first-seen order,
/// typed like the value column. Combinations that never occur are absent.
/// Columns not named in the call are dropped. Keys are compared by their
/// canonical form, so `0.0` and `-0.0` share one column.
///
/// Melting and casting back restores a table only when it has at least one
/// row: an empty long table carries no key values, so the cast of it holds
/// the identifier columns alone.
///
/// Each (identifier combination, key) pair may occur at most once; a repeat
/// fails with [`TidyError::AmbiguousPivot`]. Callers that need to combine
/// duplicates aggregate first.
pub fn cast<S: AsRef<str>>(
    table: &Table,
    id_columns: &[S],
    key_column: &str,
    value_column: &str,
) -> Result<Table> {
    let ids = table.columns_by_name(id_columns)?;
    let key = table.column(key_column)?;
    let value = table.column(value_column)?;

    let id_names: Vec<&str> = ids.iter().map(|c| c.name()).collect();
    if let Some(dup) = first_duplicate(&id_names) {
        return Err(TidyError::Schema(format!(
            "Identifier column '{}' listed more than once",
            dup
        )));
    }
    for name in [key_column, value_column] {
        if id_names.contains(&name) {
            return Err(TidyError::Schema(format!(
                "Column '{}' cannot be both an identifier and the key or value",
                name
            )));
        }
    }
    if key_column == value_column {
        return Err(TidyError::Schema(format!(
            "Key and value column are both '{}'",
            key_column
        )));
    }

    // Pass 1: distinct identifier combinations and keys, first-seen. Keys
    // compare canonically; the first-seen rendering names the column.
    let mut groups: IndexMap<Vec<KeyAtom>, usize> = IndexMap::new();
    let mut labels: IndexMap<KeyAtom, String> = IndexMap::new();
    let mut placement = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let Some(key_value) = key.get(row) else {
            return Err(TidyError::Schema(format!(
                "Key column '{}' is absent at row {}",
                key_column, row
            )));
        };
        let group_count = groups.len();
        let group = *groups
            .entry(Table::row_key(&ids, row))
            .or_insert(group_count);
        let entry = labels.entry(KeyAtom::of(Some(key_value)));
        let slot = entry.index();
        entry.or_insert_with(|| key_value.to_string());
        placement.push((group, slot));
    }

    if let Some(clash) = labels.values().find(|l| id_names.contains(&l.as_str())) {
        return Err(TidyError::Schema(format!(
            "Key value '{}' collides with an identifier column",
            clash
        )));
    }

    // Pass 2: one source row per grid cell.
    let width = labels.len();
    let mut grid: Vec<Option<usize>> = vec![None; groups.len() * width];
    let mut first_group_row: Vec<usize> = Vec::with_capacity(groups.len());
    for (row, &(group, slot)) in placement.iter().enumerate() {
        if group == first_group_row.len() {
            first_group_row.push(row);
        }
        let cell = &mut grid[group * width + slot];
        if let Some(previous) = *cell {
            return Err(TidyError::AmbiguousPivot {
                key: labels
                    .get_index(slot)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_default(),
                first_row: previous,
                second_row: row,
            });
        }
        *cell = Some(row);
    }

    let mut columns: Vec<Column> = ids.iter().map(|c| c.gather(&first_group_row)).collect();
    for (slot, label) in labels.values().enumerate() {
        let rows: Vec<Option<usize>> = (0..groups.len())
            .map(|group| grid[group * width + slot])
            .collect();
        columns.push(value.gather_optional(&rows).renamed(label.as_str()));
    }

    tracing::debug!(
        input_rows = table.row_count(),
        output_rows = groups.len(),
        new_columns = width,
        "cast table to wide form"
    );
    Table::with_row_count(columns, groups.len())
}

/// Row indices of every (identifier combination, key) pair that occurs more
/// than once, in first-seen order.
///
/// These are exactly the pairs that make [`cast`] fail.
pub fn duplicate_pairs<S: AsRef<str>>(
    table: &Table,
    id_columns: &[S],
    key_column: &str,
) -> Result<Vec<Vec<usize>>> {
    let ids = table.columns_by_name(id_columns)?;
    let key = table.column(key_column)?;

    let mut seen: HashMap<(Vec<KeyAtom>, KeyAtom), Vec<usize>> = HashMap::new();
    let mut order = Vec::new();
    for row in 0..table.row_count() {
        let pair = (Table::row_key(&ids, row), KeyAtom::of(key.get(row)));
        let rows = seen.entry(pair.clone()).or_default();
        if rows.is_empty() {
            order.push(pair);
        }
        rows.push(row);
    }
    Ok(order
        .into_iter()
        .filter_map(|pair| seen.remove(&pair).filter(|rows| rows.len() > 1))
        .collect())
}
