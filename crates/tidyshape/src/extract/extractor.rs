//! Splitting compound label columns into typed key columns.

use indexmap::IndexMap;

use super::spec::{ExtractMode, KeySpec};
use crate::error::{Result, TidyError};
use crate::table::{Column, DataType, Table};

/// One subset of rows in a partitioned extraction: the rows whose label
/// contains `marker`, parsed with `spec`.
#[derive(Debug, Clone)]
pub struct Partition {
    marker: String,
    spec: KeySpec,
}

impl Partition {
    /// Select rows whose label contains `marker`.
    pub fn new(marker: impl Into<String>, spec: KeySpec) -> Self {
        Self {
            marker: marker.into(),
            spec,
        }
    }

    /// The discriminating substring.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The key specification applied to the selected rows.
    pub fn spec(&self) -> &KeySpec {
        &self.spec
    }
}

/// Replace a label column by one typed column per capture group.
///
/// The new columns take the source column's position. An absent label
/// yields absent values. A label that does not match (or whose captures do
/// not parse) fails in [`ExtractMode::Strict`] and yields absent values in
/// [`ExtractMode::Lenient`].
pub fn extract(table: &Table, column: &str, spec: &KeySpec, mode: ExtractMode) -> Result<Table> {
    let source = label_column(table, column)?;
    for (name, _) in spec.groups() {
        if name != column && table.has_column(name) {
            return Err(TidyError::Schema(format!(
                "Extracted column '{}' already exists",
                name
            )));
        }
    }

    let width = spec.groups().len();
    let mut cells: Vec<Vec<_>> = (0..width)
        .map(|_| Vec::with_capacity(table.row_count()))
        .collect();
    let mut misses = 0usize;
    for (row, value) in source.values().iter().enumerate() {
        let Some(label) = value.as_ref().and_then(|v| v.as_str()) else {
            cells.iter_mut().for_each(|c| c.push(None));
            continue;
        };
        match spec.apply(label) {
            Some(extracted) => {
                for (target, cell) in cells.iter_mut().zip(extracted) {
                    target.push(cell);
                }
            }
            None if mode == ExtractMode::Strict => {
                return Err(TidyError::Extraction {
                    column: column.to_string(),
                    row,
                    value: label.to_string(),
                });
            }
            None => {
                misses += 1;
                cells.iter_mut().for_each(|c| c.push(None));
            }
        }
    }
    if misses > 0 {
        tracing::warn!(
            column,
            pattern = spec.pattern(),
            misses,
            "labels did not match key pattern; emitted absent keys"
        );
    }

    let mut extracted = Vec::with_capacity(width);
    for ((name, data_type), values) in spec.groups().iter().zip(cells) {
        extracted.push(Column::new(name.as_str(), *data_type, values)?);
    }

    let mut columns = Vec::with_capacity(table.column_count() + width);
    for existing in table.columns() {
        if existing.name() == column {
            columns.append(&mut extracted);
        } else {
            columns.push(existing.clone());
        }
    }
    tracing::debug!(column, rows = table.row_count(), new_columns = width, "extracted keys");
    Table::with_row_count(columns, table.row_count())
}

/// Extract keys from a column whose labels follow several formats.
///
/// Each row must contain exactly one partition's marker; otherwise the
/// operation fails with [`TidyError::Coverage`] listing uncovered and
/// multiply-covered rows (absent labels count as uncovered). Every partition
/// is extracted in isolation and the results are recombined in the original
/// row order. Output key columns are the union of all declared groups in
/// first-declared order; a partition that does not declare a group leaves
/// it absent.
pub fn extract_partitioned(
    table: &Table,
    column: &str,
    partitions: &[Partition],
    mode: ExtractMode,
) -> Result<Table> {
    let source = label_column(table, column)?;

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); partitions.len()];
    let mut uncovered = Vec::new();
    let mut overlapping = Vec::new();
    for (row, value) in source.values().iter().enumerate() {
        let label = value.as_ref().and_then(|v| v.as_str());
        let hits: Vec<usize> = partitions
            .iter()
            .enumerate()
            .filter(|(_, p)| label.is_some_and(|l| l.contains(p.marker())))
            .map(|(i, _)| i)
            .collect();
        match hits.as_slice() {
            [] => uncovered.push(row),
            [only] => members[*only].push(row),
            _ => overlapping.push(row),
        }
    }
    if !uncovered.is_empty() || !overlapping.is_empty() {
        return Err(TidyError::Coverage {
            uncovered,
            overlapping,
        });
    }

    let mut key_schema: IndexMap<&str, DataType> = IndexMap::new();
    for partition in partitions {
        for (name, data_type) in partition.spec().groups() {
            match key_schema.get(name.as_str()) {
                Some(existing) if existing != data_type => {
                    return Err(TidyError::Schema(format!(
                        "Group '{}' is declared as {} and as {}",
                        name, existing, data_type
                    )));
                }
                Some(_) => {}
                None => {
                    key_schema.insert(name.as_str(), *data_type);
                }
            }
        }
    }

    let mut parts = Vec::with_capacity(partitions.len());
    let mut concatenated_rows = Vec::with_capacity(table.row_count());
    for (partition, rows) in partitions.iter().zip(&members) {
        let subset = table.take(rows)?;
        let part = extract(&subset, column, partition.spec(), mode).map_err(|e| match e {
            TidyError::Extraction { column, row, value } => TidyError::Extraction {
                column,
                row: rows[row],
                value,
            },
            other => other,
        })?;
        parts.push(part);
        concatenated_rows.extend_from_slice(rows);
    }

    // Undo the partition grouping: position of each original row in the
    // concatenated parts.
    let mut order = vec![0usize; table.row_count()];
    for (position, &row) in concatenated_rows.iter().enumerate() {
        order[row] = position;
    }

    let combined = if parts.is_empty() {
        // Only reachable for an empty table with no partitions.
        table.without_column(column)?
    } else {
        Table::bind_rows(&parts)?.take(&order)?
    };

    let mut layout: Vec<&str> = Vec::with_capacity(table.column_count() + key_schema.len());
    for name in table.column_names() {
        if name == column {
            layout.extend(key_schema.keys().copied());
        } else {
            layout.push(name);
        }
    }
    let layout: Vec<&str> = layout
        .into_iter()
        .filter(|name| combined.has_column(name))
        .collect();

    tracing::debug!(
        column,
        partitions = partitions.len(),
        rows = table.row_count(),
        "extracted keys from partitioned labels"
    );
    combined.select(&layout)
}

fn label_column<'a>(table: &'a Table, column: &str) -> Result<&'a Column> {
    let source = table.column(column)?;
    if !source.data_type().is_string_like() {
        return Err(TidyError::Schema(format!(
            "Column '{}' is {}, extraction needs text or categorical labels",
            column,
            source.data_type()
        )));
    }
    Ok(source)
}
