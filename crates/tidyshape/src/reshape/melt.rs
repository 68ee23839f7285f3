//! Wide-to-long reshaping.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, DataType, Table};

/// Options for [`melt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltOptions {
    /// Name of the column holding the source column names.
    pub variable_name: String,
    /// Name of the column holding the collapsed values.
    pub value_name: String,
    /// Skip output rows whose value is absent.
    pub drop_absent: bool,
    /// Render mixed, non-numeric value types as text instead of failing.
    pub coerce_to_text: bool,
}

impl Default for MeltOptions {
    fn default() -> Self {
        Self {
            variable_name: "variable".to_string(),
            value_name: "value".to_string(),
            drop_absent: false,
            coerce_to_text: true,
        }
    }
}

/// Collapse every non-identifier column into a variable/value pair.
///
/// Rows are emitted row-major: each input row yields one output row per
/// collapsed column, in table order. Identifier columns keep their order and
/// the variable (categorical) and value columns are appended.
///
/// The value column keeps the shared type of the collapsed columns. Integer
/// and real columns together promote to real. Any other mix becomes text when
/// [`MeltOptions::coerce_to_text`] is set, and is a schema error otherwise.
pub fn melt<S: AsRef<str>>(table: &Table, id_columns: &[S], options: &MeltOptions) -> Result<Table> {
    let ids = table.columns_by_name(id_columns)?;
    let id_names: Vec<&str> = ids.iter().map(|c| c.name()).collect();
    if let Some(dup) = first_duplicate(&id_names) {
        return Err(TidyError::Schema(format!(
            "Identifier column '{}' listed more than once",
            dup
        )));
    }
    for name in [&options.variable_name, &options.value_name] {
        if id_names.contains(&name.as_str()) {
            return Err(TidyError::Schema(format!(
                "Output column '{}' collides with an identifier column",
                name
            )));
        }
    }
    if options.variable_name == options.value_name {
        return Err(TidyError::Schema(format!(
            "Variable and value columns are both named '{}'",
            options.value_name
        )));
    }

    let measures: Vec<&Column> = table
        .columns()
        .filter(|c| !id_names.contains(&c.name()))
        .collect();
    if measures.is_empty() {
        return Err(TidyError::Schema(
            "No columns left to collapse after removing identifiers".to_string(),
        ));
    }
    let value_type = value_type(&measures, options.coerce_to_text)?;

    let mut source_rows = Vec::with_capacity(table.row_count() * measures.len());
    let mut variables = Vec::with_capacity(source_rows.capacity());
    let mut values = Vec::with_capacity(source_rows.capacity());
    for row in 0..table.row_count() {
        for measure in &measures {
            let cell = measure.values()[row].clone();
            if options.drop_absent && cell.is_none() {
                continue;
            }
            source_rows.push(row);
            variables.push(Some(measure.name()));
            values.push(cell.and_then(|v| v.coerce(value_type)));
        }
    }

    let rows = source_rows.len();
    let mut columns: Vec<Column> = ids.iter().map(|c| c.gather(&source_rows)).collect();
    columns.push(Column::categorical(options.variable_name.as_str(), variables));
    columns.push(Column::new(options.value_name.as_str(), value_type, values)?);

    tracing::debug!(
        input_rows = table.row_count(),
        collapsed = measures.len(),
        output_rows = rows,
        value_type = %value_type,
        "melted table to long form"
    );
    Table::with_row_count(columns, rows)
}

fn value_type(columns: &[&Column], coerce_to_text: bool) -> Result<DataType> {
    let first = columns[0].data_type();
    if columns.iter().all(|c| c.data_type() == first) {
        return Ok(first);
    }
    if columns.iter().all(|c| c.data_type().is_numeric()) {
        return Ok(DataType::Real);
    }
    if coerce_to_text {
        return Ok(DataType::Text);
    }
    let described: Vec<String> = columns
        .iter()
        .map(|c| format!("{}: {}", c.name(), c.data_type()))
        .collect();
    Err(TidyError::Schema(format!(
        "Collapsed columns have incompatible types ({})",
        described.join(", ")
    )))
}

pub(crate) fn first_duplicate<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .enumerate()
        .find(|&(i, name)| names[..i].contains(name))
        .map(|(_, name)| *name)
}
