//! Typed column storage.

use serde::{Deserialize, Serialize};

use super::types::{DataType, Value};
use crate::error::{Result, TidyError};

/// A named column of uniformly typed, optionally absent values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColumn", into = "RawColumn")]
pub struct Column {
    name: String,
    data_type: DataType,
    values: Vec<Option<Value>>,
}

impl Column {
    /// Create a column, checking that every present value has the declared type.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        values: Vec<Option<Value>>,
    ) -> Result<Self> {
        let name = name.into();
        if let Some((row, value)) = values
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.as_ref().filter(|v| v.data_type() != data_type).map(|v| (i, v)))
        {
            return Err(TidyError::Schema(format!(
                "Column '{}' is declared {} but row {} holds a {} value",
                name,
                data_type,
                row,
                value.data_type()
            )));
        }
        Ok(Self {
            name,
            data_type,
            values,
        })
    }

    /// A column of `len` absent values.
    pub fn absent(name: impl Into<String>, data_type: DataType, len: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            values: vec![None; len],
        }
    }

    /// Integer column from optional values.
    pub fn integer<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self::from_typed(name, DataType::Integer, values, Value::Integer)
    }

    /// Real column from optional values.
    pub fn real<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::from_typed(name, DataType::Real, values, Value::Real)
    }

    /// Text column from optional values.
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::from_typed(name, DataType::Text, values, |s| Value::Text(s.into()))
    }

    /// Categorical column from optional labels.
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::from_typed(name, DataType::Categorical, values, |s| {
            Value::Categorical(s.into())
        })
    }

    /// Boolean column from optional values.
    pub fn boolean<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        Self::from_typed(name, DataType::Boolean, values, Value::Boolean)
    }

    fn from_typed<I, T, F>(name: impl Into<String>, data_type: DataType, values: I, wrap: F) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
        F: Fn(T) -> Value,
    {
        Self {
            name: name.into(),
            data_type,
            values: values.into_iter().map(|v| v.map(&wrap)).collect(),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared element type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// All cells in row order.
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at `row`; `None` when absent or out of range.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(Option::as_ref)
    }

    /// Number of absent cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Numeric view of the cells; `None` for absent or non-numeric values.
    pub fn f64_values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().map(|v| v.as_ref().and_then(Value::as_f64))
    }

    /// Same cells under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: self.data_type,
            values: self.values.clone(),
        }
    }

    /// Gather the cells at `rows`, in that order.
    ///
    /// Callers guarantee the indices are in range.
    pub(crate) fn gather(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            data_type: self.data_type,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }

    /// Gather with optional indices; `None` produces an absent cell.
    pub(crate) fn gather_optional(&self, rows: &[Option<usize>]) -> Self {
        Self {
            name: self.name.clone(),
            data_type: self.data_type,
            values: rows
                .iter()
                .map(|r| r.and_then(|r| self.values[r].clone()))
                .collect(),
        }
    }
}

/// Serialized form of a column: `{"name", "type", "values"}` with `null` for
/// absent cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    values: Vec<serde_json::Value>,
}

impl TryFrom<RawColumn> for Column {
    type Error = TidyError;

    fn try_from(raw: RawColumn) -> Result<Self> {
        let values = raw
            .values
            .iter()
            .enumerate()
            .map(|(row, json)| {
                json_to_cell(json, raw.data_type).ok_or_else(|| {
                    TidyError::Schema(format!(
                        "Column '{}' row {}: {} is not a {} value",
                        raw.name, row, json, raw.data_type
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Column::new(raw.name, raw.data_type, values)
    }
}

impl From<Column> for RawColumn {
    fn from(column: Column) -> Self {
        Self {
            name: column.name,
            data_type: column.data_type,
            values: column.values.into_iter().map(cell_to_json).collect(),
        }
    }
}

/// Outer `None` means the JSON value does not fit the type.
fn json_to_cell(json: &serde_json::Value, data_type: DataType) -> Option<Option<Value>> {
    use serde_json::Value as Json;

    if json.is_null() {
        return Some(None);
    }
    let value = match (data_type, json) {
        (DataType::Integer, Json::Number(n)) => Value::Integer(n.as_i64()?),
        (DataType::Real, Json::Number(n)) => Value::Real(n.as_f64()?),
        (DataType::Text, Json::String(s)) => Value::Text(s.clone()),
        (DataType::Categorical, Json::String(s)) => Value::Categorical(s.clone()),
        (DataType::Boolean, Json::Bool(b)) => Value::Boolean(*b),
        _ => return None,
    };
    Some(Some(value))
}

// Non-finite reals have no JSON number form and serialize as null.
fn cell_to_json(cell: Option<Value>) -> serde_json::Value {
    use serde_json::Value as Json;

    match cell {
        None => Json::Null,
        Some(Value::Integer(v)) => Json::from(v),
        Some(Value::Real(v)) => serde_json::Number::from_f64(v).map_or(Json::Null, Json::Number),
        Some(Value::Text(s)) | Some(Value::Categorical(s)) => Json::String(s),
        Some(Value::Boolean(b)) => Json::Bool(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mixed_types() {
        let err = Column::new(
            "a",
            DataType::Integer,
            vec![Some(Value::Integer(1)), Some(Value::Real(2.0))],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_typed_constructors() {
        let col = Column::text("label", vec![Some("a"), None, Some("c")]);
        assert_eq!(col.data_type(), DataType::Text);
        assert_eq!(col.len(), 3);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.get(2), Some(&Value::Text("c".to_string())));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(9), None);
    }

    #[test]
    fn test_gather() {
        let col = Column::integer("x", vec![Some(1), Some(2), None]);
        let picked = col.gather(&[2, 0, 0]);
        assert_eq!(picked.values(), &[None, Some(Value::Integer(1)), Some(Value::Integer(1))]);

        let optional = col.gather_optional(&[Some(1), None]);
        assert_eq!(optional.values(), &[Some(Value::Integer(2)), None]);
    }

    #[test]
    fn test_json_shape() {
        let col = Column::real("score", vec![Some(1.5), None]);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "score", "type": "real", "values": [1.5, null]})
        );
    }

    #[test]
    fn test_json_integer_literal_in_real_column() {
        let col: Column =
            serde_json::from_str(r#"{"name":"r","type":"real","values":[1,2.5,null]}"#).unwrap();
        assert_eq!(col.get(0), Some(&Value::Real(1.0)));
    }

    #[test]
    fn test_json_rejects_wrong_type() {
        let result: std::result::Result<Column, _> =
            serde_json::from_str(r#"{"name":"i","type":"integer","values":["x"]}"#);
        assert!(result.is_err());
    }
}
