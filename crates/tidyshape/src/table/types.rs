//! Core value and type definitions for table cells.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TidyError;

/// Declared element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Whole numbers (i64).
    Integer,
    /// Floating-point numbers (f64).
    Real,
    /// Free text.
    Text,
    /// Labelled levels of a discrete variable.
    Categorical,
    /// Boolean values.
    Boolean,
}

impl DataType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }

    /// Returns true if values of this type are string labels.
    pub fn is_string_like(&self) -> bool {
        matches!(self, DataType::Text | DataType::Categorical)
    }

    /// Whether values of the two types can be compared for equality
    /// (join keys, partition labels).
    pub fn comparable_with(&self, other: DataType) -> bool {
        *self == other
            || (self.is_numeric() && other.is_numeric())
            || (self.is_string_like() && other.is_string_like())
    }

    /// Lower-case name used in fixture headers.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Real => "real",
            DataType::Text => "text",
            DataType::Categorical => "categorical",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "i64" => Ok(DataType::Integer),
            "real" | "float" | "double" | "numeric" | "f64" => Ok(DataType::Real),
            "text" | "string" | "str" => Ok(DataType::Text),
            "categorical" | "category" | "factor" => Ok(DataType::Categorical),
            "boolean" | "bool" | "logical" => Ok(DataType::Boolean),
            other => Err(TidyError::Schema(format!("Unknown column type '{}'", other))),
        }
    }
}

/// A single present cell value.
///
/// Missing observations are represented as `None` in an `Option<Value>`, so
/// the absent marker can never collide with a valid value of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Categorical(String),
    Boolean(bool),
}

impl Value {
    /// The type this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::Text(_) => DataType::Text,
            Value::Categorical(_) => DataType::Categorical,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Numeric view of integer and real values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Label view of text and categorical values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw token as the given type.
    ///
    /// The error is a short human-readable reason; callers wrap it with
    /// position information.
    pub fn parse(raw: &str, data_type: DataType) -> std::result::Result<Value, String> {
        let trimmed = raw.trim();
        match data_type {
            DataType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("'{}' is not an integer", raw)),
            DataType::Real => trimmed
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| format!("'{}' is not a real number", raw)),
            DataType::Text => Ok(Value::Text(raw.to_string())),
            DataType::Categorical => Ok(Value::Categorical(raw.to_string())),
            DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(Value::Boolean(true)),
                "false" | "f" | "no" | "n" | "0" => Ok(Value::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean", raw)),
            },
        }
    }

    /// Convert to another type along the defined coercions: identity,
    /// integer to real, text and categorical into each other, and anything
    /// into text via its rendering.
    pub fn coerce(self, target: DataType) -> Option<Value> {
        match (self, target) {
            (v, t) if v.data_type() == t => Some(v),
            (Value::Integer(i), DataType::Real) => Some(Value::Real(i as f64)),
            (Value::Categorical(s), DataType::Text) => Some(Value::Text(s)),
            (Value::Text(s), DataType::Categorical) => Some(Value::Categorical(s)),
            (v, DataType::Text) => Some(Value::Text(v.to_string())),
            _ => None,
        }
    }

    /// Total order used by min/max reductions and ranking.
    ///
    /// Numbers compare numerically across integer and real (NaN sorts last),
    /// labels lexicographically, `false < true`. Values of unrelated types are
    /// ordered by type.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) if a.data_type().is_numeric() && b.data_type().is_numeric() => {
                let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => x.total_cmp(&y),
                }
            }
            (a, b) => match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => type_rank(a.data_type()).cmp(&type_rank(b.data_type())),
            },
        }
    }

    /// Canonical equality key.
    pub(crate) fn key(&self) -> KeyAtom {
        match self {
            Value::Integer(v) => KeyAtom::Int(*v),
            Value::Real(v) => real_key(*v),
            Value::Text(s) | Value::Categorical(s) => KeyAtom::Str(s.clone()),
            Value::Boolean(b) => KeyAtom::Bool(*b),
        }
    }
}

fn type_rank(t: DataType) -> u8 {
    match t {
        DataType::Boolean => 0,
        DataType::Integer | DataType::Real => 1,
        DataType::Text | DataType::Categorical => 2,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(s) | Value::Categorical(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Hashable equality key for a cell.
///
/// Integral reals collapse onto the matching integer so that numeric keys of
/// different declared types still meet; text and categorical share labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyAtom {
    Absent,
    Int(i64),
    Float(u64),
    Str(String),
    Bool(bool),
}

impl KeyAtom {
    pub(crate) fn of(cell: Option<&Value>) -> Self {
        cell.map_or(KeyAtom::Absent, Value::key)
    }
}

// 2^63 as f64; every float in [-2^63, 2^63) converts to i64 exactly when integral.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn real_key(v: f64) -> KeyAtom {
    if v.is_nan() {
        KeyAtom::Float(f64::NAN.to_bits())
    } else if v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v) {
        KeyAtom::Int(v as i64)
    } else {
        KeyAtom::Float(v.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_types() {
        assert_eq!(Value::parse("30", DataType::Integer), Ok(Value::Integer(30)));
        assert_eq!(Value::parse(" 2.5 ", DataType::Real), Ok(Value::Real(2.5)));
        assert_eq!(Value::parse("YES", DataType::Boolean), Ok(Value::Boolean(true)));
        assert_eq!(
            Value::parse("cdc15", DataType::Categorical),
            Ok(Value::Categorical("cdc15".to_string()))
        );
        assert!(Value::parse("3x", DataType::Integer).is_err());
        assert!(Value::parse("maybe", DataType::Boolean).is_err());
    }

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("factor".parse::<DataType>().unwrap(), DataType::Categorical);
        assert_eq!("Real".parse::<DataType>().unwrap(), DataType::Real);
        assert!("matrix".parse::<DataType>().is_err());
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Value::Integer(3).coerce(DataType::Real), Some(Value::Real(3.0)));
        assert_eq!(
            Value::Real(0.5).coerce(DataType::Text),
            Some(Value::Text("0.5".to_string()))
        );
        assert_eq!(
            Value::Boolean(false).coerce(DataType::Text),
            Some(Value::Text("false".to_string()))
        );
        assert_eq!(Value::Text("a".into()).coerce(DataType::Integer), None);
    }

    #[test]
    fn test_numeric_keys_meet() {
        assert_eq!(Value::Real(2.0).key(), Value::Integer(2).key());
        assert_eq!(Value::Real(-0.0).key(), Value::Real(0.0).key());
        assert_eq!(Value::Real(f64::NAN).key(), Value::Real(-f64::NAN).key());
        assert_ne!(Value::Real(2.5).key(), Value::Integer(2).key());
        assert_eq!(
            Value::Text("x".into()).key(),
            Value::Categorical("x".into()).key()
        );
    }

    #[test]
    fn test_total_cmp() {
        assert_eq!(Value::Integer(2).total_cmp(&Value::Real(2.5)), Ordering::Less);
        assert_eq!(Value::Real(f64::NAN).total_cmp(&Value::Real(1.0)), Ordering::Greater);
        assert_eq!(
            Value::Text("b".into()).total_cmp(&Value::Text("a".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn test_comparable_types() {
        assert!(DataType::Integer.comparable_with(DataType::Real));
        assert!(DataType::Text.comparable_with(DataType::Categorical));
        assert!(!DataType::Text.comparable_with(DataType::Integer));
        assert!(!DataType::Boolean.comparable_with(DataType::Integer));
    }
}
