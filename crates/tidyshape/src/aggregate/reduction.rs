//! Reduction functions applied to one column of one group.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, DataType, Value};

/// How a group's values are reduced to one output value.
///
/// All reductions skip absent values except
/// [`Reduction::CountIncludingMissing`]. Reductions over values also skip NaN
/// reals; [`Reduction::Count`] still counts them as present cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Sum; zero for a group with no values.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Sample variance (n - 1 denominator).
    Variance,
    /// Sample standard deviation.
    StdDev,
    /// Median (mean of the two middle values for even counts).
    Median,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Position of the largest value within the group, first on ties.
    ArgMax,
    /// Position of the smallest value within the group, first on ties.
    ArgMin,
    /// Number of present values.
    Count,
    /// Number of rows, absent or not.
    CountIncludingMissing,
}

impl Reduction {
    /// Name used in specs and output.
    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
            Reduction::Variance => "variance",
            Reduction::StdDev => "std_dev",
            Reduction::Median => "median",
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::ArgMax => "arg_max",
            Reduction::ArgMin => "arg_min",
            Reduction::Count => "count",
            Reduction::CountIncludingMissing => "count_including_missing",
        }
    }

    /// Output type for a source column type, or a schema error when the
    /// reduction does not apply to it.
    pub fn output_type(&self, source: DataType) -> Result<DataType> {
        let numeric = source.is_numeric();
        let ordered = numeric || source.is_string_like();
        let out = match self {
            Reduction::Sum if numeric => source,
            Reduction::Mean | Reduction::Variance | Reduction::StdDev | Reduction::Median
                if numeric =>
            {
                DataType::Real
            }
            Reduction::Min | Reduction::Max if ordered => source,
            Reduction::ArgMax | Reduction::ArgMin if numeric => DataType::Integer,
            Reduction::Count | Reduction::CountIncludingMissing => DataType::Integer,
            _ => {
                return Err(TidyError::Schema(format!(
                    "Reduction '{}' does not apply to {} values",
                    self, source
                )));
            }
        };
        Ok(out)
    }

    /// Reduce the cells of `column` at `rows` (one group).
    pub(crate) fn reduce(&self, column: &Column, rows: &[usize]) -> Result<Option<Value>> {
        let cells = || rows.iter().filter_map(|&r| column.get(r));
        let present = || cells().filter(|v| !is_nan(v));
        let numbers = || present().filter_map(Value::as_f64);

        let value = match self {
            Reduction::Count => Some(Value::Integer(cells().count() as i64)),
            Reduction::CountIncludingMissing => Some(Value::Integer(rows.len() as i64)),
            Reduction::Sum => Some(match column.data_type() {
                DataType::Integer => {
                    let mut total: i64 = 0;
                    for value in present() {
                        if let Value::Integer(v) = value {
                            total = total.checked_add(*v).ok_or_else(|| TidyError::Overflow {
                                column: column.name().to_string(),
                            })?;
                        }
                    }
                    Value::Integer(total)
                }
                _ => Value::Real(numbers().sum()),
            }),
            Reduction::Mean => numbers().collect::<Moments>().mean().map(Value::Real),
            Reduction::Variance => numbers().collect::<Moments>().variance().map(Value::Real),
            Reduction::StdDev => numbers()
                .collect::<Moments>()
                .variance()
                .map(|v| Value::Real(v.sqrt())),
            Reduction::Median => median(numbers().collect()).map(Value::Real),
            Reduction::Min => present().min_by(|a, b| a.total_cmp(b)).cloned(),
            Reduction::Max => present().max_by(|a, b| a.total_cmp(b)).cloned(),
            Reduction::ArgMax => arg_extreme(column, rows, Ordering::Greater),
            Reduction::ArgMin => arg_extreme(column, rows, Ordering::Less),
        };
        Ok(value)
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reduction {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Reduction::Sum),
            "mean" | "avg" => Ok(Reduction::Mean),
            "variance" | "var" => Ok(Reduction::Variance),
            "std_dev" | "sd" | "std" => Ok(Reduction::StdDev),
            "median" => Ok(Reduction::Median),
            "min" => Ok(Reduction::Min),
            "max" => Ok(Reduction::Max),
            "arg_max" | "argmax" | "which_max" => Ok(Reduction::ArgMax),
            "arg_min" | "argmin" | "which_min" => Ok(Reduction::ArgMin),
            "count" => Ok(Reduction::Count),
            "count_including_missing" | "n" => Ok(Reduction::CountIncludingMissing),
            other => Err(TidyError::Schema(format!("Unknown reduction '{}'", other))),
        }
    }
}

/// Running mean and variance using Welford's algorithm.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    fn variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }
}

impl FromIterator<f64> for Moments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Moments::default();
        for value in iter {
            moments.add(value);
        }
        moments
    }
}

fn is_nan(value: &Value) -> bool {
    value.as_f64().is_some_and(f64::is_nan)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn arg_extreme(column: &Column, rows: &[usize], wanted: Ordering) -> Option<Value> {
    let mut best: Option<(usize, &Value)> = None;
    let cells = rows
        .iter()
        .enumerate()
        .filter_map(|(p, &r)| column.get(r).filter(|v| !is_nan(v)).map(|v| (p, v)));
    for (position, value) in cells {
        if best.is_none_or(|(_, current)| value.total_cmp(current) == wanted) {
            best = Some((position, value));
        }
    }
    best.map(|(position, _)| Value::Integer(position as i64))
}
