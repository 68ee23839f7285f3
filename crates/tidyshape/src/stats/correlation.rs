//! Pairwise-complete correlation matrices.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, Table};

/// Correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    #[default]
    Pearson,
    /// Spearman rank correlation (Pearson on average ranks).
    Spearman,
}

/// One cell of a [`CorrelationMatrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrelationCell {
    /// A computed coefficient in `[-1, 1]`.
    Value(f64),
    /// Fewer than two rows had both columns present.
    Insufficient { pairs: usize },
    /// Enough pairs, but one side has zero variance over them.
    Undefined,
}

impl CorrelationCell {
    /// The coefficient, if one was computed.
    pub fn value(&self) -> Option<f64> {
        match self {
            CorrelationCell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Symmetric matrix of pairwise correlation coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    method: CorrelationMethod,
    cells: Vec<Vec<CorrelationCell>>,
}

impl CorrelationMatrix {
    /// Column names along both axes.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Method the coefficients were computed with.
    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    /// Number of columns (the matrix is `len() x len()`).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cell by position. Panics when out of range, like slice indexing.
    pub fn cell(&self, i: usize, j: usize) -> CorrelationCell {
        self.cells[i][j]
    }

    /// Coefficient for two named columns.
    ///
    /// Fails with [`TidyError::InsufficientData`] when the pair had fewer than
    /// two paired observations and returns `Ok(None)` when the coefficient is
    /// undefined.
    pub fn get(&self, left: &str, right: &str) -> Result<Option<f64>> {
        let i = self.position(left)?;
        let j = self.position(right)?;
        match self.cells[i][j] {
            CorrelationCell::Value(v) => Ok(Some(v)),
            CorrelationCell::Undefined => Ok(None),
            CorrelationCell::Insufficient { pairs } => Err(TidyError::InsufficientData {
                left: left.to_string(),
                right: right.to_string(),
                pairs,
            }),
        }
    }

    /// Render as a table: a text `column` column followed by one real column
    /// per variable. Insufficient and undefined cells become absent.
    pub fn to_table(&self) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.len() + 1);
        columns.push(Column::text("column", self.columns.iter().map(|c| Some(c.as_str()))));
        for (j, name) in self.columns.iter().enumerate() {
            columns.push(Column::real(
                name.as_str(),
                self.cells.iter().map(|row| row[j].value()),
            ));
        }
        Table::new(columns)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TidyError::Schema(format!("Column '{}' is not in the correlation matrix", name)))
    }
}

/// Build the correlation matrix of the given numeric columns.
///
/// Each cell uses only the rows where both of its columns are present
/// (pairwise-complete observations); NaN counts as missing. Each unordered
/// pair is computed once and stored in both cells, so the matrix is exactly
/// symmetric. The diagonal is 1 unless the column has fewer than two values.
pub fn correlation_matrix<S: AsRef<str>>(
    table: &Table,
    columns: &[S],
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    let resolved = table.columns_by_name(columns)?;
    let mut names: Vec<String> = Vec::with_capacity(resolved.len());
    for column in &resolved {
        if !column.data_type().is_numeric() {
            return Err(TidyError::Schema(format!(
                "Column '{}' is {}, correlation needs integer or real values",
                column.name(),
                column.data_type()
            )));
        }
        if names.iter().any(|n| n == column.name()) {
            return Err(TidyError::Schema(format!(
                "Column '{}' requested more than once",
                column.name()
            )));
        }
        names.push(column.name().to_string());
    }

    let data: Vec<Vec<Option<f64>>> = resolved
        .iter()
        .map(|c| c.f64_values().map(|v| v.filter(|x| !x.is_nan())).collect())
        .collect();

    let k = data.len();
    let mut cells = vec![vec![CorrelationCell::Undefined; k]; k];
    for i in 0..k {
        let present = data[i].iter().flatten().count();
        cells[i][i] = if present < 2 {
            CorrelationCell::Insufficient { pairs: present }
        } else {
            CorrelationCell::Value(1.0)
        };
        for j in (i + 1)..k {
            let cell = pair_cell(&data[i], &data[j], method);
            cells[i][j] = cell;
            cells[j][i] = cell;
        }
    }

    tracing::debug!(
        columns = k,
        rows = table.row_count(),
        method = ?method,
        "built correlation matrix"
    );
    Ok(CorrelationMatrix {
        columns: names,
        method,
        cells,
    })
}

fn pair_cell(x: &[Option<f64>], y: &[Option<f64>], method: CorrelationMethod) -> CorrelationCell {
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return CorrelationCell::Insufficient { pairs: xs.len() };
    }
    if method == CorrelationMethod::Spearman {
        xs = average_ranks(&xs);
        ys = average_ranks(&ys);
    }
    pearson(&xs, &ys).map_or(CorrelationCell::Undefined, CorrelationCell::Value)
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 1-based ranks with ties sharing their average rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end share ranks start+1 ..= end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_complete_insufficient() {
        let table = Table::new(vec![
            Column::integer("id", vec![Some(1), Some(2), Some(3)]),
            Column::real("a", vec![Some(1.0), Some(2.0), None]),
            Column::real("b", vec![Some(4.0), None, Some(6.0)]),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table, &["a", "b"], CorrelationMethod::Pearson).unwrap();

        assert_eq!(matrix.cell(0, 1), CorrelationCell::Insufficient { pairs: 1 });
        match matrix.get("a", "b") {
            Err(TidyError::InsufficientData { pairs, .. }) => assert_eq!(pairs, 1),
            other => panic!("expected insufficient data, got {:?}", other),
        }
        assert_eq!(matrix.get("a", "a").unwrap(), Some(1.0));
    }

    #[test]
    fn test_perfect_and_inverse_correlation() {
        let table = Table::new(vec![
            Column::real("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::integer("up", vec![Some(2), Some(4), Some(6), Some(8)]),
            Column::real("down", vec![Some(4.0), Some(3.0), None, Some(1.0)]),
        ])
        .unwrap();
        let matrix =
            correlation_matrix(&table, &["x", "up", "down"], CorrelationMethod::Pearson).unwrap();
        assert!((matrix.get("x", "up").unwrap().unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("x", "down").unwrap().unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_insufficient_for_sparse_column() {
        let table = Table::new(vec![
            Column::real("a", vec![Some(1.0), None]),
            Column::real("b", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table, &["a", "b"], CorrelationMethod::Pearson).unwrap();
        assert_eq!(matrix.cell(0, 0), CorrelationCell::Insufficient { pairs: 1 });
        assert_eq!(matrix.cell(1, 1), CorrelationCell::Value(1.0));
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let table = Table::new(vec![
            Column::real("c", vec![Some(5.0), Some(5.0), Some(5.0)]),
            Column::real("v", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table, &["c", "v"], CorrelationMethod::Pearson).unwrap();
        assert_eq!(matrix.get("c", "v").unwrap(), None);
    }

    #[test]
    fn test_spearman_is_rank_based() {
        let table = Table::new(vec![
            Column::real("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::real("y", vec![Some(1.0), Some(10.0), Some(100.0), Some(1000.0)]),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table, &["x", "y"], CorrelationMethod::Spearman).unwrap();
        assert!((matrix.get("x", "y").unwrap().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_ranks_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_to_table_maps_non_values_to_absent() {
        let table = Table::new(vec![
            Column::real("a", vec![Some(1.0), Some(2.0), None]),
            Column::real("b", vec![Some(4.0), None, Some(6.0)]),
        ])
        .unwrap();
        let matrix = correlation_matrix(&table, &["a", "b"], CorrelationMethod::Pearson).unwrap();
        let rendered = matrix.to_table().unwrap();
        assert_eq!(rendered.column_names(), vec!["column", "a", "b"]);
        assert_eq!(rendered.get(0, "b"), None);
        assert_eq!(rendered.get(1, "b"), Some(&crate::table::Value::Real(1.0)));
    }

    #[test]
    fn test_rejects_non_numeric_and_duplicates() {
        let table = Table::new(vec![
            Column::text("t", vec![Some("x")]),
            Column::real("r", vec![Some(1.0)]),
        ])
        .unwrap();
        assert!(correlation_matrix(&table, &["t", "r"], CorrelationMethod::Pearson).is_err());
        assert!(correlation_matrix(&table, &["r", "r"], CorrelationMethod::Pearson).is_err());
    }
}
