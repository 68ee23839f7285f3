//! Grouped aggregation.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::reduction::Reduction;
use crate::error::{Result, TidyError};
use crate::table::{Column, KeyAtom, Table};

/// One output column of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggOutput {
    /// Output column name.
    pub name: String,
    /// Column the reduction reads.
    pub source: String,
    /// Reduction applied per group.
    pub reduction: Reduction,
}

/// Grouping columns plus the outputs computed per group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggSpec {
    keys: Vec<String>,
    outputs: Vec<AggOutput>,
}

impl AggSpec {
    /// Group by the given columns. No columns means one group for the whole table.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            outputs: Vec::new(),
        }
    }

    /// Add an output column.
    pub fn output(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        reduction: Reduction,
    ) -> Self {
        self.outputs.push(AggOutput {
            name: name.into(),
            source: source.into(),
            reduction,
        });
        self
    }

    /// Grouping column names.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Requested outputs in order.
    pub fn outputs(&self) -> &[AggOutput] {
        &self.outputs
    }
}

/// Row indices of each group, groups in first-seen order.
///
/// Rows are grouped by equality over all key columns; an absent key is a
/// group value of its own. With no key columns every row is in one group.
pub fn group_rows<S: AsRef<str>>(table: &Table, keys: &[S]) -> Result<Vec<Vec<usize>>> {
    let key_columns = table.columns_by_name(keys)?;
    if key_columns.is_empty() {
        return Ok(vec![(0..table.row_count()).collect()]);
    }
    let mut groups: IndexMap<Vec<KeyAtom>, Vec<usize>> = IndexMap::new();
    for row in 0..table.row_count() {
        groups
            .entry(Table::row_key(&key_columns, row))
            .or_default()
            .push(row);
    }
    Ok(groups.into_values().collect())
}

/// Reduce each group to one row.
///
/// The output holds the grouping columns followed by one column per
/// requested output, one row per group in first-seen order.
pub fn aggregate(table: &Table, spec: &AggSpec) -> Result<Table> {
    let key_columns = table.columns_by_name(spec.keys())?;

    let mut names: HashSet<&str> = HashSet::new();
    for key in spec.keys() {
        if !names.insert(key.as_str()) {
            return Err(TidyError::Schema(format!("Grouping column '{}' listed twice", key)));
        }
    }
    let mut plan = Vec::with_capacity(spec.outputs().len());
    for output in spec.outputs() {
        if !names.insert(output.name.as_str()) {
            return Err(TidyError::Schema(format!(
                "Output column '{}' is defined more than once or shadows a grouping column",
                output.name
            )));
        }
        let source = table.column(&output.source)?;
        let data_type = output.reduction.output_type(source.data_type())?;
        plan.push((output, source, data_type));
    }

    let groups = group_rows(table, spec.keys())?;
    let firsts: Vec<usize> = groups.iter().filter_map(|rows| rows.first().copied()).collect();

    let mut columns: Vec<Column> = key_columns.iter().map(|c| c.gather(&firsts)).collect();
    for (output, source, data_type) in plan {
        let values = groups
            .iter()
            .map(|rows| output.reduction.reduce(source, rows))
            .collect::<Result<Vec<_>>>()?;
        columns.push(Column::new(output.name.as_str(), data_type, values)?);
    }

    tracing::debug!(
        input_rows = table.row_count(),
        groups = groups.len(),
        outputs = spec.outputs().len(),
        "aggregated groups"
    );
    Table::with_row_count(columns, groups.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{DataType, Value};

    fn expression() -> Table {
        Table::new(vec![
            Column::categorical("gene", vec![Some("a"), Some("b"), Some("a"), None, Some("b")]),
            Column::real("level", vec![Some(1.0), Some(4.0), Some(3.0), Some(7.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_seen_groups_with_absent_key() {
        let spec = AggSpec::new(["gene"])
            .output("mean", "level", Reduction::Mean)
            .output("n", "level", Reduction::CountIncludingMissing);
        let out = aggregate(&expression(), &spec).unwrap();

        assert_eq!(out.column_names(), vec!["gene", "mean", "n"]);
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.get(0, "gene"), Some(&Value::Categorical("a".into())));
        assert_eq!(out.get(0, "mean"), Some(&Value::Real(2.0)));
        assert_eq!(out.get(1, "mean"), Some(&Value::Real(4.0)));
        assert_eq!(out.get(1, "n"), Some(&Value::Integer(2)));
        assert_eq!(out.get(2, "gene"), None);
        assert_eq!(out.get(2, "mean"), Some(&Value::Real(7.0)));
    }

    #[test]
    fn test_all_missing_group() {
        let table = Table::new(vec![
            Column::text("g", vec![Some("x"), Some("x"), Some("y")]),
            Column::real("v", vec![None, None, Some(1.0)]),
        ])
        .unwrap();
        let spec = AggSpec::new(["g"])
            .output("mean", "v", Reduction::Mean)
            .output("var", "v", Reduction::Variance)
            .output("count", "v", Reduction::Count);
        let out = aggregate(&table, &spec).unwrap();
        assert_eq!(out.get(0, "mean"), None);
        assert_eq!(out.get(0, "var"), None);
        assert_eq!(out.get(0, "count"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_no_keys_is_one_group() {
        let spec = AggSpec::new(Vec::<String>::new()).output("total", "level", Reduction::Sum);
        let out = aggregate(&expression(), &spec).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.column_names(), vec!["total"]);
        assert_eq!(out.get(0, "total"), Some(&Value::Real(15.0)));
    }

    #[test]
    fn test_multi_key_groups() {
        let table = Table::new(vec![
            Column::text("a", vec![Some("x"), Some("x"), Some("x")]),
            Column::integer("b", vec![Some(1), Some(2), Some(1)]),
            Column::integer("v", vec![Some(10), Some(20), Some(30)]),
        ])
        .unwrap();
        let spec = AggSpec::new(["a", "b"]).output("peak", "v", Reduction::ArgMax);
        let out = aggregate(&table, &spec).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(0, "peak"), Some(&Value::Integer(1)));
        assert_eq!(out.column("peak").unwrap().data_type(), DataType::Integer);
    }

    #[test]
    fn test_spec_errors() {
        let table = expression();
        let unknown = AggSpec::new(["gene"]).output("m", "nope", Reduction::Mean);
        assert!(aggregate(&table, &unknown).is_err());

        let shadow = AggSpec::new(["gene"]).output("gene", "level", Reduction::Mean);
        assert!(aggregate(&table, &shadow).is_err());

        let wrong_type = AggSpec::new(["level"]).output("m", "gene", Reduction::Mean);
        assert!(matches!(aggregate(&table, &wrong_type), Err(TidyError::Schema(_))));
    }

    #[test]
    fn test_group_rows() {
        let groups = group_rows(&expression(), &["gene"]).unwrap();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 4], vec![3]]);
    }
}
