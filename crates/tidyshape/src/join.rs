//! Left join of two tables on key columns.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, KeyAtom, Table};

/// Column pairs (left name, right name) that must be equal for rows to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pairs: Vec<(String, String)>,
}

impl JoinSpec {
    /// Match `left` in the left table with `right` in the right table.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            pairs: vec![(left.into(), right.into())],
        }
    }

    /// Match a column that has the same name on both sides.
    pub fn on(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::new(column.clone(), column)
    }

    /// Add another key pair; rows match when every pair is equal.
    pub fn and(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.pairs.push((left.into(), right.into()));
        self
    }

    /// Key pairs in declaration order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Options for [`left_join`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    /// Suffixes appended to colliding non-key column names from the left and
    /// right table.
    pub suffixes: (String, String),
    /// Whether an absent key matches an absent key.
    pub match_absent: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            suffixes: (".x".to_string(), ".y".to_string()),
            match_absent: true,
        }
    }
}

/// Attach the right table's non-key columns to every left row.
///
/// Every left row appears in the output, in order. A left row with no match
/// gets absent values in the appended columns; a left row matching `m` right
/// rows appears `m` times, once per match in right-table order.
///
/// Non-key columns present on both sides are renamed with
/// [`JoinOptions::suffixes`] on both sides. A right column named like a left
/// key column takes only the right suffix. Key columns of the right table are
/// dropped, since they equal the left keys.
pub fn left_join(left: &Table, right: &Table, spec: &JoinSpec, options: &JoinOptions) -> Result<Table> {
    if spec.pairs().is_empty() {
        return Err(TidyError::Schema("Join specification has no key columns".to_string()));
    }
    let mut left_keys = Vec::with_capacity(spec.pairs().len());
    let mut right_keys = Vec::with_capacity(spec.pairs().len());
    for (l, r) in spec.pairs() {
        let lc = left.column(l)?;
        let rc = right.column(r)?;
        if !lc.data_type().comparable_with(rc.data_type()) {
            return Err(TidyError::Schema(format!(
                "Cannot join {} column '{}' with {} column '{}'",
                lc.data_type(),
                l,
                rc.data_type(),
                r
            )));
        }
        left_keys.push(lc);
        right_keys.push(rc);
    }

    let mut index: HashMap<Vec<KeyAtom>, Vec<usize>> = HashMap::new();
    for row in 0..right.row_count() {
        index
            .entry(Table::row_key(&right_keys, row))
            .or_default()
            .push(row);
    }

    let mut left_rows = Vec::with_capacity(left.row_count());
    let mut right_rows = Vec::with_capacity(left.row_count());
    let mut unmatched = 0usize;
    for row in 0..left.row_count() {
        let key = Table::row_key(&left_keys, row);
        let matches = if !options.match_absent && key.contains(&KeyAtom::Absent) {
            None
        } else {
            index.get(&key)
        };
        match matches {
            Some(rows) => {
                for &r in rows {
                    left_rows.push(row);
                    right_rows.push(Some(r));
                }
            }
            None => {
                unmatched += 1;
                left_rows.push(row);
                right_rows.push(None);
            }
        }
    }

    let right_key_names: HashSet<&str> = spec.pairs().iter().map(|(_, r)| r.as_str()).collect();
    let left_key_names: HashSet<&str> = spec.pairs().iter().map(|(l, _)| l.as_str()).collect();
    let right_payload: Vec<&Column> = right
        .columns()
        .filter(|c| !right_key_names.contains(c.name()))
        .collect();
    let shared: HashSet<&str> = right_payload
        .iter()
        .map(|c| c.name())
        .filter(|n| left.has_column(n) && !left_key_names.contains(n))
        .collect();

    let (left_suffix, right_suffix) = &options.suffixes;
    let mut columns: Vec<Column> = Vec::with_capacity(left.column_count() + right_payload.len());
    for column in left.columns() {
        let gathered = column.gather(&left_rows);
        if shared.contains(column.name()) {
            columns.push(gathered.renamed(format!("{}{}", column.name(), left_suffix)));
        } else {
            columns.push(gathered);
        }
    }
    for column in &right_payload {
        let gathered = column.gather_optional(&right_rows);
        if shared.contains(column.name()) || left_key_names.contains(column.name()) {
            columns.push(gathered.renamed(format!("{}{}", column.name(), right_suffix)));
        } else {
            columns.push(gathered);
        }
    }

    let mut seen = HashSet::with_capacity(columns.len());
    if let Some(clash) = columns.iter().find(|c| !seen.insert(c.name())) {
        return Err(TidyError::Schema(format!(
            "Join output column '{}' is still ambiguous after applying suffixes",
            clash.name()
        )));
    }

    tracing::debug!(
        left_rows = left.row_count(),
        right_rows = right.row_count(),
        output_rows = left_rows.len(),
        unmatched,
        "left join"
    );
    Table::with_row_count(columns, left_rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn samples() -> Table {
        Table::new(vec![
            Column::text("sample", vec![Some("s1"), Some("s2"), Some("s3")]),
            Column::real("score", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap()
    }

    fn metadata() -> Table {
        Table::new(vec![
            Column::categorical("id", vec![Some("s1"), Some("s3"), Some("s3")]),
            Column::text("site", vec![Some("gut"), Some("lung"), Some("skin")]),
            Column::real("score", vec![Some(9.0), Some(8.0), Some(7.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_left_join_fan_out_and_missing() {
        let joined = left_join(
            &samples(),
            &metadata(),
            &JoinSpec::new("sample", "id"),
            &JoinOptions::default(),
        )
        .unwrap();

        assert_eq!(joined.row_count(), 4);
        assert_eq!(
            joined.column_names(),
            vec!["sample", "score.x", "site", "score.y"]
        );
        assert_eq!(joined.get(0, "site"), Some(&Value::Text("gut".into())));
        assert_eq!(joined.get(1, "sample"), Some(&Value::Text("s2".into())));
        assert_eq!(joined.get(1, "site"), None);
        assert_eq!(joined.get(2, "site"), Some(&Value::Text("lung".into())));
        assert_eq!(joined.get(3, "site"), Some(&Value::Text("skin".into())));
        assert_eq!(joined.get(3, "score.x"), Some(&Value::Real(3.0)));
    }

    #[test]
    fn test_numeric_keys_of_different_types_match() {
        let left = Table::new(vec![Column::integer("k", vec![Some(1), Some(2)])]).unwrap();
        let right = Table::new(vec![
            Column::real("k", vec![Some(2.0)]),
            Column::boolean("hit", vec![Some(true)]),
        ])
        .unwrap();
        let joined = left_join(&left, &right, &JoinSpec::on("k"), &JoinOptions::default()).unwrap();
        assert_eq!(joined.column_names(), vec!["k", "hit"]);
        assert_eq!(joined.get(0, "hit"), None);
        assert_eq!(joined.get(1, "hit"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_absent_key_matching_is_configurable() {
        let left = Table::new(vec![Column::text("k", vec![None::<&str>])]).unwrap();
        let right = Table::new(vec![
            Column::text("k", vec![None::<&str>]),
            Column::integer("v", vec![Some(5)]),
        ])
        .unwrap();

        let matched = left_join(&left, &right, &JoinSpec::on("k"), &JoinOptions::default()).unwrap();
        assert_eq!(matched.get(0, "v"), Some(&Value::Integer(5)));

        let options = JoinOptions {
            match_absent: false,
            ..JoinOptions::default()
        };
        let unmatched = left_join(&left, &right, &JoinSpec::on("k"), &options).unwrap();
        assert_eq!(unmatched.get(0, "v"), None);
    }

    #[test]
    fn test_multi_column_key() {
        let left = Table::new(vec![
            Column::text("a", vec![Some("x"), Some("x")]),
            Column::integer("b", vec![Some(1), Some(2)]),
        ])
        .unwrap();
        let right = Table::new(vec![
            Column::text("a", vec![Some("x")]),
            Column::integer("b", vec![Some(2)]),
            Column::text("note", vec![Some("found")]),
        ])
        .unwrap();
        let spec = JoinSpec::on("a").and("b", "b");
        let joined = left_join(&left, &right, &spec, &JoinOptions::default()).unwrap();
        assert_eq!(joined.get(0, "note"), None);
        assert_eq!(joined.get(1, "note"), Some(&Value::Text("found".into())));
    }

    #[test]
    fn test_join_schema_errors() {
        let left = samples();
        assert!(left_join(&left, &metadata(), &JoinSpec::new("nope", "id"), &JoinOptions::default()).is_err());
        assert!(matches!(
            left_join(&left, &metadata(), &JoinSpec::new("score", "id"), &JoinOptions::default()),
            Err(TidyError::Schema(_))
        ));

        // "score.x" already exists on the left, so the suffix cannot disambiguate.
        let crowded = left.with_column(Column::real("score.x", vec![None, None, None])).unwrap();
        assert!(left_join(&crowded, &metadata(), &JoinSpec::new("sample", "id"), &JoinOptions::default()).is_err());
    }

    #[test]
    fn test_right_column_named_like_left_key() {
        let left = Table::new(vec![Column::text("id", vec![Some("a")])]).unwrap();
        let right = Table::new(vec![
            Column::text("code", vec![Some("a")]),
            Column::text("id", vec![Some("legacy")]),
        ])
        .unwrap();
        let joined =
            left_join(&left, &right, &JoinSpec::new("id", "code"), &JoinOptions::default()).unwrap();
        assert_eq!(joined.column_names(), vec!["id", "id.y"]);
    }
}
