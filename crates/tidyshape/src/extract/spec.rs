//! Key specifications: patterns with typed named capture groups.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{DataType, Value};

/// How a row that fails to match is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Fail the whole operation with [`TidyError::Extraction`].
    #[default]
    Strict,
    /// Emit absent values in every target column and continue.
    Lenient,
}

/// A pattern with named capture groups and a target type per group.
///
/// The pattern must match the whole value, so `cdc(?P<n>\d+)` does not match
/// `xcdc15`.
#[derive(Debug, Clone)]
pub struct KeySpec {
    source: String,
    pattern: Regex,
    groups: Vec<(String, DataType)>,
}

impl KeySpec {
    /// Compile a key specification.
    ///
    /// Every declared group must be a named group of the pattern, and each
    /// name may be declared once.
    pub fn new<S: AsRef<str>>(pattern: &str, groups: &[(S, DataType)]) -> Result<Self> {
        let compiled = Regex::new(&format!("^(?:{})$", pattern))?;
        if groups.is_empty() {
            return Err(TidyError::Schema(format!(
                "Key pattern '{}' declares no target groups",
                pattern
            )));
        }

        let mut declared: Vec<(String, DataType)> = Vec::with_capacity(groups.len());
        for (name, data_type) in groups {
            let name = name.as_ref();
            if !compiled.capture_names().flatten().any(|n| n == name) {
                return Err(TidyError::Schema(format!(
                    "Pattern '{}' has no named group '{}'",
                    pattern, name
                )));
            }
            if declared.iter().any(|(n, _)| n == name) {
                return Err(TidyError::Schema(format!(
                    "Group '{}' declared more than once",
                    name
                )));
            }
            declared.push((name.to_string(), *data_type));
        }

        Ok(Self {
            source: pattern.to_string(),
            pattern: compiled,
            groups: declared,
        })
    }

    /// The pattern as written, without the implicit anchors.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Declared target columns in order.
    pub fn groups(&self) -> &[(String, DataType)] {
        &self.groups
    }

    /// Extract typed values from one label.
    ///
    /// Returns `None` when the label does not match or a captured token does
    /// not parse as its declared type. A group that did not take part in the
    /// match yields an absent value.
    pub fn apply(&self, label: &str) -> Option<Vec<Option<Value>>> {
        let captures = self.pattern.captures(label)?;
        self.groups
            .iter()
            .map(|(name, data_type)| match captures.name(name) {
                Some(m) => Value::parse(m.as_str(), *data_type).ok().map(Some),
                None => Some(None),
            })
            .collect()
    }
}
