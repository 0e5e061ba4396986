//! Column-role mapping: which columns are numeric, categorical, or datetime,
//! plus the utility target/date columns and the declared modeling task.
//!
//! The mapping is an input collaborator. It is loaded from YAML, read-only,
//! and never inferred or validated against the dataset here; a declared
//! column that is absent surfaces as a lookup error when the dataset is
//! indexed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Declared modeling objective; controls whether the target column is
/// profiled as categorical or numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Classification,
    Regression,
}

/// Columns with a special role rather than an ordinary feature role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityColumns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub categorical: Vec<String>,
    #[serde(default)]
    pub datetime: Vec<String>,
    #[serde(default)]
    pub utility: UtilityColumns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

/// How a single column should be parsed and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Datetime,
    /// Not declared in the mapping; kept as raw text and not profiled.
    Text,
}

impl ColumnMapping {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening mapping file {path:?}"))?;
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing mapping file {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing column mapping")?;
        fs::write(path, serialized).with_context(|| format!("Writing mapping file {path:?}"))
    }

    /// Datetime-scored columns: the declared datetime features plus the
    /// utility date column when one is named.
    pub fn datetime_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.datetime.iter().map(String::as_str).collect();
        if let Some(date) = self.utility.date.as_deref() {
            columns.push(date);
        }
        columns
    }

    /// True when the target is scored as a categorical feature.
    pub fn target_is_categorical(&self) -> bool {
        self.task == Some(Task::Classification)
    }

    /// Resolve the parsing/scoring role of a named column. Feature lists
    /// take precedence over utility declarations.
    pub fn role_of(&self, name: &str) -> ColumnRole {
        if self.numeric.iter().any(|c| c == name) {
            return ColumnRole::Numeric;
        }
        if self.categorical.iter().any(|c| c == name) {
            return ColumnRole::Categorical;
        }
        if self.datetime.iter().any(|c| c == name) || self.utility.date.as_deref() == Some(name) {
            return ColumnRole::Datetime;
        }
        if self.utility.target.as_deref() == Some(name) {
            return if self.target_is_categorical() {
                ColumnRole::Categorical
            } else {
                ColumnRole::Numeric
            };
        }
        ColumnRole::Text
    }
}
