use std::fmt;

use serde::Deserialize;

/// A declared metric computation, e.g. `{"type": "longSum", "name": "added", "fieldName": "added"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    /// Native aggregation type (`longSum`, `count`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Output alias.
    pub name: String,
    /// Api name of the input field; absent for `count`.
    #[serde(default)]
    pub field_name: Option<String>,
}

impl AggregationSpec {
    pub fn new(kind: &str, field_name: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            field_name: Some(field_name.to_string()),
        }
    }

    pub fn count(name: &str) -> Self {
        Self {
            kind: "count".to_string(),
            name: name.to_string(),
            field_name: None,
        }
    }
}

impl fmt::Display for AggregationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field_name {
            Some(field) => write!(f, "{}({}) as {}", self.kind, field, self.name),
            None => write!(f, "{}() as {}", self.kind, self.name),
        }
    }
}
