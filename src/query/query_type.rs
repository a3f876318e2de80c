use std::fmt;

use serde::Deserialize;

/// The shape of an analytic query.
///
/// Only `Timeseries` and `GroupBy` can be turned into SQL; every other native
/// query type is carried as `Unsupported` with its wire name so the gate can
/// report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum QueryType {
    Timeseries,
    GroupBy,
    Unsupported(String),
}

impl QueryType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "timeseries" => QueryType::Timeseries,
            "groupBy" => QueryType::GroupBy,
            other => QueryType::Unsupported(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            QueryType::Timeseries => "timeseries",
            QueryType::GroupBy => "groupBy",
            QueryType::Unsupported(name) => name,
        }
    }
}

impl From<String> for QueryType {
    fn from(value: String) -> Self {
        QueryType::from_name(&value)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Timeseries => write!(f, "TIMESERIES"),
            QueryType::GroupBy => write!(f, "GROUP_BY"),
            QueryType::Unsupported(name) => write!(f, "UNSUPPORTED({})", name),
        }
    }
}
