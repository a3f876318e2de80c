use std::fmt;

use serde::Deserialize;

/// The physical table a query scans.
///
/// - `catalog` and `schema` qualify `name` when present.
/// - `timestamp_column` holds the row time used for interval filters and time buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalTableRef {
    pub name: String,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub timestamp_column: String,
}

impl PhysicalTableRef {
    pub fn new(name: &str, timestamp_column: &str) -> Self {
        Self {
            name: name.to_string(),
            catalog: None,
            schema: None,
            timestamp_column: timestamp_column.to_string(),
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn with_catalog(mut self, catalog: &str) -> Self {
        self.catalog = Some(catalog.to_string());
        self
    }

    /// Name parts from outermost to innermost: catalog, schema, table.
    pub fn qualified_name(&self) -> Vec<&str> {
        self.catalog.iter()
            .chain(self.schema.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }
}

impl fmt::Display for PhysicalTableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name().join("."))
    }
}
