use std::collections::HashMap;

use crate::{planner::AggFunction, query::AggregationSpec, table::FieldNameMapper};

/// What an aggregation turns into on the SQL side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggKind {
    /// Counts rows; takes no input field.
    RowCount,
    Function(AggFunction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlAggregationDescriptor {
    pub kind: AggKind,
    /// Physical input column. Always `None` for [`AggKind::RowCount`].
    pub field_name: Option<String>,
    pub alias: String,
}

pub trait AggregationMapper: Send + Sync {
    /// `None` when the aggregation has no SQL counterpart.
    fn map_aggregation(&self, spec: &AggregationSpec, mapper: &dyn FieldNameMapper) -> Option<SqlAggregationDescriptor>;
}

/// Case-insensitive registry of aggregation kinds.
#[derive(Debug, Clone, Default)]
pub struct AggregationRegistry {
    by_name: HashMap<String, AggKind>,
}

impl AggregationRegistry {
    pub fn new() -> Self { Self { by_name: HashMap::new() } }

    pub fn register(&mut self, name: &str, kind: AggKind) {
        self.by_name.insert(name.to_ascii_lowercase(), kind);
    }

    pub fn get(&self, name: &str) -> Option<AggKind> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.by_name.keys().cloned().collect();
        v.sort();
        v
    }

    pub fn default_aggregation_registry() -> Self {
        let mut registry = Self::new();
        registry.register("count", AggKind::RowCount);
        registry.register("longSum", AggKind::Function(AggFunction::Sum));
        registry.register("doubleSum", AggKind::Function(AggFunction::Sum));
        registry.register("longMin", AggKind::Function(AggFunction::Min));
        registry.register("doubleMin", AggKind::Function(AggFunction::Min));
        registry.register("longMax", AggKind::Function(AggFunction::Max));
        registry.register("doubleMax", AggKind::Function(AggFunction::Max));
        registry
    }
}

impl AggregationMapper for AggregationRegistry {
    fn map_aggregation(&self, spec: &AggregationSpec, mapper: &dyn FieldNameMapper) -> Option<SqlAggregationDescriptor> {
        let kind = self.get(&spec.kind)?;
        let field_name = match kind {
            AggKind::RowCount => None,
            AggKind::Function(_) => Some(mapper.apply(spec.field_name.as_deref()?)),
        };
        Some(SqlAggregationDescriptor { kind, field_name, alias: spec.name.clone() })
    }
}
