use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "asc", alias = "ASC", alias = "ASCENDING")]
    Ascending,
    #[serde(alias = "desc", alias = "DESC", alias = "DESCENDING")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "OrderByColumnWire")]
pub struct OrderByColumn {
    /// Api name of a dimension or metric.
    pub dimension: String,
    /// Unspecified means ascending.
    pub direction: Option<SortDirection>,
}

impl OrderByColumn {
    pub fn new(dimension: &str, direction: SortDirection) -> Self {
        Self { dimension: dimension.to_string(), direction: Some(direction) }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Some(SortDirection::Descending)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderByColumnWire {
    Name(String),
    Spec {
        dimension: String,
        #[serde(default)]
        direction: Option<SortDirection>,
    },
}

impl From<OrderByColumnWire> for OrderByColumn {
    fn from(value: OrderByColumnWire) -> Self {
        match value {
            OrderByColumnWire::Name(dimension) => OrderByColumn { dimension, direction: None },
            OrderByColumnWire::Spec { dimension, direction } => OrderByColumn { dimension, direction },
        }
    }
}

/// Row limit and explicit ordering of a groupBy query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LimitSpec {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub columns: Vec<OrderByColumn>,
}

impl LimitSpec {
    pub fn new(limit: Option<usize>, columns: Vec<OrderByColumn>) -> Self {
        Self { limit, columns }
    }
}
