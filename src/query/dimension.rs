use serde::Deserialize;

/// A grouping column, named by its logical (api) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "DimensionWire")]
pub struct Dimension {
    pub api_name: String,
}

impl Dimension {
    pub fn new(api_name: &str) -> Self {
        Self { api_name: api_name.to_string() }
    }
}

// Native queries list dimensions either as bare names or as `{"dimension": ..}` specs.
#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionWire {
    Name(String),
    Spec { dimension: String },
}

impl From<DimensionWire> for Dimension {
    fn from(value: DimensionWire) -> Self {
        match value {
            DimensionWire::Name(api_name) => Dimension { api_name },
            DimensionWire::Spec { dimension } => Dimension { api_name: dimension },
        }
    }
}
