use serde::Deserialize;
use serde_json::Number;

/// Predicate over aggregated (and post-aggregated) outputs of a groupBy query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HavingExpr {
    EqualTo {
        aggregation: String,
        value: Number,
    },
    GreaterThan {
        aggregation: String,
        value: Number,
    },
    LessThan {
        aggregation: String,
        value: Number,
    },
    And {
        having_specs: Vec<HavingExpr>,
    },
    Or {
        having_specs: Vec<HavingExpr>,
    },
    Not {
        having_spec: Box<HavingExpr>,
    },
    #[serde(other)]
    Unsupported,
}

impl HavingExpr {
    pub fn greater_than(aggregation: &str, value: i64) -> Self {
        HavingExpr::GreaterThan { aggregation: aggregation.to_string(), value: value.into() }
    }

    pub fn less_than(aggregation: &str, value: i64) -> Self {
        HavingExpr::LessThan { aggregation: aggregation.to_string(), value: value.into() }
    }

    pub fn equal_to(aggregation: &str, value: i64) -> Self {
        HavingExpr::EqualTo { aggregation: aggregation.to_string(), value: value.into() }
    }
}
