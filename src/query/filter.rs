use serde::{Deserialize, Deserializer};

/// Row-level filter over dimensions, applied before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FilterTree {
    Selector {
        dimension: String,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        value: Option<String>,
    },
    In {
        dimension: String,
        #[serde(deserialize_with = "strings_or_numbers")]
        values: Vec<String>,
    },
    Regex {
        dimension: String,
        pattern: String,
    },
    Search {
        dimension: String,
        query: SearchQuerySpec,
    },
    Bound {
        dimension: String,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        lower: Option<String>,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        upper: Option<String>,
        #[serde(default)]
        lower_strict: bool,
        #[serde(default)]
        upper_strict: bool,
    },
    And {
        fields: Vec<FilterTree>,
    },
    Or {
        fields: Vec<FilterTree>,
    },
    Not {
        field: Box<FilterTree>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SearchQuerySpec {
    Contains {
        value: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    InsensitiveContains {
        value: String,
    },
    #[serde(other)]
    Unsupported,
}

impl FilterTree {
    pub fn selector(dimension: &str, value: &str) -> Self {
        FilterTree::Selector { dimension: dimension.to_string(), value: Some(value.to_string()) }
    }

    pub fn in_list(dimension: &str, values: &[&str]) -> Self {
        FilterTree::In {
            dimension: dimension.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn and(fields: Vec<FilterTree>) -> Self {
        FilterTree::And { fields }
    }

    pub fn or(fields: Vec<FilterTree>) -> Self {
        FilterTree::Or { fields }
    }

    pub fn not(field: FilterTree) -> Self {
        FilterTree::Not { field: Box::new(field) }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::String(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<Scalar>::deserialize(deserializer)?.into_iter().map(String::from).collect())
}
