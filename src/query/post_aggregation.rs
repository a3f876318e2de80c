use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ArithmeticFn {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/", alias = "quotient")]
    Divide,
}

impl fmt::Display for ArithmeticFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticFn::Plus => write!(f, "+"),
            ArithmeticFn::Minus => write!(f, "-"),
            ArithmeticFn::Multiply => write!(f, "*"),
            ArithmeticFn::Divide => write!(f, "/"),
        }
    }
}

/// A derived expression over already-aggregated columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PostAggregationSpec {
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        func: ArithmeticFn,
        fields: Vec<PostAggregationSpec>,
    },
    FieldAccess {
        #[serde(default)]
        name: Option<String>,
        field_name: String,
    },
    Constant {
        #[serde(default)]
        name: Option<String>,
        value: f64,
    },
    /// Sketch estimates, javascript and the like; these have no SQL form.
    #[serde(other)]
    Unsupported,
}

impl PostAggregationSpec {
    pub fn arithmetic(name: &str, func: ArithmeticFn, fields: Vec<PostAggregationSpec>) -> Self {
        PostAggregationSpec::Arithmetic { name: name.to_string(), func, fields }
    }

    pub fn field(field_name: &str) -> Self {
        PostAggregationSpec::FieldAccess { name: None, field_name: field_name.to_string() }
    }

    pub fn constant(value: f64) -> Self {
        PostAggregationSpec::Constant { name: None, value }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PostAggregationSpec::Arithmetic { name, .. } => Some(name),
            PostAggregationSpec::FieldAccess { name, .. } => name.as_deref(),
            PostAggregationSpec::Constant { name, .. } => name.as_deref(),
            PostAggregationSpec::Unsupported => None,
        }
    }
}
