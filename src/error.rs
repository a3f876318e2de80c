use thiserror::Error;

/// Everything that can abort a query conversion.
///
/// A failed conversion never yields partial SQL; the caller turns the error
/// into whatever response its own surface needs.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Raised only by the caller-side gate in [`crate::converter::SqlConverter`].
    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    #[error("couldn't build sql aggregation with {0}")]
    AggregationResolution(String),

    #[error("couldn't translate filter: {0}")]
    FilterTranslation(String),

    #[error("couldn't translate having: {0}")]
    HavingTranslation(String),

    #[error("couldn't translate post aggregation: {0}")]
    PostAggregationTranslation(String),

    #[error("field [{name}] not found; input fields are: {available:?}")]
    FieldNotFound { name: String, available: Vec<String> },

    #[error("output name [{0}] is already taken")]
    DuplicateOutputName(String),

    #[error("time buckets expected at fields {start}..{end}, but only {available} fields exist")]
    BucketLayout { start: usize, end: usize, available: usize },

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("invalid query document: {0}")]
    InvalidQuery(#[from] serde_json::Error),

    #[error("couldn't render sql: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_failure_names_the_aggregation() {
        let err = ConversionError::AggregationResolution("hyperUnique(users) as uniques".into());
        assert_eq!(err.to_string(), "couldn't build sql aggregation with hyperUnique(users) as uniques");
    }

    #[test]
    fn field_not_found_lists_available_fields() {
        let err = ConversionError::FieldNotFound {
            name: "missing".into(),
            available: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "field [missing] not found; input fields are: [\"a\", \"b\"]");
    }

    #[test]
    fn json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ConversionError = parse.unwrap_err().into();
        assert!(matches!(err, ConversionError::InvalidQuery(_)));
    }
}
