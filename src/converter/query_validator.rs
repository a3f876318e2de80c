use tracing::debug;

use crate::query::{AnalyticQuery, QueryType};

/// Decides which query shapes can be converted.
pub struct QueryValidator;

impl QueryValidator {
    /// True for timeseries and groupBy queries, false for everything else.
    pub fn is_valid_query(query: &AnalyticQuery) -> bool {
        debug!("validating {} query: {:?}", query.query_type, query);
        match query.query_type {
            QueryType::Timeseries | QueryType::GroupBy => true,
            QueryType::Unsupported(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query::Granularity, table::PhysicalTableRef};

    fn query(query_type: QueryType) -> AnalyticQuery {
        AnalyticQuery::new(query_type, PhysicalTableRef::new("events", "ts"), Granularity::All)
    }

    #[test]
    fn timeseries_and_group_by_are_valid() {
        assert!(QueryValidator::is_valid_query(&query(QueryType::Timeseries)));
        assert!(QueryValidator::is_valid_query(&query(QueryType::GroupBy)));
    }

    #[test]
    fn everything_else_is_invalid() {
        for name in ["topN", "scan", "search", "timeBoundary", "segmentMetadata"] {
            assert!(!QueryValidator::is_valid_query(&query(QueryType::from_name(name))), "{name}");
        }
    }
}
