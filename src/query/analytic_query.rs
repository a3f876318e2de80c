use serde::Deserialize;

use crate::{
    error::Result,
    query::{AggregationSpec, Dimension, FilterTree, Granularity, HavingExpr, Interval, LimitSpec, PostAggregationSpec, QueryType},
    table::PhysicalTableRef,
};

/// A native analytic query, as accepted by the converter.
///
/// `having` and `limit_spec` only mean something for `GroupBy`; they are
/// ignored for every other query type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticQuery {
    pub query_type: QueryType,
    pub data_source: PhysicalTableRef,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub aggregations: Vec<AggregationSpec>,
    #[serde(default)]
    pub post_aggregations: Vec<PostAggregationSpec>,
    #[serde(default)]
    pub filter: Option<FilterTree>,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub intervals: Vec<Interval>,
    #[serde(default)]
    pub having: Option<HavingExpr>,
    #[serde(default)]
    pub limit_spec: Option<LimitSpec>,
}

impl AnalyticQuery {
    pub fn new(query_type: QueryType, data_source: PhysicalTableRef, granularity: Granularity) -> Self {
        Self {
            query_type,
            data_source,
            dimensions: vec![],
            aggregations: vec![],
            post_aggregations: vec![],
            filter: None,
            granularity,
            intervals: vec![],
            having: None,
            limit_spec: None,
        }
    }

    pub fn timeseries(data_source: PhysicalTableRef, granularity: Granularity) -> Self {
        Self::new(QueryType::Timeseries, data_source, granularity)
    }

    pub fn group_by(data_source: PhysicalTableRef, granularity: Granularity) -> Self {
        Self::new(QueryType::GroupBy, data_source, granularity)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_dimensions(mut self, api_names: &[&str]) -> Self {
        self.dimensions.extend(api_names.iter().map(|name| Dimension::new(name)));
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationSpec) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn with_post_aggregation(mut self, post_aggregation: PostAggregationSpec) -> Self {
        self.post_aggregations.push(post_aggregation);
        self
    }

    pub fn with_filter(mut self, filter: FilterTree) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.intervals.push(interval);
        self
    }

    pub fn with_having(mut self, having: HavingExpr) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_limit_spec(mut self, limit_spec: LimitSpec) -> Self {
        self.limit_spec = Some(limit_spec);
        self
    }
}
