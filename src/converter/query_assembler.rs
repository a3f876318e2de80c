use std::sync::Arc;

use tracing::debug;

use crate::{
    converter::SortKeyResolver,
    error::{ConversionError, Result},
    planner::{AggregateCall, Limit, Offset, RelBuilder, RelNode, RexNode},
    query::{AnalyticQuery, QueryType},
    sql::{RelToSql, RenderConfig, SqlRenderer},
    table::FieldNameMapper,
    translator::{
        AggKind, AggregationMapper, AggregationRegistry, DatePartTimeConverter, DefaultFilterTranslator,
        DefaultHavingTranslator, DefaultPostAggregationTranslator, FilterTranslator, HavingTranslator,
        PostAggregationTranslator, TimeGranularityTranslator,
    },
};

/// Builds the operator tree for a supported query and renders it.
///
/// Callers gate on [`crate::converter::QueryValidator`] first; see
/// [`crate::converter::SqlConverter`]. Each call works on its own
/// [`RelBuilder`], so one assembler can serve concurrent conversions.
#[derive(Clone)]
pub struct QueryAssembler {
    aggregation_mapper: Arc<dyn AggregationMapper>,
    filter_translator: Arc<dyn FilterTranslator>,
    having_translator: Arc<dyn HavingTranslator>,
    post_aggregation_translator: Arc<dyn PostAggregationTranslator>,
    time_converter: Arc<dyn TimeGranularityTranslator>,
    renderer: Arc<dyn SqlRenderer>,
}

impl Default for QueryAssembler {
    fn default() -> Self {
        Self {
            aggregation_mapper: Arc::new(AggregationRegistry::default_aggregation_registry()),
            filter_translator: Arc::new(DefaultFilterTranslator),
            having_translator: Arc::new(DefaultHavingTranslator),
            post_aggregation_translator: Arc::new(DefaultPostAggregationTranslator),
            time_converter: Arc::new(DatePartTimeConverter),
            renderer: Arc::new(RelToSql::default()),
        }
    }
}

impl QueryAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default collaborators, rendering with `config`.
    pub fn with_config(config: RenderConfig) -> Self {
        Self::default().with_renderer(RelToSql::new(config))
    }

    pub fn with_aggregation_mapper(mut self, mapper: impl AggregationMapper + 'static) -> Self {
        self.aggregation_mapper = Arc::new(mapper);
        self
    }

    pub fn with_filter_translator(mut self, translator: impl FilterTranslator + 'static) -> Self {
        self.filter_translator = Arc::new(translator);
        self
    }

    pub fn with_having_translator(mut self, translator: impl HavingTranslator + 'static) -> Self {
        self.having_translator = Arc::new(translator);
        self
    }

    pub fn with_post_aggregation_translator(mut self, translator: impl PostAggregationTranslator + 'static) -> Self {
        self.post_aggregation_translator = Arc::new(translator);
        self
    }

    pub fn with_time_converter(mut self, converter: impl TimeGranularityTranslator + 'static) -> Self {
        self.time_converter = Arc::new(converter);
        self
    }

    pub fn with_renderer(mut self, renderer: impl SqlRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// The time converter in use, for callers that need the same buckets.
    pub fn time_converter(&self) -> &dyn TimeGranularityTranslator {
        self.time_converter.as_ref()
    }

    pub fn build_sql_query(&self, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<String> {
        let table = &query.data_source;
        debug!(
            "querying table {} with catalog: {:?}, schema: {:?}, using timestamp column {}",
            table.name, table.catalog, table.schema, table.timestamp_column
        );

        let rel = self.convert_to_rel_node(query, mapper)?;
        self.renderer.render(&rel)
    }

    /// The tree is always `scan -> filter -> aggregate -> project -> filter -> sort`,
    /// with pass-through stages left out.
    pub fn convert_to_rel_node(&self, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<RelNode> {
        let timestamp_column = &query.data_source.timestamp_column;
        let builder = RelBuilder::scan(&query.data_source);

        let where_filter = self.where_filter(&builder, query, mapper)?;
        let builder = builder.filter(vec![where_filter]);

        let group_keys = self.group_by_keys(&builder, query, mapper)?;
        let aggregate_calls = self.aggregate_calls(&builder, query, mapper)?;
        let builder = builder.aggregate(group_keys, aggregate_calls)?;

        let mut projected = builder.fields();
        projected.extend(self.post_aggregations(&builder, query, mapper)?);
        let builder = builder.project(projected)?;

        let having = self.having_filter(&builder, query, mapper)?;
        let builder = builder.filter(having);

        let bucket_count = self.time_converter.bucket_count(query.granularity);
        let sorts = SortKeyResolver::resolve(&builder, query, mapper, bucket_count)?;
        debug!("resolved {} sort keys for {} over {}", sorts.len(), query.query_type, timestamp_column);

        Ok(builder.sort_limit(Offset::None, Self::get_limit(query), sorts).build())
    }

    /// Time range, and-ed with the query filter when there is one.
    fn where_filter(&self, builder: &RelBuilder, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<RexNode> {
        let time_filter =
            self.time_converter
                .time_filter(builder, &query.intervals, &query.data_source.timestamp_column)?;

        match &query.filter {
            Some(filter) => {
                let filter = self.filter_translator.translate_filter(builder, filter, mapper)?;
                Ok(builder.and(vec![time_filter, filter]))
            }
            None => Ok(time_filter),
        }
    }

    /// Time buckets first, then dimensions in declared order.
    fn group_by_keys(&self, builder: &RelBuilder, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<Vec<RexNode>> {
        let mut keys =
            self.time_converter
                .group_by_buckets(builder, query.granularity, &query.data_source.timestamp_column)?;
        for dimension in &query.dimensions {
            keys.push(builder.field(&mapper.apply(&dimension.api_name))?);
        }
        Ok(keys)
    }

    fn aggregate_calls(
        &self,
        builder: &RelBuilder,
        query: &AnalyticQuery,
        mapper: &dyn FieldNameMapper,
    ) -> Result<Vec<AggregateCall>> {
        let mut calls = Vec::with_capacity(query.aggregations.len());
        for aggregation in &query.aggregations {
            let unresolved = || {
                debug!("couldn't build sql aggregation with {}", aggregation);
                ConversionError::AggregationResolution(aggregation.to_string())
            };

            let descriptor = self
                .aggregation_mapper
                .map_aggregation(aggregation, mapper)
                .ok_or_else(unresolved)?;

            let call = match descriptor.kind {
                AggKind::RowCount => builder.count_star(&descriptor.alias),
                AggKind::Function(func) => {
                    let field_name = descriptor.field_name.as_deref().ok_or_else(unresolved)?;
                    builder.aggregate_call(func, false, &descriptor.alias, vec![builder.field(field_name)?])
                }
            };
            calls.push(call);
        }
        Ok(calls)
    }

    fn post_aggregations(
        &self,
        builder: &RelBuilder,
        query: &AnalyticQuery,
        mapper: &dyn FieldNameMapper,
    ) -> Result<Vec<RexNode>> {
        query
            .post_aggregations
            .iter()
            .map(|post_aggregation| {
                self.post_aggregation_translator
                    .translate_post_aggregation(builder, post_aggregation, mapper)
            })
            .collect()
    }

    fn having_filter(&self, builder: &RelBuilder, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<Vec<RexNode>> {
        match (&query.query_type, &query.having) {
            (QueryType::GroupBy, Some(having)) => {
                Ok(vec![self.having_translator.translate_having(builder, having, mapper)?])
            }
            (QueryType::GroupBy, None) | (QueryType::Timeseries, _) | (QueryType::Unsupported(_), _) => Ok(vec![]),
        }
    }

    /// Only groupBy queries carry a row limit.
    pub fn get_limit(query: &AnalyticQuery) -> Limit {
        match query.query_type {
            QueryType::GroupBy => query
                .limit_spec
                .as_ref()
                .and_then(|spec| spec.limit)
                .map_or(Limit::Unlimited, Limit::Rows),
            QueryType::Timeseries | QueryType::Unsupported(_) => Limit::Unlimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planner::{AggFunction, Operator},
        query::{AggregationSpec, Granularity, HavingExpr, LimitSpec},
        table::{IdentityFieldNameMapper, PhysicalTableRef},
    };

    fn table() -> PhysicalTableRef {
        PhysicalTableRef::new("events", "ts")
    }

    #[test]
    fn limit_only_for_group_by() {
        let group_by = AnalyticQuery::group_by(table(), Granularity::All)
            .with_limit_spec(LimitSpec::new(Some(10), vec![]));
        assert_eq!(QueryAssembler::get_limit(&group_by), Limit::Rows(10));

        let no_limit = AnalyticQuery::group_by(table(), Granularity::All)
            .with_limit_spec(LimitSpec::new(None, vec![]));
        assert_eq!(QueryAssembler::get_limit(&no_limit), Limit::Unlimited);
        assert_eq!(QueryAssembler::get_limit(&AnalyticQuery::group_by(table(), Granularity::All)), Limit::Unlimited);

        let mut timeseries = AnalyticQuery::timeseries(table(), Granularity::All);
        timeseries.limit_spec = Some(LimitSpec::new(Some(10), vec![]));
        assert_eq!(QueryAssembler::get_limit(&timeseries), Limit::Unlimited);
    }

    #[test]
    fn group_keys_are_buckets_then_dimensions() {
        let query = AnalyticQuery::group_by(table(), Granularity::Hour).with_dimensions(&["country", "city"]);
        let assembler = QueryAssembler::new();
        let builder = RelBuilder::scan(&query.data_source);
        let keys = assembler.group_by_keys(&builder, &query, &IdentityFieldNameMapper).unwrap();

        assert_eq!(keys.len(), 3 + 2);
        assert!(matches!(keys[0], RexNode::Call { op: Operator::DatePart(_), .. }));
        assert!(matches!(keys[2], RexNode::Call { op: Operator::DatePart(_), .. }));
        assert_eq!(keys[3], RexNode::FieldRef { name: "country".into() });
        assert_eq!(keys[4], RexNode::FieldRef { name: "city".into() });
    }

    #[test]
    fn row_count_and_function_calls() {
        let query = AnalyticQuery::timeseries(table(), Granularity::All)
            .with_aggregation(AggregationSpec::count("rows"))
            .with_aggregation(AggregationSpec::new("longMax", "delta", "max_delta"));
        let assembler = QueryAssembler::new();
        let builder = RelBuilder::scan(&query.data_source);
        let calls = assembler.aggregate_calls(&builder, &query, &IdentityFieldNameMapper).unwrap();

        assert!(calls[0].is_count_star());
        assert_eq!(calls[0].alias, "rows");
        assert_eq!(calls[1].func, AggFunction::Max);
        assert_eq!(calls[1].alias, "max_delta");
        assert_eq!(calls[1].operands, vec![RexNode::FieldRef { name: "delta".into() }]);
    }

    #[test]
    fn unresolved_aggregation_aborts() {
        let query = AnalyticQuery::timeseries(table(), Granularity::All)
            .with_aggregation(AggregationSpec::count("rows"))
            .with_aggregation(AggregationSpec::new("hyperUnique", "users", "uniques"));
        match QueryAssembler::new().convert_to_rel_node(&query, &IdentityFieldNameMapper) {
            Err(ConversionError::AggregationResolution(spec)) => assert_eq!(spec, "hyperUnique(users) as uniques"),
            other => panic!("expected AggregationResolution, got {other:?}"),
        }
    }

    #[test]
    fn aggregation_named_like_a_dimension_is_rejected() {
        let query = AnalyticQuery::group_by(table(), Granularity::All)
            .with_dimensions(&["added"])
            .with_aggregation(AggregationSpec::new("longSum", "added", "added"));
        match QueryAssembler::new().convert_to_rel_node(&query, &IdentityFieldNameMapper) {
            Err(ConversionError::DuplicateOutputName(name)) => assert_eq!(name, "added"),
            other => panic!("expected DuplicateOutputName, got {other:?}"),
        }
    }

    #[test]
    fn exposes_the_time_converter() {
        let assembler = QueryAssembler::new();
        assert_eq!(assembler.time_converter().bucket_count(Granularity::Day), 2);
        assert_eq!(assembler.time_converter().bucket_count(Granularity::All), 0);
    }

    #[test]
    fn shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryAssembler>();
        assert_send_sync::<crate::converter::SqlConverter>();

        let assembler = std::sync::Arc::new(QueryAssembler::new());
        let query = AnalyticQuery::timeseries(table(), Granularity::Day).with_aggregation(AggregationSpec::count("rows"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let assembler = assembler.clone();
                let query = query.clone();
                std::thread::spawn(move || assembler.build_sql_query(&query, &IdentityFieldNameMapper).unwrap())
            })
            .collect();
        let sqls: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(sqls.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn timeseries_never_gets_a_having_filter() {
        let mut query = AnalyticQuery::timeseries(table(), Granularity::All).with_aggregation(AggregationSpec::count("rows"));
        query.having = Some(HavingExpr::greater_than("rows", 1));
        let rel = QueryAssembler::new().convert_to_rel_node(&query, &IdentityFieldNameMapper).unwrap();

        // sort(project(aggregate(scan)))
        let project = rel.input().unwrap();
        assert!(matches!(project, RelNode::Project { .. }));
        assert!(matches!(project.input(), Some(RelNode::Aggregate { .. })));
    }
}
