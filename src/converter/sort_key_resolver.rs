use std::collections::HashSet;

use crate::{
    error::{ConversionError, Result},
    planner::{RelBuilder, SortKey},
    query::{AnalyticQuery, QueryType},
    table::FieldNameMapper,
};

/// Orders the final rows: time first, then explicitly requested columns,
/// then the remaining dimensions. Every key sorts nulls first.
pub struct SortKeyResolver;

impl SortKeyResolver {
    /// `builder` must hold the projected row, where the time buckets sit right
    /// after the dimension fields.
    pub fn resolve(
        builder: &RelBuilder,
        query: &AnalyticQuery,
        mapper: &dyn FieldNameMapper,
        bucket_count: usize,
    ) -> Result<Vec<SortKey>> {
        let mut placed = HashSet::new();
        let mut explicit = vec![];
        if let (QueryType::GroupBy, Some(limit_spec)) = (&query.query_type, &query.limit_spec) {
            for column in &limit_spec.columns {
                let name = mapper.apply(&column.dimension);
                let field = builder.field(&name)?;
                explicit.push(if column.is_descending() { SortKey::desc(field) } else { SortKey::asc(field) });
                placed.insert(name);
            }
        }

        let mut keys = vec![];
        if bucket_count == 0 {
            keys.push(SortKey::asc(builder.table_field(&query.data_source.timestamp_column)));
        }

        let fields = builder.fields();
        let start = query.dimensions.len();
        let end = start + bucket_count;
        let buckets = fields.get(start..end).ok_or(ConversionError::BucketLayout {
            start,
            end,
            available: fields.len(),
        })?;
        keys.extend(buckets.iter().cloned().map(SortKey::asc));

        keys.extend(explicit);

        for dimension in &query.dimensions {
            let name = mapper.apply(&dimension.api_name);
            if placed.insert(name.clone()) {
                keys.push(SortKey::asc(builder.field(&name)?));
            }
        }

        Ok(keys.into_iter().map(|key| builder.nulls_first(key)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planner::{Direction, NullOrdering, Operator, RexNode, TimeUnit},
        query::{AggregationSpec, Granularity, LimitSpec, OrderByColumn, SortDirection},
        table::{IdentityFieldNameMapper, MapFieldNameMapper, PhysicalTableRef},
    };

    fn field(name: &str) -> RexNode {
        RexNode::FieldRef { name: name.into() }
    }

    // Aggregated and projected like the assembler does it.
    fn projected(dimensions: &[&str], buckets: &[TimeUnit]) -> RelBuilder {
        let b = RelBuilder::scan(&PhysicalTableRef::new("events", "ts"));
        let mut keys: Vec<RexNode> = buckets
            .iter()
            .map(|unit| b.call(Operator::DatePart(*unit), vec![b.field("ts").unwrap()]))
            .collect();
        keys.extend(dimensions.iter().map(|d| b.field(d).unwrap()));
        let calls = vec![b.count_star("rows")];
        let b = b.aggregate(keys, calls).unwrap();
        let exprs = b.fields();
        b.project(exprs).unwrap()
    }

    #[test]
    fn all_time_orders_by_raw_timestamp_then_explicit_then_rest() {
        let b = projected(&["colA", "colB"], &[]);
        let query = AnalyticQuery::group_by(PhysicalTableRef::new("events", "ts"), Granularity::All)
            .with_dimensions(&["colA", "colB"])
            .with_aggregation(AggregationSpec::count("rows"))
            .with_limit_spec(LimitSpec::new(None, vec![OrderByColumn::new("colB", SortDirection::Descending)]));

        let keys = SortKeyResolver::resolve(&b, &query, &IdentityFieldNameMapper, 0).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].expr, RexNode::TableColumn { name: "ts".into() });
        assert_eq!(keys[0].direction, Direction::Asc);
        assert_eq!(keys[1].expr, field("colB"));
        assert_eq!(keys[1].direction, Direction::Desc);
        assert_eq!(keys[2].expr, field("colA"));
        assert_eq!(keys[2].direction, Direction::Asc);
        assert!(keys.iter().all(|k| k.nulls == Some(NullOrdering::First)));
    }

    #[test]
    fn buckets_come_from_the_fields_after_the_dimensions() {
        let b = projected(&["country"], &[TimeUnit::Year, TimeUnit::DayOfYear]);
        let query = AnalyticQuery::group_by(PhysicalTableRef::new("events", "ts"), Granularity::Day)
            .with_dimensions(&["country"]);

        let keys = SortKeyResolver::resolve(&b, &query, &IdentityFieldNameMapper, 2).unwrap();
        let exprs: Vec<_> = keys.iter().map(|k| k.expr.clone()).collect();
        assert_eq!(exprs, vec![field("$f1"), field("$f2"), field("country")]);
    }

    #[test]
    fn explicit_columns_are_mapped_and_not_repeated() {
        let b = projected(&["country_iso"], &[]);
        let mapper = MapFieldNameMapper::new().with("country", "country_iso");
        let query = AnalyticQuery::group_by(PhysicalTableRef::new("events", "ts"), Granularity::All)
            .with_dimensions(&["country"])
            .with_limit_spec(LimitSpec::new(Some(5), vec![OrderByColumn::new("country", SortDirection::Ascending)]));

        let keys = SortKeyResolver::resolve(&b, &query, &mapper, 0).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].expr, field("country_iso"));
    }

    #[test]
    fn timeseries_ignores_limit_spec() {
        let b = projected(&[], &[TimeUnit::Year]);
        let query = AnalyticQuery::timeseries(PhysicalTableRef::new("events", "ts"), Granularity::Year)
            .with_limit_spec(LimitSpec::new(None, vec![OrderByColumn::new("rows", SortDirection::Descending)]));

        let keys = SortKeyResolver::resolve(&b, &query, &IdentityFieldNameMapper, 1).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].expr, field("$f0"));
    }

    #[test]
    fn unknown_order_column_fails() {
        let b = projected(&["country"], &[]);
        let query = AnalyticQuery::group_by(PhysicalTableRef::new("events", "ts"), Granularity::All)
            .with_dimensions(&["country"])
            .with_limit_spec(LimitSpec::new(None, vec![OrderByColumn::new("missing", SortDirection::Ascending)]));

        assert!(matches!(
            SortKeyResolver::resolve(&b, &query, &IdentityFieldNameMapper, 0),
            Err(ConversionError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn too_few_fields_for_buckets_fails() {
        let b = projected(&[], &[]);
        let query = AnalyticQuery::timeseries(PhysicalTableRef::new("events", "ts"), Granularity::Day);
        assert!(matches!(
            SortKeyResolver::resolve(&b, &query, &IdentityFieldNameMapper, 2),
            Err(ConversionError::BucketLayout { start: 0, end: 2, available: 1 })
        ));
    }
}
