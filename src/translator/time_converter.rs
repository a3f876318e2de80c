use crate::{
    error::Result,
    planner::{Operator, RelBuilder, RexNode, TimeUnit},
    query::{Granularity, Interval},
};

/// Turns the time part of a query into predicates and grouping keys.
pub trait TimeGranularityTranslator: Send + Sync {
    /// Restricts rows to the query intervals (half-open, start inclusive).
    fn time_filter(&self, builder: &RelBuilder, intervals: &[Interval], timestamp_column: &str) -> Result<RexNode>;

    /// Ordered bucket expressions for `granularity`; empty for [`Granularity::All`].
    fn group_by_buckets(&self, builder: &RelBuilder, granularity: Granularity, timestamp_column: &str) -> Result<Vec<RexNode>>;

    fn bucket_count(&self, granularity: Granularity) -> usize;
}

/// Buckets time by extracting calendar fields from the timestamp column.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatePartTimeConverter;

impl DatePartTimeConverter {
    pub fn date_parts(granularity: Granularity) -> &'static [TimeUnit] {
        use TimeUnit::*;
        match granularity {
            Granularity::All => &[],
            Granularity::Second => &[Year, DayOfYear, Hour, Minute, Second],
            Granularity::Minute => &[Year, DayOfYear, Hour, Minute],
            Granularity::Hour => &[Year, DayOfYear, Hour],
            Granularity::Day => &[Year, DayOfYear],
            Granularity::Week => &[Year, Week],
            Granularity::Month => &[Year, Month],
            Granularity::Quarter => &[Year, Quarter],
            Granularity::Year => &[Year],
        }
    }
}

impl TimeGranularityTranslator for DatePartTimeConverter {
    fn time_filter(&self, builder: &RelBuilder, intervals: &[Interval], timestamp_column: &str) -> Result<RexNode> {
        let ts = builder.field(timestamp_column)?;
        let ranges = intervals
            .iter()
            .map(|interval| {
                builder.and(vec![
                    builder.call(Operator::GtEq, vec![ts.clone(), RexNode::timestamp(interval.start)]),
                    builder.call(Operator::Lt, vec![ts.clone(), RexNode::timestamp(interval.end)]),
                ])
            })
            .collect::<Vec<_>>();

        if ranges.is_empty() {
            return Ok(RexNode::boolean(true));
        }
        Ok(builder.or(ranges))
    }

    fn group_by_buckets(&self, builder: &RelBuilder, granularity: Granularity, timestamp_column: &str) -> Result<Vec<RexNode>> {
        let ts = builder.field(timestamp_column)?;
        Ok(Self::date_parts(granularity)
            .iter()
            .map(|unit| builder.call(Operator::DatePart(*unit), vec![ts.clone()]))
            .collect())
    }

    fn bucket_count(&self, granularity: Granularity) -> usize {
        Self::date_parts(granularity).len()
    }
}
