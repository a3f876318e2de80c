use indexmap::{IndexMap, IndexSet};

use crate::{
    error::{ConversionError, Result},
    planner::{AggFunction, AggregateCall, Limit, Literal, Offset, Operator, RelNode, RexNode, SortKey},
    table::PhysicalTableRef,
};

/// Builds a [`RelNode`] tree one operator at a time.
///
/// Each operator consumes the builder and returns the next one, so a stage
/// can only read the field snapshot of the stage before it. Expression
/// helpers borrow the builder and never change it.
#[derive(Debug, Clone)]
pub struct RelBuilder {
    node: RelNode,
    row: RowType,
}

#[derive(Debug, Clone, PartialEq)]
enum RowType {
    /// Straight off the scan: the table schema is not known, any column resolves.
    Table,
    /// Output names in order, each flagged when the builder generated it.
    Fields(IndexMap<String, bool>),
}

impl RelBuilder {
    pub fn scan(table: &PhysicalTableRef) -> Self {
        Self {
            node: RelNode::Scan { table: table.clone() },
            row: RowType::Table,
        }
    }

    pub fn peek(&self) -> &RelNode {
        &self.node
    }

    // ---- field snapshot ----

    pub fn field(&self, name: &str) -> Result<RexNode> {
        match &self.row {
            RowType::Table => Ok(RexNode::FieldRef { name: name.to_string() }),
            RowType::Fields(names) if names.contains_key(name) => Ok(RexNode::FieldRef { name: name.to_string() }),
            RowType::Fields(names) => Err(ConversionError::FieldNotFound {
                name: name.to_string(),
                available: names.keys().cloned().collect(),
            }),
        }
    }

    /// All fields of the current row, in order. Empty directly over a scan.
    pub fn fields(&self) -> Vec<RexNode> {
        self.field_names()
            .into_iter()
            .map(|name| RexNode::FieldRef { name })
            .collect()
    }

    pub fn field_names(&self) -> Vec<String> {
        match &self.row {
            RowType::Table => vec![],
            RowType::Fields(names) => names.keys().cloned().collect(),
        }
    }

    fn is_generated(&self, name: &str) -> bool {
        match &self.row {
            RowType::Table => false,
            RowType::Fields(names) => names.get(name).copied().unwrap_or(false),
        }
    }

    /// A column of the scanned table, reachable even after it was aggregated away.
    pub fn table_field(&self, name: &str) -> RexNode {
        RexNode::TableColumn { name: name.to_string() }
    }

    // ---- expressions ----

    pub fn literal(&self, literal: Literal) -> RexNode {
        RexNode::Literal(literal)
    }

    pub fn call(&self, op: Operator, operands: Vec<RexNode>) -> RexNode {
        RexNode::call(op, operands)
    }

    /// Conjunction with nested ANDs flattened and TRUE operands dropped.
    pub fn and<I: IntoIterator<Item = RexNode>>(&self, operands: I) -> RexNode {
        Self::flatten(Operator::And, operands, |node| node.is_always_true())
    }

    pub fn or<I: IntoIterator<Item = RexNode>>(&self, operands: I) -> RexNode {
        Self::flatten(Operator::Or, operands, |_| false)
    }

    pub fn not(&self, operand: RexNode) -> RexNode {
        RexNode::call(Operator::Not, vec![operand])
    }

    pub fn alias(&self, expr: RexNode, alias: &str) -> RexNode {
        RexNode::Alias { expr: Box::new(expr), alias: alias.to_string() }
    }

    pub fn desc(&self, expr: RexNode) -> SortKey {
        SortKey::desc(expr)
    }

    pub fn nulls_first(&self, key: impl Into<SortKey>) -> SortKey {
        key.into().nulls_first()
    }

    pub fn count_star(&self, alias: &str) -> AggregateCall {
        AggregateCall::count_star(alias)
    }

    pub fn aggregate_call(&self, func: AggFunction, distinct: bool, alias: &str, operands: Vec<RexNode>) -> AggregateCall {
        AggregateCall::new(func, distinct, alias, operands)
    }

    fn flatten<I, F>(op: Operator, operands: I, skip: F) -> RexNode
    where
        I: IntoIterator<Item = RexNode>,
        F: Fn(&RexNode) -> bool,
    {
        let mut flat = vec![];
        for operand in operands {
            match operand {
                RexNode::Call { op: inner, operands } if inner == op => flat.extend(operands),
                other if skip(&other) => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => RexNode::boolean(op == Operator::And),
            1 => flat.remove(0),
            _ => RexNode::call(op, flat),
        }
    }

    // ---- operators ----

    /// Filters on the conjunction of `predicates`; no predicates (or only TRUE) adds nothing.
    pub fn filter<I: IntoIterator<Item = RexNode>>(self, predicates: I) -> Self {
        let condition = self.and(predicates);
        if condition.is_always_true() {
            return self;
        }
        Self {
            node: RelNode::Filter { input: Box::new(self.node), condition },
            row: self.row,
        }
    }

    /// Groups by `group_keys` and computes `aggs`.
    ///
    /// Output layout: keys that are plain column references come first, then
    /// computed keys (named `$f<position>`), then one field per aggregate call.
    /// Duplicate keys are collapsed. Aggregate aliases are kept verbatim; one
    /// that repeats an earlier output name is a [`ConversionError::DuplicateOutputName`].
    pub fn aggregate(self, group_keys: Vec<RexNode>, aggs: Vec<AggregateCall>) -> Result<Self> {
        let (refs, computed): (Vec<RexNode>, Vec<RexNode>) = group_keys
            .into_iter()
            .partition(|key| matches!(key, RexNode::FieldRef { .. } | RexNode::TableColumn { .. }));

        let mut keys: Vec<RexNode> = vec![];
        for key in refs.into_iter().chain(computed) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut slots = vec![];
        for (i, key) in keys.iter().enumerate() {
            slots.push(match key {
                RexNode::FieldRef { name } | RexNode::TableColumn { name } => OutputName::Column(name.clone(), false),
                _ => OutputName::Generated(i),
            });
        }
        slots.extend(aggs.iter().map(|agg| OutputName::Alias(agg.alias.clone())));
        let names = name_outputs(slots)?;

        Ok(Self {
            node: RelNode::Aggregate {
                input: Box::new(self.node),
                group_keys: keys,
                aggs,
                field_names: names.keys().cloned().collect(),
                generated: names.values().copied().collect(),
            },
            row: RowType::Fields(names),
        })
    }

    /// Projects `exprs`. Aliased expressions keep their alias, which must not
    /// repeat another output name.
    pub fn project(self, exprs: Vec<RexNode>) -> Result<Self> {
        let slots = exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| match expr {
                RexNode::FieldRef { name } => OutputName::Column(name.clone(), self.is_generated(name)),
                RexNode::TableColumn { name } => OutputName::Column(name.clone(), false),
                RexNode::Alias { alias, .. } => OutputName::Alias(alias.clone()),
                _ => OutputName::Generated(i),
            })
            .collect();
        let names = name_outputs(slots)?;

        Ok(Self {
            node: RelNode::Project {
                input: Box::new(self.node),
                exprs,
                field_names: names.keys().cloned().collect(),
                generated: names.values().copied().collect(),
            },
            row: RowType::Fields(names),
        })
    }

    /// Sorts by `keys` and applies offset / limit; adds nothing when all three are empty.
    pub fn sort_limit(self, offset: Offset, limit: Limit, keys: Vec<SortKey>) -> Self {
        if keys.is_empty() && offset == Offset::None && limit == Limit::Unlimited {
            return self;
        }
        Self {
            node: RelNode::Sort { input: Box::new(self.node), keys, offset, limit },
            row: self.row,
        }
    }

    pub fn build(self) -> RelNode {
        self.node
    }
}

// How one output field gets its name.
enum OutputName {
    /// Named after the column it reads; renamed on a clash. The flag carries
    /// over whether that column's own name was generated.
    Column(String, bool),
    /// Caller-chosen; a clash is an error.
    Alias(String),
    /// `$f<position>`, renamed on a clash.
    Generated(usize),
}

// Columns claim their names first, then aliases, then generated names, so a
// generated name never displaces a caller's alias. Order follows `slots`.
fn name_outputs(slots: Vec<OutputName>) -> Result<IndexMap<String, bool>> {
    let mut taken = IndexSet::new();
    let mut named: Vec<Option<(String, bool)>> = slots.iter().map(|_| None).collect();

    for (i, slot) in slots.iter().enumerate() {
        if let OutputName::Column(name, generated) = slot {
            named[i] = Some((insert_unique(&mut taken, name.clone()), *generated));
        }
    }
    for (i, slot) in slots.iter().enumerate() {
        if let OutputName::Alias(alias) = slot {
            if !taken.insert(alias.clone()) {
                return Err(ConversionError::DuplicateOutputName(alias.clone()));
            }
            named[i] = Some((alias.clone(), false));
        }
    }
    for (i, slot) in slots.iter().enumerate() {
        if let OutputName::Generated(position) = slot {
            named[i] = Some((insert_unique(&mut taken, format!("$f{}", position)), true));
        }
    }

    Ok(named.into_iter().flatten().collect())
}

// Field names stay unique: `name`, then `name0`, `name1`, ...
fn insert_unique(names: &mut IndexSet<String>, base: String) -> String {
    if !names.contains(&base) {
        names.insert(base.clone());
        return base;
    }
    let mut k = 0usize;
    loop {
        let candidate = format!("{}{}", base, k);
        if !names.contains(&candidate) {
            names.insert(candidate.clone());
            return candidate;
        }
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::TimeUnit;

    fn table() -> PhysicalTableRef {
        PhysicalTableRef::new("events", "ts")
    }

    fn col(name: &str) -> RexNode {
        RexNode::FieldRef { name: name.into() }
    }

    fn year(builder: &RelBuilder) -> RexNode {
        builder.call(Operator::DatePart(TimeUnit::Year), vec![builder.field("ts").unwrap()])
    }

    #[test]
    fn scan_resolves_any_field() {
        let builder = RelBuilder::scan(&table());
        assert_eq!(builder.field("anything").unwrap(), col("anything"));
        assert!(builder.fields().is_empty());
    }

    #[test]
    fn and_flattens_and_drops_true() {
        let builder = RelBuilder::scan(&table());
        let nested = builder.and(vec![col("a"), col("b")]);
        let flat = builder.and(vec![RexNode::boolean(true), nested, col("c")]);
        assert_eq!(flat, RexNode::call(Operator::And, vec![col("a"), col("b"), col("c")]));

        assert_eq!(builder.and(vec![col("a")]), col("a"));
        assert!(builder.and(Vec::new()).is_always_true());
        assert_eq!(builder.or(Vec::new()), RexNode::boolean(false));
    }

    #[test]
    fn filter_with_nothing_is_pass_through() {
        let builder = RelBuilder::scan(&table()).filter(Vec::new());
        assert!(matches!(builder.peek(), RelNode::Scan { .. }));

        let builder = builder.filter(vec![RexNode::boolean(true)]);
        assert!(matches!(builder.peek(), RelNode::Scan { .. }));

        let builder = builder.filter(vec![col("a")]);
        assert!(matches!(builder.peek(), RelNode::Filter { .. }));
    }

    #[test]
    fn aggregate_puts_column_keys_before_computed_keys() {
        let builder = RelBuilder::scan(&table());
        let keys = vec![year(&builder), col("country"), col("city")];
        let aggs = vec![builder.count_star("rows")];
        let builder = builder.aggregate(keys, aggs).unwrap();

        assert_eq!(builder.field_names(), vec!["country", "city", "$f2", "rows"]);
        match builder.peek() {
            RelNode::Aggregate { group_keys, .. } => {
                assert_eq!(group_keys[0], col("country"));
                assert!(matches!(group_keys[2], RexNode::Call { op: Operator::DatePart(TimeUnit::Year), .. }));
            }
            other => panic!("expected Aggregate, got {other:?}"),
        }
    }

    #[test]
    fn aggregate_collapses_duplicate_keys() {
        let builder = RelBuilder::scan(&table());
        let aggs = vec![builder.count_star("rows")];
        let builder = builder.aggregate(vec![col("country"), col("country")], aggs).unwrap();

        assert_eq!(builder.field_names(), vec!["country", "rows"]);
        match builder.peek() {
            RelNode::Aggregate { group_keys, aggs, .. } => {
                assert_eq!(group_keys.len(), 1);
                assert_eq!(aggs[0].alias, "rows");
            }
            other => panic!("expected Aggregate, got {other:?}"),
        }
    }

    #[test]
    fn aggregate_alias_clashing_with_a_key_fails() {
        let builder = RelBuilder::scan(&table());
        let aggs = vec![builder.aggregate_call(AggFunction::Sum, false, "added", vec![col("added")])];
        match builder.aggregate(vec![col("added")], aggs) {
            Err(ConversionError::DuplicateOutputName(name)) => assert_eq!(name, "added"),
            other => panic!("expected DuplicateOutputName, got {other:?}"),
        }

        let builder = RelBuilder::scan(&table());
        let aggs = vec![builder.count_star("rows"), builder.count_star("rows")];
        assert!(matches!(builder.aggregate(vec![], aggs), Err(ConversionError::DuplicateOutputName(_))));
    }

    #[test]
    fn generated_names_are_flagged_and_yield_to_aliases() {
        let builder = RelBuilder::scan(&table());
        let keys = vec![year(&builder)];
        let aggs = vec![builder.count_star("$f0"), builder.count_star("$fees")];
        let builder = builder.aggregate(keys, aggs).unwrap();

        assert_eq!(builder.field_names(), vec!["$f00", "$f0", "$fees"]);
        match builder.peek() {
            RelNode::Aggregate { generated, .. } => assert_eq!(generated, &vec![true, false, false]),
            other => panic!("expected Aggregate, got {other:?}"),
        }

        let fields = builder.fields();
        let builder = builder.project(fields).unwrap();
        match builder.peek() {
            RelNode::Project { generated, .. } => assert_eq!(generated, &vec![true, false, false]),
            other => panic!("expected Project, got {other:?}"),
        }
    }

    #[test]
    fn field_lookup_fails_after_aggregation() {
        let builder = RelBuilder::scan(&table());
        let builder = builder.aggregate(vec![col("country")], vec![]).unwrap();
        assert!(builder.field("country").is_ok());
        match builder.field("city") {
            Err(ConversionError::FieldNotFound { name, available }) => {
                assert_eq!(name, "city");
                assert_eq!(available, vec!["country"]);
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
        assert_eq!(builder.table_field("ts"), RexNode::TableColumn { name: "ts".into() });
    }

    #[test]
    fn project_names_fields() {
        let builder = RelBuilder::scan(&table());
        let builder = builder.aggregate(vec![col("country")], vec![AggregateCall::count_star("rows")]).unwrap();
        let ratio = builder.alias(
            builder.call(Operator::Divide, vec![builder.field("rows").unwrap(), RexNode::int(2)]),
            "half",
        );
        let unnamed = builder.call(Operator::Plus, vec![RexNode::int(1), RexNode::int(1)]);
        let mut exprs = builder.fields();
        exprs.push(ratio);
        exprs.push(unnamed);
        let builder = builder.project(exprs).unwrap();

        assert_eq!(builder.field_names(), vec!["country", "rows", "half", "$f3"]);
    }

    #[test]
    fn project_alias_clashing_with_a_field_fails() {
        let builder = RelBuilder::scan(&table());
        let builder = builder.aggregate(vec![col("country")], vec![AggregateCall::count_star("rows")]).unwrap();
        let mut exprs = builder.fields();
        exprs.push(builder.alias(RexNode::int(1), "rows"));
        assert!(matches!(builder.project(exprs), Err(ConversionError::DuplicateOutputName(name)) if name == "rows"));
    }

    #[test]
    fn sort_limit_without_keys_or_limit_adds_nothing() {
        let builder = RelBuilder::scan(&table()).sort_limit(Offset::None, Limit::Unlimited, vec![]);
        assert!(matches!(builder.peek(), RelNode::Scan { .. }));

        let builder = builder.sort_limit(Offset::None, Limit::Rows(5), vec![]);
        assert!(matches!(builder.build(), RelNode::Sort { limit: Limit::Rows(5), .. }));
    }
}
