use std::fmt;

use crate::{
    planner::{AggregateCall, Limit, Offset, RexNode, SortKey},
    table::PhysicalTableRef,
};

/// Relational operator tree produced by [`crate::planner::RelBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum RelNode {
    /// Scan a single physical table.
    Scan {
        table: PhysicalTableRef,
    },

    /// Row filter; WHERE below an aggregate, HAVING above it.
    Filter {
        input: Box<RelNode>,
        condition: RexNode,
    },

    /// Group-by aggregation. Output row: `field_names`, which lists the group
    /// keys in `group_keys` order followed by one field per aggregate call.
    /// `generated[i]` marks names the builder made up rather than took from a
    /// column or an alias.
    Aggregate {
        input: Box<RelNode>,
        group_keys: Vec<RexNode>,
        aggs: Vec<AggregateCall>,
        field_names: Vec<String>,
        generated: Vec<bool>,
    },

    /// Projection; `field_names[i]` names `exprs[i]`.
    Project {
        input: Box<RelNode>,
        exprs: Vec<RexNode>,
        field_names: Vec<String>,
        generated: Vec<bool>,
    },

    /// Ordering plus LIMIT / OFFSET.
    Sort {
        input: Box<RelNode>,
        keys: Vec<SortKey>,
        offset: Offset,
        limit: Limit,
    },
}

impl RelNode {
    pub fn input(&self) -> Option<&RelNode> {
        match self {
            RelNode::Scan { .. } => None,
            RelNode::Filter { input, .. }
            | RelNode::Aggregate { input, .. }
            | RelNode::Project { input, .. }
            | RelNode::Sort { input, .. } => Some(input),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RelNode::Scan { .. } => "Scan",
            RelNode::Filter { .. } => "Filter",
            RelNode::Aggregate { .. } => "Aggregate",
            RelNode::Project { .. } => "Project",
            RelNode::Sort { .. } => "Sort",
        }
    }

    fn explain(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            RelNode::Scan { table } => writeln!(f, "{}Scan(table=[{}])", indent, table)?,
            RelNode::Filter { condition, .. } => writeln!(f, "{}Filter(condition=[{}])", indent, condition)?,
            RelNode::Aggregate { group_keys, aggs, .. } => {
                let keys = group_keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ");
                let calls = aggs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                writeln!(f, "{}Aggregate(group=[{}], aggs=[{}])", indent, keys, calls)?
            }
            RelNode::Project { exprs, field_names, .. } => {
                let items = exprs.iter()
                    .zip(field_names)
                    .map(|(e, n)| format!("{}=[{}]", n, e))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, "{}Project({})", indent, items)?
            }
            RelNode::Sort { keys, offset, limit, .. } => {
                let keys = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ");
                writeln!(f, "{}Sort(sort=[{}], offset=[{:?}], fetch=[{:?}])", indent, keys, offset, limit)?
            }
        }
        match self.input() {
            Some(input) => input.explain(f, depth + 1),
            None => Ok(()),
        }
    }
}

impl fmt::Display for RelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.explain(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_prints_tree_top_down() {
        let plan = RelNode::Filter {
            input: Box::new(RelNode::Scan { table: PhysicalTableRef::new("events", "ts").with_schema("s") }),
            condition: RexNode::boolean(false),
        };
        assert_eq!(plan.to_string(), "Filter(condition=[false])\n  Scan(table=[s.events])\n");
        assert_eq!(plan.kind(), "Filter");
        assert_eq!(plan.input().map(RelNode::kind), Some("Scan"));
    }
}
