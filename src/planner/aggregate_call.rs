use std::fmt;

use crate::planner::RexNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl fmt::Display for AggFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunction::Count => write!(f, "COUNT"),
            AggFunction::Sum => write!(f, "SUM"),
            AggFunction::Min => write!(f, "MIN"),
            AggFunction::Max => write!(f, "MAX"),
            AggFunction::Avg => write!(f, "AVG"),
        }
    }
}

/// One aggregate output of an `Aggregate` node.
///
/// `COUNT` with no operands counts rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateCall {
    pub func: AggFunction,
    pub operands: Vec<RexNode>,
    pub distinct: bool,
    pub alias: String,
}

impl AggregateCall {
    pub fn count_star(alias: &str) -> Self {
        Self {
            func: AggFunction::Count,
            operands: vec![],
            distinct: false,
            alias: alias.to_string(),
        }
    }

    pub fn new(func: AggFunction, distinct: bool, alias: &str, operands: Vec<RexNode>) -> Self {
        Self { func, operands, distinct, alias: alias.to_string() }
    }

    pub fn is_count_star(&self) -> bool {
        self.func == AggFunction::Count && self.operands.is_empty()
    }
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = if self.is_count_star() {
            "*".to_string()
        } else {
            self.operands.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(", ")
        };
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        write!(f, "{}({}{}) AS {}", self.func, distinct, args, self.alias)
    }
}
