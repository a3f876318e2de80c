use std::fmt;

use crate::planner::RexNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullOrdering {
    First,
    Last,
}

/// One ORDER BY key. `nulls: None` leaves null placement to the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub expr: RexNode,
    pub direction: Direction,
    pub nulls: Option<NullOrdering>,
}

impl SortKey {
    pub fn asc(expr: RexNode) -> Self {
        Self { expr, direction: Direction::Asc, nulls: None }
    }

    pub fn desc(expr: RexNode) -> Self {
        Self { expr, direction: Direction::Desc, nulls: None }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrdering::First);
        self
    }
}

impl From<RexNode> for SortKey {
    fn from(expr: RexNode) -> Self {
        SortKey::asc(expr)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.direction == Direction::Desc {
            write!(f, " DESC")?;
        }
        match self.nulls {
            Some(NullOrdering::First) => write!(f, " NULLS FIRST"),
            Some(NullOrdering::Last) => write!(f, " NULLS LAST"),
            None => Ok(()),
        }
    }
}

/// Row limit of a sort node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Limit {
    #[default]
    Unlimited,
    Rows(usize),
}

/// Rows skipped before the limit applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Offset {
    #[default]
    None,
    Rows(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_first_keeps_direction() {
        let key = SortKey::desc(RexNode::FieldRef { name: "rows".into() }).nulls_first();
        assert_eq!(key.direction, Direction::Desc);
        assert_eq!(key.nulls, Some(NullOrdering::First));
        assert_eq!(key.to_string(), "$rows DESC NULLS FIRST");
    }

    #[test]
    fn plain_expressions_sort_ascending() {
        let key: SortKey = RexNode::FieldRef { name: "country".into() }.into();
        assert_eq!(key.direction, Direction::Asc);
        assert_eq!(key.nulls, None);
    }
}
