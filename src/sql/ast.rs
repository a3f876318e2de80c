use crate::planner::{AggFunction, Direction, Literal, NullOrdering, Operator};

/// Expression as it appears in SQL text, with every field reference resolved
/// to a table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlExpr {
    Identifier(String),
    Literal(Literal),
    Call { op: Operator, operands: Vec<SqlExpr> },
    /// `COUNT(*)` when there are no operands.
    Aggregate { func: AggFunction, distinct: bool, operands: Vec<SqlExpr> },
}

impl SqlExpr {
    pub fn identifier(name: &str) -> Self {
        SqlExpr::Identifier(name.to_string())
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        matches!(self, SqlExpr::Identifier(n) if n == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub expr: SqlExpr,
    pub direction: Direction,
    pub nulls: Option<NullOrdering>,
}

/// A single SELECT statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    pub items: Vec<SelectItem>,
    /// Qualified table name parts, outermost first.
    pub from: Vec<String>,
    pub selection: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
