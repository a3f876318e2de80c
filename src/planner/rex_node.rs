use std::fmt::{self, Display};

use chrono::NaiveDateTime;
use ordered_float::NotNan;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Null,
}

impl Literal {
    /// Integral numbers stay integral so `rows > 5` does not turn into `rows > 5.0`.
    pub fn from_number(number: &serde_json::Number) -> Option<Self> {
        if let Some(i) = number.as_i64() {
            return Some(Literal::Int(i));
        }
        number.as_f64()
            .and_then(|f| NotNan::new(f).ok())
            .map(Literal::Float)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            return Some(Literal::Int(value as i64));
        }
        NotNan::new(value).ok().map(Literal::Float)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Timestamp(_) => write!(f, "Timestamp({})", self),
            Literal::Null => write!(f, "Null"),
        }
    }
}

/// Calendar field extracted from a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Year,
    Quarter,
    Month,
    Week,
    DayOfYear,
    Hour,
    Minute,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    IsNull,
    In,
    Like,
    RegexpLike,
    Lower,
    Plus,
    Minus,
    Times,
    Divide,
    DatePart(TimeUnit),
}

impl Operator {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Operator::Plus | Operator::Minus | Operator::Times | Operator::Divide)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, Operator::Eq | Operator::NotEq | Operator::Lt | Operator::LtEq | Operator::Gt | Operator::GtEq)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
            Operator::Not => write!(f, "NOT"),
            Operator::Eq => write!(f, "="),
            Operator::NotEq => write!(f, "<>"),
            Operator::Lt => write!(f, "<"),
            Operator::LtEq => write!(f, "<="),
            Operator::Gt => write!(f, ">"),
            Operator::GtEq => write!(f, ">="),
            Operator::IsNull => write!(f, "IS NULL"),
            Operator::In => write!(f, "IN"),
            Operator::Like => write!(f, "LIKE"),
            Operator::RegexpLike => write!(f, "REGEXP_LIKE"),
            Operator::Lower => write!(f, "LOWER"),
            Operator::Plus => write!(f, "+"),
            Operator::Minus => write!(f, "-"),
            Operator::Times => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::DatePart(unit) => write!(f, "{:?}", unit),
        }
    }
}

/// Row expression. Field references are by name against the input of the
/// node the expression is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RexNode {
    /// A field of the current input row.
    FieldRef { name: String },
    /// A column of the scanned table, whatever the current row looks like.
    TableColumn { name: String },
    Literal(Literal),
    Call { op: Operator, operands: Vec<RexNode> },
    Alias { expr: Box<RexNode>, alias: String },
}

impl RexNode {
    pub fn call(op: Operator, operands: Vec<RexNode>) -> Self {
        RexNode::Call { op, operands }
    }

    pub fn string(value: &str) -> Self {
        RexNode::Literal(Literal::String(value.to_string()))
    }

    pub fn int(value: i64) -> Self {
        RexNode::Literal(Literal::Int(value))
    }

    pub fn boolean(value: bool) -> Self {
        RexNode::Literal(Literal::Bool(value))
    }

    pub fn timestamp(value: NaiveDateTime) -> Self {
        RexNode::Literal(Literal::Timestamp(value))
    }

    pub fn is_always_true(&self) -> bool {
        matches!(self, RexNode::Literal(Literal::Bool(true)))
    }

    /// The expression under any alias.
    pub fn strip_alias(&self) -> &RexNode {
        match self {
            RexNode::Alias { expr, .. } => expr.strip_alias(),
            other => other,
        }
    }
}

impl Display for RexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RexNode::FieldRef { name } => write!(f, "${}", name),
            RexNode::TableColumn { name } => write!(f, "{}", name),
            RexNode::Literal(l) => write!(f, "{}", l),
            RexNode::Call { op, operands } => {
                let args = operands.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "{}({})", op, args)
            }
            RexNode::Alias { expr, alias } => write!(f, "{} AS {}", expr, alias),
        }
    }
}
