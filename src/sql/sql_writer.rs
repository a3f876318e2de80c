use crate::{
    error::{ConversionError, Result},
    planner::{AggFunction, Direction, Literal, NullOrdering, Operator},
    sql::{OrderItem, RenderConfig, Select, SelectItem, SqlDialect, SqlExpr},
};

// MySQL has no OFFSET without LIMIT; this is its documented "all rows" value.
const MYSQL_NO_LIMIT: &str = "18446744073709551615";

/// Prints a [`Select`] as SQL text for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlWriter {
    dialect: SqlDialect,
    pretty: bool,
}

impl SqlWriter {
    pub fn new(config: RenderConfig) -> Self {
        Self { dialect: config.dialect, pretty: config.pretty }
    }

    pub fn write_select(&self, select: &Select) -> Result<String> {
        if select.items.is_empty() {
            return Err(ConversionError::Render("select list is empty".into()));
        }

        let mut clauses = vec![];
        let items = select
            .items
            .iter()
            .map(|item| self.write_select_item(item))
            .collect::<Result<Vec<_>>>()?;
        clauses.push(format!("SELECT {}", items.join(", ")));

        if !select.from.is_empty() {
            let table = select
                .from
                .iter()
                .map(|part| self.dialect.quote_identifier(part))
                .collect::<Vec<_>>()
                .join(".");
            clauses.push(format!("FROM {}", table));
        }
        if let Some(selection) = &select.selection {
            clauses.push(format!("WHERE {}", self.write_expr(selection)?));
        }
        if !select.group_by.is_empty() {
            let keys = select
                .group_by
                .iter()
                .map(|key| self.write_expr(key))
                .collect::<Result<Vec<_>>>()?;
            clauses.push(format!("GROUP BY {}", keys.join(", ")));
        }
        if let Some(having) = &select.having {
            clauses.push(format!("HAVING {}", self.write_expr(having)?));
        }
        if !select.order_by.is_empty() {
            let mut keys = vec![];
            for item in &select.order_by {
                keys.extend(self.write_order_item(item)?);
            }
            clauses.push(format!("ORDER BY {}", keys.join(", ")));
        }
        match (select.limit, select.offset) {
            (Some(limit), None) => clauses.push(format!("LIMIT {}", limit)),
            (Some(limit), Some(offset)) => clauses.push(format!("LIMIT {} OFFSET {}", limit, offset)),
            (None, Some(offset)) if self.dialect == SqlDialect::MySql => {
                clauses.push(format!("LIMIT {} OFFSET {}", MYSQL_NO_LIMIT, offset))
            }
            (None, Some(offset)) => clauses.push(format!("OFFSET {}", offset)),
            (None, None) => {}
        }

        Ok(clauses.join(if self.pretty { "\n" } else { " " }))
    }

    fn write_select_item(&self, item: &SelectItem) -> Result<String> {
        let expr = self.write_expr(&item.expr)?;
        Ok(match &item.alias {
            Some(alias) => format!("{} AS {}", expr, self.dialect.quote_identifier(alias)),
            None => expr,
        })
    }

    fn write_order_item(&self, item: &OrderItem) -> Result<Vec<String>> {
        let expr = self.write_expr(&item.expr)?;
        let desc = item.direction == Direction::Desc;
        let keyed = if desc { format!("{} DESC", expr) } else { expr.clone() };

        if self.dialect.supports_null_ordering() {
            return Ok(vec![match item.nulls {
                Some(NullOrdering::First) => format!("{} NULLS FIRST", keyed),
                Some(NullOrdering::Last) => format!("{} NULLS LAST", keyed),
                None => keyed,
            }]);
        }

        // Nulls sort low here: first when ascending, last when descending.
        Ok(match (item.nulls, desc) {
            (Some(NullOrdering::First), true) => vec![format!("{} IS NULL DESC", expr), keyed],
            (Some(NullOrdering::Last), false) => vec![format!("{} IS NULL", expr), keyed],
            _ => vec![keyed],
        })
    }

    pub fn write_expr(&self, expr: &SqlExpr) -> Result<String> {
        match expr {
            SqlExpr::Identifier(name) => Ok(self.dialect.quote_identifier(name)),
            SqlExpr::Literal(literal) => Ok(self.write_literal(literal)),
            SqlExpr::Aggregate { func, distinct, operands } => {
                if operands.is_empty() {
                    if *func != AggFunction::Count {
                        return Err(ConversionError::Render(format!("{} needs an operand", func)));
                    }
                    return Ok("COUNT(*)".to_string());
                }
                let args = operands.iter().map(|o| self.write_expr(o)).collect::<Result<Vec<_>>>()?;
                let distinct = if *distinct { "DISTINCT " } else { "" };
                Ok(format!("{}({}{})", func, distinct, args.join(", ")))
            }
            SqlExpr::Call { op, operands } => self.write_call(*op, operands),
        }
    }

    fn write_call(&self, op: Operator, operands: &[SqlExpr]) -> Result<String> {
        let arity = |n: usize| -> Result<()> {
            if operands.len() != n {
                return Err(ConversionError::Render(format!(
                    "{} expects {} operands, got {}",
                    op,
                    n,
                    operands.len()
                )));
            }
            Ok(())
        };

        match op {
            Operator::And | Operator::Or => {
                if operands.is_empty() {
                    return Ok(self.write_literal(&Literal::Bool(op == Operator::And)));
                }
                let parts = operands.iter().map(|o| self.write_operand(op, o)).collect::<Result<Vec<_>>>()?;
                Ok(parts.join(format!(" {} ", op).as_str()))
            }
            Operator::Not => {
                arity(1)?;
                Ok(format!("NOT {}", self.write_operand(op, &operands[0])?))
            }
            Operator::IsNull => {
                arity(1)?;
                Ok(format!("{} IS NULL", self.write_operand(op, &operands[0])?))
            }
            Operator::In => {
                if operands.len() < 2 {
                    return Err(ConversionError::Render("IN needs a value list".into()));
                }
                let column = self.write_operand(op, &operands[0])?;
                let values = operands[1..].iter().map(|o| self.write_expr(o)).collect::<Result<Vec<_>>>()?;
                Ok(format!("{} IN ({})", column, values.join(", ")))
            }
            Operator::RegexpLike => {
                arity(2)?;
                let operand = self.write_operand(op, &operands[0])?;
                let pattern = self.write_operand(op, &operands[1])?;
                Ok(self.dialect.regexp_like(&operand, &pattern))
            }
            Operator::Lower => {
                arity(1)?;
                Ok(format!("LOWER({})", self.write_expr(&operands[0])?))
            }
            Operator::DatePart(unit) => {
                arity(1)?;
                Ok(self.dialect.date_part(unit, &self.write_expr(&operands[0])?))
            }
            Operator::Plus | Operator::Minus | Operator::Times | Operator::Divide => {
                if operands.len() < 2 {
                    return Err(ConversionError::Render(format!("{} needs at least two operands", op)));
                }
                let parts = operands.iter().map(|o| self.write_operand(op, o)).collect::<Result<Vec<_>>>()?;
                Ok(parts.join(format!(" {} ", op).as_str()))
            }
            Operator::Like => {
                // Optional third operand is the escape character.
                if !(2..=3).contains(&operands.len()) {
                    return Err(ConversionError::Render(format!("LIKE expects 2 or 3 operands, got {}", operands.len())));
                }
                let mut text = format!(
                    "{} LIKE {}",
                    self.write_operand(op, &operands[0])?,
                    self.write_operand(op, &operands[1])?
                );
                if let Some(escape) = operands.get(2) {
                    text.push_str(&format!(" ESCAPE {}", self.write_expr(escape)?));
                }
                Ok(text)
            }
            Operator::Eq | Operator::NotEq | Operator::Lt | Operator::LtEq | Operator::Gt | Operator::GtEq => {
                arity(2)?;
                Ok(format!(
                    "{} {} {}",
                    self.write_operand(op, &operands[0])?,
                    op,
                    self.write_operand(op, &operands[1])?
                ))
            }
        }
    }

    fn write_operand(&self, parent: Operator, operand: &SqlExpr) -> Result<String> {
        let text = self.write_expr(operand)?;
        Ok(if needs_parens(parent, operand) { format!("({})", text) } else { text })
    }

    fn write_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => self.dialect.quote_string(s),
            Literal::Int(i) => i.to_string(),
            Literal::Float(n) => n.into_inner().to_string(),
            Literal::Bool(true) => "TRUE".to_string(),
            Literal::Bool(false) => "FALSE".to_string(),
            Literal::Timestamp(ts) => format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S")),
            Literal::Null => "NULL".to_string(),
        }
    }
}

fn needs_parens(parent: Operator, operand: &SqlExpr) -> bool {
    let child = match operand {
        SqlExpr::Call { op, .. } => *op,
        _ => return false,
    };
    if matches!(child, Operator::Lower | Operator::DatePart(_)) {
        return false;
    }
    match parent {
        Operator::Not => true,
        Operator::And | Operator::Or => matches!(child, Operator::And | Operator::Or) && child != parent,
        p if p.is_arithmetic() => child.is_arithmetic(),
        _ => matches!(child, Operator::And | Operator::Or | Operator::Not) || !child.is_arithmetic(),
    }
}
