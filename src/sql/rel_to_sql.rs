use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::{
    error::{ConversionError, Result},
    planner::{Limit, Offset, Operator, RelNode, RexNode},
    sql::{OrderItem, RenderConfig, Select, SelectItem, SqlExpr, SqlRenderer, SqlWriter},
};

/// Renders a `Scan -> Filter -> Aggregate -> Project -> Filter -> Sort`
/// tree (any stage but the scan optional) as a single SELECT.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelToSql {
    config: RenderConfig,
}

// Select being assembled while walking up from the scan.
struct Frame {
    select: Select,
    /// Output fields of the last visited node; `None` directly over the scan.
    fields: Option<IndexMap<String, SqlExpr>>,
    /// Names among `fields` that the builder generated.
    generated: IndexSet<String>,
    grouped: bool,
    projected: bool,
    sorted: bool,
}

impl Frame {
    fn resolve(&self, rex: &RexNode) -> Result<SqlExpr> {
        match rex {
            RexNode::FieldRef { name } => match &self.fields {
                None => Ok(SqlExpr::identifier(name)),
                Some(fields) => fields.get(name).cloned().ok_or_else(|| {
                    ConversionError::Render(format!(
                        "field {} is not produced by the input; fields are {:?}",
                        name,
                        fields.keys().collect::<Vec<_>>()
                    ))
                }),
            },
            RexNode::TableColumn { name } => Ok(SqlExpr::identifier(name)),
            RexNode::Literal(literal) => Ok(SqlExpr::Literal(literal.clone())),
            RexNode::Call { op, operands } => Ok(SqlExpr::Call {
                op: *op,
                operands: operands.iter().map(|o| self.resolve(o)).collect::<Result<Vec<_>>>()?,
            }),
            RexNode::Alias { expr, .. } => self.resolve(expr),
        }
    }

    /// Named outputs are ordered by alias, generated outputs by their expression.
    fn resolve_order(&self, rex: &RexNode) -> Result<SqlExpr> {
        if let (RexNode::FieldRef { name }, Some(fields)) = (rex, &self.fields) {
            if fields.contains_key(name) && !self.generated.contains(name) {
                return Ok(SqlExpr::identifier(name));
            }
        }
        self.resolve(rex)
    }

    fn set_fields(&mut self, names: &[String], generated: &[bool], exprs: Vec<SqlExpr>) -> Result<()> {
        if names.len() != exprs.len() || names.len() != generated.len() {
            return Err(ConversionError::Render(format!(
                "{} field names ({} flagged) for {} expressions",
                names.len(),
                generated.len(),
                exprs.len()
            )));
        }
        self.select.items = names
            .iter()
            .zip(generated)
            .zip(&exprs)
            .map(|((name, generated), expr)| SelectItem {
                expr: expr.clone(),
                alias: (!generated && !expr.is_identifier(name)).then(|| name.clone()),
            })
            .collect();
        self.generated = names
            .iter()
            .zip(generated)
            .filter(|(_, generated)| **generated)
            .map(|(name, _)| name.clone())
            .collect();
        self.fields = Some(names.iter().cloned().zip(exprs).collect());
        Ok(())
    }
}

fn conjoin(existing: Option<SqlExpr>, condition: SqlExpr) -> SqlExpr {
    match existing {
        None => condition,
        Some(existing) => SqlExpr::Call {
            op: Operator::And,
            operands: vec![existing, condition],
        },
    }
}

fn unsupported(shape: &str) -> ConversionError {
    ConversionError::Render(format!("{} cannot be expressed in a single select", shape))
}

impl RelToSql {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    pub fn to_select(&self, rel: &RelNode) -> Result<Select> {
        Ok(self.visit(rel)?.select)
    }

    fn visit(&self, rel: &RelNode) -> Result<Frame> {
        match rel {
            RelNode::Scan { table } => Ok(Frame {
                select: Select {
                    from: table.qualified_name().into_iter().map(String::from).collect(),
                    ..Default::default()
                },
                fields: None,
                generated: IndexSet::new(),
                grouped: false,
                projected: false,
                sorted: false,
            }),
            RelNode::Filter { input, condition } => {
                let mut frame = self.visit(input)?;
                if frame.sorted {
                    return Err(unsupported("filter over a sort"));
                }
                let condition = frame.resolve(condition)?;
                if frame.grouped {
                    frame.select.having = Some(conjoin(frame.select.having.take(), condition));
                } else {
                    frame.select.selection = Some(conjoin(frame.select.selection.take(), condition));
                }
                Ok(frame)
            }
            RelNode::Aggregate { input, group_keys, aggs, field_names, generated } => {
                let mut frame = self.visit(input)?;
                if frame.grouped || frame.projected || frame.sorted {
                    return Err(unsupported("aggregate over a derived row"));
                }
                let keys = group_keys.iter().map(|k| frame.resolve(k)).collect::<Result<Vec<_>>>()?;
                let mut outputs = keys.clone();
                for agg in aggs {
                    outputs.push(SqlExpr::Aggregate {
                        func: agg.func,
                        distinct: agg.distinct,
                        operands: agg.operands.iter().map(|o| frame.resolve(o)).collect::<Result<Vec<_>>>()?,
                    });
                }
                frame.set_fields(field_names, generated, outputs)?;
                frame.select.group_by = keys;
                frame.grouped = true;
                Ok(frame)
            }
            RelNode::Project { input, exprs, field_names, generated } => {
                let mut frame = self.visit(input)?;
                if frame.projected || frame.sorted {
                    return Err(unsupported("projection over a projection"));
                }
                let outputs = exprs.iter().map(|e| frame.resolve(e)).collect::<Result<Vec<_>>>()?;
                frame.set_fields(field_names, generated, outputs)?;
                frame.projected = true;
                Ok(frame)
            }
            RelNode::Sort { input, keys, offset, limit } => {
                let mut frame = self.visit(input)?;
                if frame.sorted {
                    return Err(unsupported("sort over a sort"));
                }
                frame.select.order_by = keys
                    .iter()
                    .map(|key| {
                        Ok(OrderItem {
                            expr: frame.resolve_order(&key.expr)?,
                            direction: key.direction,
                            nulls: key.nulls,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                frame.select.limit = match limit {
                    Limit::Unlimited => None,
                    Limit::Rows(n) => Some(*n),
                };
                frame.select.offset = match offset {
                    Offset::None => None,
                    Offset::Rows(n) => Some(*n),
                };
                frame.sorted = true;
                Ok(frame)
            }
        }
    }
}

impl SqlRenderer for RelToSql {
    fn render(&self, rel: &RelNode) -> Result<String> {
        trace!("rendering plan:\n{}", rel);
        let select = self.to_select(rel)?;
        SqlWriter::new(self.config).write_select(&select)
    }
}
