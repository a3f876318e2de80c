use serde_json::Number;

use crate::{
    error::{ConversionError, Result},
    planner::{Literal, Operator, RelBuilder, RexNode},
    query::HavingExpr,
    table::FieldNameMapper,
};

pub trait HavingTranslator: Send + Sync {
    /// Builds the post-aggregation predicate. Names resolve against the projected fields.
    fn translate_having(&self, builder: &RelBuilder, having: &HavingExpr, mapper: &dyn FieldNameMapper) -> Result<RexNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHavingTranslator;

impl DefaultHavingTranslator {
    fn compare(
        builder: &RelBuilder,
        op: Operator,
        aggregation: &str,
        value: &Number,
        mapper: &dyn FieldNameMapper,
    ) -> Result<RexNode> {
        let field = builder
            .field(&mapper.apply(aggregation))
            .map_err(|e| ConversionError::HavingTranslation(e.to_string()))?;
        let literal = Literal::from_number(value)
            .ok_or_else(|| ConversionError::HavingTranslation(format!("{} is not a comparable number", value)))?;
        Ok(builder.call(op, vec![field, builder.literal(literal)]))
    }

    fn all(&self, builder: &RelBuilder, specs: &[HavingExpr], mapper: &dyn FieldNameMapper) -> Result<Vec<RexNode>> {
        if specs.is_empty() {
            return Err(ConversionError::HavingTranslation("boolean having without specs".into()));
        }
        specs
            .iter()
            .map(|spec| self.translate_having(builder, spec, mapper))
            .collect()
    }
}

impl HavingTranslator for DefaultHavingTranslator {
    fn translate_having(&self, builder: &RelBuilder, having: &HavingExpr, mapper: &dyn FieldNameMapper) -> Result<RexNode> {
        match having {
            HavingExpr::EqualTo { aggregation, value } => Self::compare(builder, Operator::Eq, aggregation, value, mapper),
            HavingExpr::GreaterThan { aggregation, value } => Self::compare(builder, Operator::Gt, aggregation, value, mapper),
            HavingExpr::LessThan { aggregation, value } => Self::compare(builder, Operator::Lt, aggregation, value, mapper),
            HavingExpr::And { having_specs } => Ok(builder.and(self.all(builder, having_specs, mapper)?)),
            HavingExpr::Or { having_specs } => Ok(builder.or(self.all(builder, having_specs, mapper)?)),
            HavingExpr::Not { having_spec } => Ok(builder.not(self.translate_having(builder, having_spec, mapper)?)),
            HavingExpr::Unsupported => Err(ConversionError::HavingTranslation("unsupported having type".into())),
        }
    }
}
