use crate::{
    error::{ConversionError, Result},
    planner::{Literal, Operator, RelBuilder, RexNode},
    query::{ArithmeticFn, PostAggregationSpec},
    table::FieldNameMapper,
};

pub trait PostAggregationTranslator: Send + Sync {
    /// Builds the expression for a post-aggregation over the aggregated fields,
    /// aliased with the post-aggregation name.
    fn translate_post_aggregation(
        &self,
        builder: &RelBuilder,
        post_aggregation: &PostAggregationSpec,
        mapper: &dyn FieldNameMapper,
    ) -> Result<RexNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPostAggregationTranslator;

impl DefaultPostAggregationTranslator {
    fn operator(func: ArithmeticFn) -> Operator {
        match func {
            ArithmeticFn::Plus => Operator::Plus,
            ArithmeticFn::Minus => Operator::Minus,
            ArithmeticFn::Multiply => Operator::Times,
            ArithmeticFn::Divide => Operator::Divide,
        }
    }

    fn expression(&self, builder: &RelBuilder, spec: &PostAggregationSpec, mapper: &dyn FieldNameMapper) -> Result<RexNode> {
        match spec {
            PostAggregationSpec::Arithmetic { name, func, fields } => {
                let too_few = || {
                    ConversionError::PostAggregationTranslation(format!(
                        "arithmetic post aggregation {} needs at least two fields",
                        name
                    ))
                };
                if fields.len() < 2 {
                    return Err(too_few());
                }
                let op = Self::operator(*func);
                let mut operands = fields
                    .iter()
                    .map(|field| self.expression(builder, field, mapper))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter();
                let first = operands.next().ok_or_else(too_few)?;
                Ok(operands.fold(first, |acc, operand| builder.call(op, vec![acc, operand])))
            }
            PostAggregationSpec::FieldAccess { field_name, .. } => builder
                .field(&mapper.apply(field_name))
                .map_err(|e| ConversionError::PostAggregationTranslation(e.to_string())),
            PostAggregationSpec::Constant { value, .. } => Literal::from_f64(*value)
                .map(|literal| builder.literal(literal))
                .ok_or_else(|| ConversionError::PostAggregationTranslation(format!("{} is not a usable constant", value))),
            PostAggregationSpec::Unsupported => Err(ConversionError::PostAggregationTranslation(
                "unsupported post aggregation type".into(),
            )),
        }
    }
}

impl PostAggregationTranslator for DefaultPostAggregationTranslator {
    fn translate_post_aggregation(
        &self,
        builder: &RelBuilder,
        post_aggregation: &PostAggregationSpec,
        mapper: &dyn FieldNameMapper,
    ) -> Result<RexNode> {
        let expr = self.expression(builder, post_aggregation, mapper)?;
        Ok(match post_aggregation.name() {
            Some(name) => builder.alias(expr, name),
            None => expr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{AggFunction, AggregateCall};
    use crate::table::{IdentityFieldNameMapper, PhysicalTableRef};

    fn aggregated() -> RelBuilder {
        let builder = RelBuilder::scan(&PhysicalTableRef::new("events", "ts"));
        let added = builder.field("added").unwrap();
        let calls = vec![
            AggregateCall::count_star("rows"),
            AggregateCall::new(AggFunction::Sum, false, "added", vec![added]),
        ];
        builder.aggregate(vec![], calls).unwrap()
    }

    fn translate(spec: &PostAggregationSpec) -> Result<RexNode> {
        DefaultPostAggregationTranslator.translate_post_aggregation(&aggregated(), spec, &IdentityFieldNameMapper)
    }

    #[test]
    fn arithmetic_folds_left_and_takes_the_name() {
        let spec = PostAggregationSpec::arithmetic(
            "avg_added",
            ArithmeticFn::Divide,
            vec![
                PostAggregationSpec::field("added"),
                PostAggregationSpec::field("rows"),
                PostAggregationSpec::constant(2.0),
            ],
        );
        assert_eq!(translate(&spec).unwrap().to_string(), "/(/($added, $rows), 2) AS avg_added");
    }

    #[test]
    fn nested_arithmetic_is_not_aliased() {
        let inner = PostAggregationSpec::arithmetic(
            "sum",
            ArithmeticFn::Plus,
            vec![PostAggregationSpec::field("added"), PostAggregationSpec::constant(0.5)],
        );
        let outer = PostAggregationSpec::arithmetic(
            "scaled",
            ArithmeticFn::Multiply,
            vec![inner, PostAggregationSpec::field("rows")],
        );
        assert_eq!(translate(&outer).unwrap().to_string(), "*(+($added, 0.5), $rows) AS scaled");
    }

    #[test]
    fn failures() {
        let single = PostAggregationSpec::arithmetic("x", ArithmeticFn::Plus, vec![PostAggregationSpec::field("rows")]);
        assert!(matches!(translate(&single), Err(ConversionError::PostAggregationTranslation(_))));

        let missing = PostAggregationSpec::arithmetic(
            "x",
            ArithmeticFn::Plus,
            vec![PostAggregationSpec::field("rows"), PostAggregationSpec::field("nope")],
        );
        assert!(matches!(translate(&missing), Err(ConversionError::PostAggregationTranslation(_))));

        assert!(matches!(
            translate(&PostAggregationSpec::Unsupported),
            Err(ConversionError::PostAggregationTranslation(_))
        ));
    }
}
