use crate::{
    error::{ConversionError, Result},
    planner::{Operator, RelBuilder, RexNode},
    query::{FilterTree, SearchQuerySpec},
    table::FieldNameMapper,
};

const LIKE_ESCAPE: &str = "\\";

// Contains-searches match the value literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push_str(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

pub trait FilterTranslator: Send + Sync {
    /// Builds the row predicate for `filter`. Dimensions resolve against the scan.
    fn translate_filter(&self, builder: &RelBuilder, filter: &FilterTree, mapper: &dyn FieldNameMapper) -> Result<RexNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterTranslator;

impl DefaultFilterTranslator {
    fn dimension(builder: &RelBuilder, dimension: &str, mapper: &dyn FieldNameMapper) -> Result<RexNode> {
        builder
            .field(&mapper.apply(dimension))
            .map_err(|e| ConversionError::FilterTranslation(e.to_string()))
    }

    fn search(builder: &RelBuilder, column: RexNode, dimension: &str, query: &SearchQuerySpec) -> Result<RexNode> {
        let (value, case_sensitive) = match query {
            SearchQuerySpec::Contains { value, case_sensitive } => (value, *case_sensitive),
            SearchQuerySpec::InsensitiveContains { value } => (value, false),
            SearchQuerySpec::Unsupported => {
                return Err(ConversionError::FilterTranslation(format!(
                    "unsupported search query on dimension {}",
                    dimension
                )));
            }
        };

        let (column, value) = if case_sensitive {
            (column, value.clone())
        } else {
            (builder.call(Operator::Lower, vec![column]), value.to_lowercase())
        };
        let pattern = format!("%{}%", escape_like(&value));
        Ok(builder.call(
            Operator::Like,
            vec![column, RexNode::string(&pattern), RexNode::string(LIKE_ESCAPE)],
        ))
    }

    fn bound(
        builder: &RelBuilder,
        column: RexNode,
        dimension: &str,
        (lower, lower_strict): (&Option<String>, bool),
        (upper, upper_strict): (&Option<String>, bool),
    ) -> Result<RexNode> {
        let mut predicates = vec![];
        if let Some(lower) = lower {
            let op = if lower_strict { Operator::Gt } else { Operator::GtEq };
            predicates.push(builder.call(op, vec![column.clone(), RexNode::string(lower)]));
        }
        if let Some(upper) = upper {
            let op = if upper_strict { Operator::Lt } else { Operator::LtEq };
            predicates.push(builder.call(op, vec![column, RexNode::string(upper)]));
        }
        if predicates.is_empty() {
            return Err(ConversionError::FilterTranslation(format!(
                "bound filter on dimension {} has neither lower nor upper bound",
                dimension
            )));
        }
        Ok(builder.and(predicates))
    }

    fn all(&self, builder: &RelBuilder, fields: &[FilterTree], mapper: &dyn FieldNameMapper) -> Result<Vec<RexNode>> {
        fields
            .iter()
            .map(|field| self.translate_filter(builder, field, mapper))
            .collect()
    }
}

impl FilterTranslator for DefaultFilterTranslator {
    fn translate_filter(&self, builder: &RelBuilder, filter: &FilterTree, mapper: &dyn FieldNameMapper) -> Result<RexNode> {
        match filter {
            FilterTree::Selector { dimension, value } => {
                let column = Self::dimension(builder, dimension, mapper)?;
                Ok(match value {
                    Some(value) => builder.call(Operator::Eq, vec![column, RexNode::string(value)]),
                    None => builder.call(Operator::IsNull, vec![column]),
                })
            }
            FilterTree::In { dimension, values } => {
                if values.is_empty() {
                    return Err(ConversionError::FilterTranslation(format!(
                        "in filter on dimension {} has no values",
                        dimension
                    )));
                }
                let mut operands = vec![Self::dimension(builder, dimension, mapper)?];
                operands.extend(values.iter().map(|v| RexNode::string(v)));
                Ok(builder.call(Operator::In, operands))
            }
            FilterTree::Regex { dimension, pattern } => {
                let column = Self::dimension(builder, dimension, mapper)?;
                Ok(builder.call(Operator::RegexpLike, vec![column, RexNode::string(pattern)]))
            }
            FilterTree::Search { dimension, query } => {
                let column = Self::dimension(builder, dimension, mapper)?;
                Self::search(builder, column, dimension, query)
            }
            FilterTree::Bound { dimension, lower, upper, lower_strict, upper_strict } => {
                let column = Self::dimension(builder, dimension, mapper)?;
                Self::bound(builder, column, dimension, (lower, *lower_strict), (upper, *upper_strict))
            }
            FilterTree::And { fields } => {
                if fields.is_empty() {
                    return Err(ConversionError::FilterTranslation("and filter without fields".into()));
                }
                Ok(builder.and(self.all(builder, fields, mapper)?))
            }
            FilterTree::Or { fields } => {
                if fields.is_empty() {
                    return Err(ConversionError::FilterTranslation("or filter without fields".into()));
                }
                Ok(builder.or(self.all(builder, fields, mapper)?))
            }
            FilterTree::Not { field } => Ok(builder.not(self.translate_filter(builder, field, mapper)?)),
            FilterTree::Unsupported => Err(ConversionError::FilterTranslation("unsupported filter type".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{IdentityFieldNameMapper, MapFieldNameMapper, PhysicalTableRef};

    fn builder() -> RelBuilder {
        RelBuilder::scan(&PhysicalTableRef::new("events", "ts"))
    }

    fn translate(filter: &FilterTree) -> Result<RexNode> {
        DefaultFilterTranslator.translate_filter(&builder(), filter, &IdentityFieldNameMapper)
    }

    #[test]
    fn selector_maps_dimension() {
        let mapper = MapFieldNameMapper::new().with("country", "country_iso");
        let rex = DefaultFilterTranslator
            .translate_filter(&builder(), &FilterTree::selector("country", "US"), &mapper)
            .unwrap();
        assert_eq!(rex.to_string(), "=($country_iso, 'US')");
    }

    #[test]
    fn selector_without_value_is_null_check() {
        let filter = FilterTree::Selector { dimension: "city".into(), value: None };
        assert_eq!(translate(&filter).unwrap().to_string(), "IS NULL($city)");
    }

    #[test]
    fn in_and_regex() {
        let rex = translate(&FilterTree::in_list("country", &["US", "CA"])).unwrap();
        assert_eq!(rex.to_string(), "IN($country, 'US', 'CA')");

        let regex = FilterTree::Regex { dimension: "page".into(), pattern: "^Main".into() };
        assert_eq!(translate(&regex).unwrap().to_string(), "REGEXP_LIKE($page, '^Main')");

        assert!(matches!(
            translate(&FilterTree::in_list("country", &[])),
            Err(ConversionError::FilterTranslation(_))
        ));
    }

    #[test]
    fn search_contains() {
        let sensitive = FilterTree::Search {
            dimension: "page".into(),
            query: SearchQuerySpec::Contains { value: "Foo".into(), case_sensitive: true },
        };
        assert_eq!(translate(&sensitive).unwrap().to_string(), "LIKE($page, '%Foo%', '\\')");

        let insensitive = FilterTree::Search {
            dimension: "page".into(),
            query: SearchQuerySpec::InsensitiveContains { value: "Foo".into() },
        };
        assert_eq!(translate(&insensitive).unwrap().to_string(), "LIKE(LOWER($page), '%foo%', '\\')");
    }

    #[test]
    fn search_matches_wildcards_literally() {
        let filter = FilterTree::Search {
            dimension: "page".into(),
            query: SearchQuerySpec::Contains { value: "50%_off\\".into(), case_sensitive: true },
        };
        assert_eq!(translate(&filter).unwrap().to_string(), "LIKE($page, '%50\\%\\_off\\\\%', '\\')");
    }

    #[test]
    fn bound_builds_range() {
        let filter = FilterTree::Bound {
            dimension: "age".into(),
            lower: Some("18".into()),
            upper: Some("65".into()),
            lower_strict: false,
            upper_strict: true,
        };
        assert_eq!(translate(&filter).unwrap().to_string(), "AND(>=($age, '18'), <($age, '65'))");

        let open = FilterTree::Bound { dimension: "age".into(), lower: None, upper: None, lower_strict: false, upper_strict: false };
        assert!(matches!(translate(&open), Err(ConversionError::FilterTranslation(_))));
    }

    #[test]
    fn boolean_combinators_recurse() {
        let filter = FilterTree::and(vec![
            FilterTree::selector("country", "US"),
            FilterTree::not(FilterTree::or(vec![
                FilterTree::selector("city", "NYC"),
                FilterTree::selector("city", "LA"),
            ])),
        ]);
        assert_eq!(
            translate(&filter).unwrap().to_string(),
            "AND(=($country, 'US'), NOT(OR(=($city, 'NYC'), =($city, 'LA'))))"
        );
    }

    #[test]
    fn empty_or_unsupported_fails() {
        assert!(matches!(translate(&FilterTree::and(vec![])), Err(ConversionError::FilterTranslation(_))));
        assert!(matches!(translate(&FilterTree::or(vec![])), Err(ConversionError::FilterTranslation(_))));
        assert!(matches!(translate(&FilterTree::Unsupported), Err(ConversionError::FilterTranslation(_))));
        let nested = FilterTree::not(FilterTree::Unsupported);
        assert!(matches!(translate(&nested), Err(ConversionError::FilterTranslation(_))));
    }
}
