use crate::{
    converter::{QueryAssembler, QueryValidator},
    error::{ConversionError, Result},
    query::AnalyticQuery,
    sql::RenderConfig,
    table::FieldNameMapper,
};

/// Entry point: rejects unsupported query types, then assembles and renders.
#[derive(Clone, Default)]
pub struct SqlConverter {
    assembler: QueryAssembler,
}

impl SqlConverter {
    pub fn new(assembler: QueryAssembler) -> Self {
        Self { assembler }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self::new(QueryAssembler::with_config(config))
    }

    pub fn assembler(&self) -> &QueryAssembler {
        &self.assembler
    }

    pub fn is_valid_query(&self, query: &AnalyticQuery) -> bool {
        QueryValidator::is_valid_query(query)
    }

    pub fn convert(&self, query: &AnalyticQuery, mapper: &dyn FieldNameMapper) -> Result<String> {
        if !self.is_valid_query(query) {
            return Err(ConversionError::UnsupportedQueryType(query.query_type.to_string()));
        }
        self.assembler.build_sql_query(query, mapper)
    }

    /// Parses a native JSON query document and converts it.
    pub fn convert_json(&self, raw: &str, mapper: &dyn FieldNameMapper) -> Result<String> {
        let query = AnalyticQuery::from_json(raw)?;
        self.convert(&query, mapper)
    }
}
