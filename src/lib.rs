pub mod error;
pub use error::{ConversionError, Result};

pub mod query;
pub use query::{AnalyticQuery, Granularity, QueryType};

pub mod table;
pub use table::{FieldNameMapper, IdentityFieldNameMapper, MapFieldNameMapper, PhysicalTableRef};

pub mod planner;

pub mod translator;

pub mod sql;
pub use sql::{RenderConfig, SqlDialect};

pub mod converter;
pub use converter::{QueryAssembler, SqlConverter};
