pub mod query_validator;
pub use query_validator::*;

pub mod sort_key_resolver;
pub use sort_key_resolver::*;

pub mod query_assembler;
pub use query_assembler::*;

pub mod sql_converter;
pub use sql_converter::*;
