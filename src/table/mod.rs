pub mod physical_table;
pub use physical_table::*;

pub mod field_name_mapper;
pub use field_name_mapper::*;
