pub mod rex_node;
pub use rex_node::*;

pub mod aggregate_call;
pub use aggregate_call::*;

pub mod sort_key;
pub use sort_key::*;

pub mod logical_plan;
pub use logical_plan::*;

pub mod rel_builder;
pub use rel_builder::*;
