pub mod dialect;
pub use dialect::*;

pub mod config;
pub use config::*;

pub mod ast;
pub use ast::*;

pub mod sql_writer;
pub use sql_writer::*;

pub mod rel_to_sql;
pub use rel_to_sql::*;

use crate::{error::Result, planner::RelNode};

/// Turns a finished operator tree into SQL text.
pub trait SqlRenderer: Send + Sync {
    fn render(&self, rel: &RelNode) -> Result<String>;
}
