pub mod query_type;
pub use query_type::*;

pub mod dimension;
pub use dimension::*;

pub mod aggregation;
pub use aggregation::*;

pub mod post_aggregation;
pub use post_aggregation::*;

pub mod filter;
pub use filter::*;

pub mod having;
pub use having::*;

pub mod limit_spec;
pub use limit_spec::*;

pub mod granularity;
pub use granularity::*;

pub mod interval;
pub use interval::*;

pub mod analytic_query;
pub use analytic_query::*;
