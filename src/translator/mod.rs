pub mod aggregation_mapper;
pub use aggregation_mapper::*;

pub mod time_converter;
pub use time_converter::*;

pub mod filter_translator;
pub use filter_translator::*;

pub mod having_translator;
pub use having_translator::*;

pub mod post_aggregation_translator;
pub use post_aggregation_translator::*;
