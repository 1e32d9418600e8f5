pub mod chunk;
pub mod common;
pub mod locale;
pub mod res_table_config;
pub mod resource_table;
pub mod string_pool;

pub use chunk::*;
pub use common::*;
pub use res_table_config::*;
pub use resource_table::*;
pub use string_pool::*;
