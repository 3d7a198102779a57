mod column;
mod driver;
mod table;

pub use column::{Column, StaticColumn};
pub use driver::DatabaseDriver;
pub use table::Table;
