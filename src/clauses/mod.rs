mod order;
mod where_clause;

pub use order::Order;
pub use where_clause::{escape_like, CompareOp, WhereClause};
