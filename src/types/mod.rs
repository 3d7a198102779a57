mod row;
mod sql_value;

pub use row::{AffectedRows, QueryResult, RawQueryResult, Row};
pub use sql_value::{FromSqlValue, SqlValue};
