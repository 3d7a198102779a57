use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Connecting to the database
/// - Binding SqlValue parameters as native types, never as SQL text
/// - Decoding result columns into SqlValue
/// - Translating backend failures into StoreError
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Run a row-returning statement.
    /// Parameters use PostgreSQL-style placeholders ($1, $2, etc.)
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Run a statement and return the number of rows it affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;
}
