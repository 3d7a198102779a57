use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ConnectParams;
use crate::drivers::TokioPostgresDriver;
use crate::error::{Result, StoreError};
use crate::statement::Statement;
use crate::traits::DatabaseDriver;
use crate::types::{AffectedRows, FromSqlValue, QueryResult, RawQueryResult, Row};

/// Main entry point for pgstore.
/// Owns one database session and runs parameterized statements against it.
///
/// Calls on one store never overlap: each statement holds the session lock
/// for its whole round trip. Give each worker its own store for parallelism.
pub struct DataStore {
    driver: Arc<dyn DatabaseDriver>,
    session: Mutex<()>,
}

impl DataStore {
    /// Connect to a PostgreSQL database. The store never retries.
    ///
    /// # Example
    /// ```ignore
    /// let params = ConnectParams::new("localhost", "bibliotheque", "biblio").password("secret");
    /// let store = DataStore::connect(&params).await?;
    /// ```
    pub async fn connect(params: &ConnectParams) -> Result<Self> {
        let driver = TokioPostgresDriver::connect(params).await?;
        Ok(Self::with_driver(Arc::new(driver)))
    }

    /// Create a store over a custom driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            driver,
            session: Mutex::new(()),
        }
    }

    /// Run an INSERT, UPDATE or DELETE.
    ///
    /// Statements marked `returning_generated_key` report the returned key
    /// in `generated_id`.
    pub async fn execute(&self, statement: &Statement) -> Result<AffectedRows> {
        statement.check_arity()?;
        let _session = self.session.lock().await;
        debug!(sql = statement.sql(), params = statement.params().len(), "execute");

        let outcome = if statement.returns_generated_key() {
            self.driver
                .query(statement.sql(), statement.params())
                .await
                .and_then(generated_key)
        } else {
            self.driver
                .execute(statement.sql(), statement.params())
                .await
                .map(|rows| AffectedRows {
                    rows,
                    generated_id: None,
                })
        };

        outcome.map_err(|e| log_failure(statement, e))
    }

    /// Run a SELECT expected to match at most one row.
    /// No match is `Ok(None)`; more than one is `UnexpectedRowCount`.
    pub async fn query_one(&self, statement: &Statement) -> Result<Option<Row>> {
        self.fetch(statement).await?.optional_row()
    }

    /// Run a SELECT and return every row in backend order.
    /// No match is an empty vector.
    pub async fn query_many(&self, statement: &Statement) -> Result<Vec<Row>> {
        Ok(self.fetch(statement).await?.rows())
    }

    async fn fetch(&self, statement: &Statement) -> Result<QueryResult> {
        statement.check_arity()?;
        let _session = self.session.lock().await;
        debug!(sql = statement.sql(), params = statement.params().len(), "query");

        self.driver
            .query(statement.sql(), statement.params())
            .await
            .and_then(QueryResult::from_raw)
            .map_err(|e| log_failure(statement, e))
    }
}

fn generated_key(raw: RawQueryResult) -> Result<AffectedRows> {
    let generated_id = match raw.rows.first().and_then(|row| row.first()) {
        Some(value) => Some(i64::from_sql_value(value).ok_or_else(|| StoreError::TypeMismatch {
            column: raw.columns.first().cloned().unwrap_or_default(),
            expected: i64::EXPECTED,
            actual: value.kind(),
        })?),
        None => None,
    };

    Ok(AffectedRows {
        rows: raw.rows.len() as u64,
        generated_id,
    })
}

fn log_failure(statement: &Statement, err: StoreError) -> StoreError {
    warn!(sql = statement.sql(), error = %err, "statement failed");
    err
}
