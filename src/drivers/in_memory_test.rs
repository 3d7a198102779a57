use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A scripted reply from the in-memory driver.
#[derive(Debug, Clone)]
pub enum TestResponse {
    /// Rows for a query; for an execute, the row count is the affected count.
    Rows(RawQueryResult),
    /// Affected-row count for an execute.
    Affected(u64),
    /// Fail the statement with this error.
    Error(StoreError),
}

impl From<RawQueryResult> for TestResponse {
    fn from(result: RawQueryResult) -> Self {
        TestResponse::Rows(result)
    }
}

/// An in-memory database driver for testing.
///
/// Allows configuring expected responses and verifying executed statements.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use pgstore::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
/// use pgstore::params;
///
/// let driver = Arc::new(
///     InMemoryTestDriver::new().with_response(
///         InMemoryTestResponseBuilder::new()
///             .columns(&["id", "nom"])
///             .row(params![1, "Dupont"])
///             .build(),
///     ),
/// );
/// ```
pub struct InMemoryTestDriver {
    responses: Mutex<VecDeque<TestResponse>>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
}

impl InMemoryTestDriver {
    /// Create a new in-memory test driver with no pre-configured responses.
    /// Unscripted queries return no rows and unscripted executes affect none.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            recorded_queries: Mutex::new(Vec::new()),
        }
    }

    /// Add a response to be returned by the next statement.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: impl Into<TestResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response.into());
        self
    }

    /// Add multiple responses to be returned by subsequent statements.
    pub fn with_responses(self, responses: impl IntoIterator<Item = TestResponse>) -> Self {
        self.responses.lock().unwrap().extend(responses);
        self
    }

    /// Script an affected-row count for the next execute.
    pub fn with_affected(self, rows: u64) -> Self {
        self.with_response(TestResponse::Affected(rows))
    }

    /// Script a failure for the next statement.
    pub fn with_error(self, error: StoreError) -> Self {
        self.with_response(TestResponse::Error(error))
    }

    /// Get all recorded statements that have been executed.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded_queries.lock().unwrap().clone()
    }

    /// Get the last recorded statement, if any.
    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.recorded_queries.lock().unwrap().last().cloned()
    }

    /// Clear all recorded statements.
    pub fn clear_recorded_queries(&self) {
        self.recorded_queries.lock().unwrap().clear();
    }

    /// Assert that the last statement matches the expected SQL and parameters.
    pub fn assert_last_query(&self, expected_sql: &str, expected_params: &[SqlValue]) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            last.params, expected_params,
            "Parameters mismatch.\nExpected: {:?}\nActual: {:?}",
            expected_params, last.params
        );
    }

    /// Assert that exactly n statements were executed.
    pub fn assert_query_count(&self, expected: usize) {
        let actual = self.recorded_queries.lock().unwrap().len();
        assert_eq!(
            actual, expected,
            "Query count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    fn next_response(&self, sql: &str, params: &[SqlValue]) -> Option<TestResponse> {
        self.recorded_queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.responses.lock().unwrap().pop_front()
    }
}

impl Default for InMemoryTestDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for InMemoryTestDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        match self.next_response(sql, params) {
            None => Ok(RawQueryResult::empty()),
            Some(TestResponse::Rows(result)) => Ok(result),
            Some(TestResponse::Error(err)) => Err(err),
            Some(TestResponse::Affected(_)) => Err(StoreError::Query(format!(
                "scripted an affected-row count for a row-returning statement: {}",
                sql
            ))),
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        match self.next_response(sql, params) {
            None => Ok(0),
            Some(TestResponse::Affected(rows)) => Ok(rows),
            Some(TestResponse::Rows(result)) => Ok(result.rows.len() as u64),
            Some(TestResponse::Error(err)) => Err(err),
        }
    }
}

/// Builder for creating test responses easily.
pub struct InMemoryTestResponseBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl InMemoryTestResponseBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the response.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of values, usually built with `params!`.
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.rows.push(values);
        self
    }

    /// Build the RawQueryResult.
    pub fn build(self) -> RawQueryResult {
        RawQueryResult::new(self.columns, self.rows)
    }
}

impl Default for InMemoryTestResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
