use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{Result, StoreError},
    types::{FromSqlValue, SqlValue},
    Column,
};

/// Driver-agnostic raw result from a database query.
/// Drivers decode every value into a [`SqlValue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    /// Column names in projection order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of an INSERT, UPDATE or DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedRows {
    /// Number of rows the statement touched.
    pub rows: u64,
    /// Key assigned by the backend, for statements that return one.
    pub generated_id: Option<i64>,
}

/// A single row result from a query.
/// Values keep the order of the statement's projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets the raw value of a column by name.
    pub fn value(&self, name: &str) -> Result<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| StoreError::ColumnNotFound(name.to_string()))
    }

    /// Gets a typed value by column.
    pub fn get<T: FromSqlValue, C: Column + ?Sized>(&self, column: &C) -> Result<T> {
        self.get_by_name(column.column_name())
    }

    /// Gets a typed value by column name, for aliased projections
    /// such as `COUNT(*) AS total`.
    pub fn get_by_name<T: FromSqlValue>(&self, name: &str) -> Result<T> {
        let value = self.value(name)?;
        T::from_sql_value(value).ok_or_else(|| StoreError::TypeMismatch {
            column: name.to_string(),
            expected: T::EXPECTED,
            actual: value.kind(),
        })
    }

    /// Returns all column names in projection order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.as_str()).collect()
    }

    /// Iterates over (column, value) pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(|s| s.as_str())
            .zip(self.values.iter())
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    /// Fails if a column name repeats or a row is not as wide as the projection.
    pub fn from_raw(raw: RawQueryResult) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &raw.columns {
            if !seen.insert(column.as_str()) {
                return Err(StoreError::Query(format!(
                    "duplicate column name '{}' in result; alias it in the projection",
                    column
                )));
            }
        }

        let columns: Arc<[String]> = raw.columns.into();
        let mut rows = Vec::with_capacity(raw.rows.len());
        for values in raw.rows {
            if values.len() != columns.len() {
                return Err(StoreError::Query(format!(
                    "row has {} value(s) for {} column(s)",
                    values.len(),
                    columns.len()
                )));
            }
            rows.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(Self { columns, rows })
    }

    /// Extracts at most one row from the result.
    /// Returns an error if the result contains more than one row.
    pub fn optional_row(self) -> Result<Option<Row>> {
        if self.rows.len() > 1 {
            return Err(StoreError::UnexpectedRowCount {
                expected: 1,
                actual: self.rows.len(),
            });
        }
        Ok(self.rows.into_iter().next())
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
