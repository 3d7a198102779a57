use crate::clauses::{Order, WhereClause};
use crate::error::Result;
use crate::statement::Statement;
use crate::store::DataStore;
use crate::traits::{Column, StaticColumn, Table};
use crate::types::{Row, SqlValue};

/// Entry point for building a SELECT statement.
/// Must call `Select::columns()` to proceed.
pub struct Select;

impl Select {
    /// Specify the columns to select.
    /// Accepts a slice of column references.
    pub fn columns(cols: &[&dyn Column]) -> SelectWithColumns {
        let columns = cols.iter().map(|c| StaticColumn::from_column(*c)).collect();
        SelectWithColumns { columns }
    }
}

/// SELECT builder after columns have been specified.
/// Must call `.from()` to proceed.
pub struct SelectWithColumns {
    columns: Vec<StaticColumn>,
}

impl SelectWithColumns {
    /// Specify the table to select from.
    pub fn from<T: Table>(self, _table: T) -> SelectWithTable {
        SelectWithTable {
            columns: self.columns,
            table: T::qualified_name(),
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
        }
    }
}

/// SELECT builder after table has been specified.
/// Can optionally add WHERE, ORDER BY, LIMIT, or build directly.
pub struct SelectWithTable {
    columns: Vec<StaticColumn>,
    table: String,
    where_clause: Option<WhereClause>,
    order_by: Vec<(StaticColumn, Order)>,
    limit: Option<i64>,
}

impl SelectWithTable {
    /// Add a WHERE clause to the query.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Add a sort key. Keys apply in the order they are added.
    pub fn order_by<C: Column + ?Sized>(mut self, column: &C, order: Order) -> Self {
        self.order_by.push((StaticColumn::from_column(column), order));
        self
    }

    /// Add a LIMIT to the query. The count is bound as a parameter.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Build the SQL statement and its parameters.
    pub fn build(&self) -> Statement {
        let mut sql = String::with_capacity(256);
        let mut params = Vec::new();

        // SELECT clause
        sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&col.qualified_name());
        }

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        // WHERE clause
        if let Some(ref where_clause) = self.where_clause {
            sql.push_str(" WHERE ");
            let where_sql = where_clause.build_sql(&mut params);
            sql.push_str(&where_sql);
        }

        // ORDER BY clause
        for (i, (col, order)) in self.order_by.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(&col.qualified_name());
            sql.push(' ');
            sql.push_str(order.as_sql());
        }

        // LIMIT clause
        if let Some(limit) = self.limit {
            params.push(SqlValue::Int64(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }

        Statement::with_params(sql, params)
    }

    /// Run the query and return every row.
    pub async fn fetch_all(self, store: &DataStore) -> Result<Vec<Row>> {
        store.query_many(&self.build()).await
    }

    /// Run the query and return the row, if any.
    pub async fn fetch_optional(self, store: &DataStore) -> Result<Option<Row>> {
        store.query_one(&self.build()).await
    }
}
