use crate::clauses::WhereClause;
use crate::error::Result;
use crate::statement::Statement;
use crate::store::DataStore;
use crate::traits::{Column, StaticColumn, Table};
use crate::types::{AffectedRows, SqlValue};

/// Entry point for building an UPDATE statement.
/// A WHERE clause is required before the statement can be built.
pub struct Update;

impl Update {
    pub fn table<T: Table>(_table: T) -> UpdateTable {
        UpdateTable {
            table: T::qualified_name(),
        }
    }
}

pub struct UpdateTable {
    table: String,
}

impl UpdateTable {
    pub fn set<C: Column + ?Sized, V: Into<SqlValue>>(self, column: &C, value: V) -> UpdateWithSet {
        UpdateWithSet {
            table: self.table,
            assignments: vec![(StaticColumn::from_column(column), value.into())],
        }
    }
}

pub struct UpdateWithSet {
    table: String,
    assignments: Vec<(StaticColumn, SqlValue)>,
}

impl UpdateWithSet {
    pub fn set<C: Column + ?Sized, V: Into<SqlValue>>(mut self, column: &C, value: V) -> Self {
        self.assignments
            .push((StaticColumn::from_column(column), value.into()));
        self
    }

    pub fn where_(self, clause: WhereClause) -> UpdateWithWhere {
        UpdateWithWhere {
            table: self.table,
            assignments: self.assignments,
            where_clause: clause,
        }
    }
}

pub struct UpdateWithWhere {
    table: String,
    assignments: Vec<(StaticColumn, SqlValue)>,
    where_clause: WhereClause,
}

impl UpdateWithWhere {
    pub fn build(&self) -> Statement {
        let mut params = Vec::with_capacity(self.assignments.len() + 1);
        let mut sql = format!("UPDATE {} SET ", self.table);

        for (i, (col, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            params.push(value.clone());
            sql.push_str(&format!("{} = ${}", col.column_name(), params.len()));
        }

        sql.push_str(" WHERE ");
        let where_sql = self.where_clause.build_sql(&mut params);
        sql.push_str(&where_sql);

        Statement::with_params(sql, params)
    }

    pub async fn execute(self, store: &DataStore) -> Result<AffectedRows> {
        store.execute(&self.build()).await
    }
}
