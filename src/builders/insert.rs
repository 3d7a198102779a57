use crate::error::Result;
use crate::statement::Statement;
use crate::store::DataStore;
use crate::traits::{Column, StaticColumn, Table};
use crate::types::{AffectedRows, SqlValue};

/// Entry point for building an INSERT statement.
pub struct Insert;

impl Insert {
    /// Specify the target table. At least one `.value()` must follow.
    pub fn into<T: Table>(_table: T) -> InsertInto {
        InsertInto {
            table: T::qualified_name(),
        }
    }
}

pub struct InsertInto {
    table: String,
}

impl InsertInto {
    pub fn value<C: Column + ?Sized, V: Into<SqlValue>>(self, column: &C, value: V) -> InsertWithValues {
        InsertWithValues {
            table: self.table,
            columns: vec![StaticColumn::from_column(column)],
            values: vec![value.into()],
            returning: None,
        }
    }
}

/// INSERT builder with at least one column assigned.
pub struct InsertWithValues {
    table: String,
    columns: Vec<StaticColumn>,
    values: Vec<SqlValue>,
    returning: Option<StaticColumn>,
}

impl InsertWithValues {
    pub fn value<C: Column + ?Sized, V: Into<SqlValue>>(mut self, column: &C, value: V) -> Self {
        self.columns.push(StaticColumn::from_column(column));
        self.values.push(value.into());
        self
    }

    /// Return the backend-assigned key from `column`.
    pub fn returning<C: Column + ?Sized>(mut self, column: &C) -> Self {
        self.returning = Some(StaticColumn::from_column(column));
        self
    }

    pub fn build(&self) -> Statement {
        let names: Vec<&str> = self.columns.iter().map(|c| c.column_name()).collect();
        let placeholders: Vec<String> = (1..=self.values.len()).map(|i| format!("${}", i)).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            names.join(", "),
            placeholders.join(", ")
        );

        match self.returning {
            Some(col) => {
                sql.push_str(" RETURNING ");
                sql.push_str(col.column_name());
                Statement::with_params(sql, self.values.clone()).returning_generated_key()
            }
            None => Statement::with_params(sql, self.values.clone()),
        }
    }

    pub async fn execute(self, store: &DataStore) -> Result<AffectedRows> {
        store.execute(&self.build()).await
    }
}
