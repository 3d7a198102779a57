use crate::clauses::WhereClause;
use crate::error::Result;
use crate::statement::Statement;
use crate::store::DataStore;
use crate::traits::Table;
use crate::types::AffectedRows;

/// Entry point for building a DELETE statement.
/// A WHERE clause is required before the statement can be built.
pub struct Delete;

impl Delete {
    pub fn from<T: Table>(_table: T) -> DeleteFrom {
        DeleteFrom {
            table: T::qualified_name(),
        }
    }
}

pub struct DeleteFrom {
    table: String,
}

impl DeleteFrom {
    pub fn where_(self, clause: WhereClause) -> DeleteWithWhere {
        DeleteWithWhere {
            table: self.table,
            where_clause: clause,
        }
    }
}

pub struct DeleteWithWhere {
    table: String,
    where_clause: WhereClause,
}

impl DeleteWithWhere {
    pub fn build(&self) -> Statement {
        let mut params = Vec::new();
        let where_sql = self.where_clause.build_sql(&mut params);
        Statement::with_params(format!("DELETE FROM {} WHERE {}", self.table, where_sql), params)
    }

    pub async fn execute(self, store: &DataStore) -> Result<AffectedRows> {
        store.execute(&self.build()).await
    }
}
