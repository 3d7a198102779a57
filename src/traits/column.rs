/// Trait representing a database column.
/// Names are `'static` so they can only come from code, never from input.
pub trait Column {
    /// Returns the column name as it appears in the database.
    fn column_name(&self) -> &'static str;

    /// Returns the table name this column belongs to.
    fn table_name(&self) -> &'static str;

    /// Returns the fully qualified column name (table.column).
    fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name(), self.column_name())
    }
}

/// A column known at compile time, used by `table!` declarations
/// and stored by the query builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticColumn {
    table: &'static str,
    column: &'static str,
}

impl StaticColumn {
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }

    pub fn from_column<C: Column + ?Sized>(col: &C) -> Self {
        Self {
            table: col.table_name(),
            column: col.column_name(),
        }
    }
}

impl Column for StaticColumn {
    fn column_name(&self) -> &'static str {
        self.column
    }

    fn table_name(&self) -> &'static str {
        self.table
    }
}
