/// Trait representing a database table.
/// Implementations are typically generated with the [`table!`](crate::table) macro.
pub trait Table {
    /// The type containing all column accessors for this table.
    type Columns;

    /// Returns the table name as it appears in the database.
    fn table_name() -> &'static str;

    /// Returns the schema name, if any.
    fn schema() -> Option<&'static str> {
        None
    }

    /// Returns the fully qualified table name (schema.table or just table).
    fn qualified_name() -> String {
        match Self::schema() {
            Some(schema) => format!("{}.{}", schema, Self::table_name()),
            None => Self::table_name().to_string(),
        }
    }

    /// Returns an instance of the columns accessor for this table.
    fn columns() -> Self::Columns;
}

/// Declares a table and its columns as compile-time identifiers.
///
/// # Example
/// ```
/// pgstore::table! {
///     pub struct Users("users") {
///         UsersColumns { id: "id", name: "name" }
///     }
/// }
///
/// use pgstore::{Column, Table};
/// assert_eq!(Users::columns().name.qualified_name(), "users.name");
/// ```
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($table:literal) {
            $cols:ident { $($field:ident: $column:literal),+ $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        #[derive(Debug, Clone, Copy)]
        $vis struct $cols {
            $(pub $field: $crate::traits::StaticColumn,)+
        }

        impl $crate::traits::Table for $name {
            type Columns = $cols;

            fn table_name() -> &'static str {
                $table
            }

            fn columns() -> Self::Columns {
                $cols {
                    $($field: $crate::traits::StaticColumn::new($table, $column),)+
                }
            }
        }
    };
}
