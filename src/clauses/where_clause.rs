use crate::traits::{Column, StaticColumn};
use crate::types::SqlValue;

/// Represents a WHERE clause condition.
/// Values are always bound as parameters; only column names reach the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// column <op> value
    Compare(StaticColumn, CompareOp, SqlValue),
    /// column IS NULL / IS NOT NULL
    Null(StaticColumn, bool),
    /// column ILIKE '%term%' with the term's wildcards escaped
    Contains(StaticColumn, String),
    /// clause AND clause
    And(Box<WhereClause>, Box<WhereClause>),
    /// clause OR clause
    Or(Box<WhereClause>, Box<WhereClause>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

impl WhereClause {
    fn compare<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, op: CompareOp, value: V) -> Self {
        WhereClause::Compare(StaticColumn::from_column(column), op, value.into())
    }

    /// Creates an equality condition: column = value
    pub fn eq<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn ne<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    pub fn gt<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn gte<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Gte, value)
    }

    pub fn lt<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn lte<C: Column + ?Sized, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        Self::compare(column, CompareOp::Lte, value)
    }

    pub fn is_null<C: Column + ?Sized>(column: &C) -> Self {
        WhereClause::Null(StaticColumn::from_column(column), true)
    }

    pub fn is_not_null<C: Column + ?Sized>(column: &C) -> Self {
        WhereClause::Null(StaticColumn::from_column(column), false)
    }

    /// Case-insensitive substring match. `%`, `_` and `\` in `term`
    /// match literally.
    pub fn contains<C: Column + ?Sized>(column: &C, term: impl Into<String>) -> Self {
        WhereClause::Contains(StaticColumn::from_column(column), term.into())
    }

    /// Combines this clause with another using AND
    pub fn and(self, other: WhereClause) -> Self {
        WhereClause::And(Box::new(self), Box::new(other))
    }

    /// Combines this clause with another using OR
    pub fn or(self, other: WhereClause) -> Self {
        WhereClause::Or(Box::new(self), Box::new(other))
    }

    /// Builds the SQL fragment, appending bound values to `params`.
    /// Placeholders continue numbering after the values already in `params`.
    pub fn build_sql(&self, params: &mut Vec<SqlValue>) -> String {
        match self {
            WhereClause::Compare(col, op, value) => {
                params.push(value.clone());
                format!("{} {} ${}", col.qualified_name(), op.as_sql(), params.len())
            }
            WhereClause::Null(col, true) => format!("{} IS NULL", col.qualified_name()),
            WhereClause::Null(col, false) => format!("{} IS NOT NULL", col.qualified_name()),
            WhereClause::Contains(col, term) => {
                params.push(SqlValue::Text(format!("%{}%", escape_like(term))));
                format!("{} ILIKE ${} ESCAPE '\\'", col.qualified_name(), params.len())
            }
            WhereClause::And(left, right) => {
                let left_sql = left.build_sql(params);
                let right_sql = right.build_sql(params);
                format!("({}) AND ({})", left_sql, right_sql)
            }
            WhereClause::Or(left, right) => {
                let left_sql = left.build_sql(params);
                let right_sql = right.build_sql(params);
                format!("({}) OR ({})", left_sql, right_sql)
            }
        }
    }
}

/// Escapes LIKE wildcards so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: StaticColumn = StaticColumn::new("users", "name");
    const AGE: StaticColumn = StaticColumn::new("users", "age");

    #[test]
    fn test_eq_clause() {
        let clause = WhereClause::eq(&NAME, "John");
        let mut params = Vec::new();
        let sql = clause.build_sql(&mut params);

        assert_eq!(sql, "users.name = $1");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0], SqlValue::Text("John".to_string()));
    }

    #[test]
    fn test_and_clause() {
        let clause = WhereClause::eq(&NAME, "John").and(WhereClause::gte(&AGE, 30));

        let mut params = Vec::new();
        let sql = clause.build_sql(&mut params);

        assert_eq!(sql, "(users.name = $1) AND (users.age >= $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_numbering_continues_after_existing_params() {
        let mut params = vec![SqlValue::Text("set".to_string())];
        let sql = WhereClause::lt(&AGE, 18).build_sql(&mut params);
        assert_eq!(sql, "users.age < $2");
    }

    #[test]
    fn test_null_checks_bind_nothing() {
        let mut params = Vec::new();
        let sql = WhereClause::is_null(&NAME)
            .or(WhereClause::is_not_null(&AGE))
            .build_sql(&mut params);
        assert_eq!(sql, "(users.name IS NULL) OR (users.age IS NOT NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_contains_escapes_wildcards() {
        let mut params = Vec::new();
        let sql = WhereClause::contains(&NAME, "100%_sure").build_sql(&mut params);
        assert_eq!(sql, "users.name ILIKE $1 ESCAPE '\\'");
        assert_eq!(params[0], SqlValue::Text("%100\\%\\_sure%".to_string()));
    }

    #[test]
    fn test_injection_attempt_stays_a_value() {
        let mut params = Vec::new();
        let sql = WhereClause::eq(&NAME, "x'; DROP TABLE users; --").build_sql(&mut params);
        assert_eq!(sql, "users.name = $1");
        assert_eq!(params[0], SqlValue::Text("x'; DROP TABLE users; --".to_string()));
    }
}
