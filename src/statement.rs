use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::error::{Result, StoreError};
use crate::types::SqlValue;

/// Builds a `Vec<SqlValue>` from heterogeneous values.
///
/// # Example
/// ```
/// use pgstore::{params, SqlValue};
///
/// let values = params!["Dune", 1965, None::<String>];
/// assert_eq!(values[1], SqlValue::Int32(1965));
/// assert_eq!(values[2], SqlValue::Null);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::types::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::types::SqlValue::from($value)),+]
    };
}

/// SQL text plus its ordered bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
    returns_generated_key: bool,
}

impl Statement {
    /// A statement with no parameters bound yet.
    pub fn new(sql: impl Into<String>) -> Self {
        Self::with_params(sql, Vec::new())
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
            returns_generated_key: false,
        }
    }

    /// Append the next positional parameter.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Mark the statement as returning the generated key in its first
    /// column (`INSERT ... RETURNING id`).
    pub fn returning_generated_key(mut self) -> Self {
        self.returns_generated_key = true;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn returns_generated_key(&self) -> bool {
        self.returns_generated_key
    }

    /// Checks that the number of bound parameters equals the number of
    /// placeholders in the text. Returns the arity.
    pub fn check_arity(&self) -> Result<usize> {
        let expected = placeholder_arity(&self.sql)?;
        if expected != self.params.len() {
            return Err(StoreError::BindMismatch {
                expected,
                actual: self.params.len(),
            });
        }
        Ok(expected)
    }
}

/// Fixed SQL text whose placeholder count was validated when it was built.
#[derive(Debug, Clone)]
pub struct StatementTemplate {
    sql: Cow<'static, str>,
    arity: usize,
    returns_generated_key: bool,
}

impl StatementTemplate {
    /// Fails with `InvalidStatement` unless the text declares exactly
    /// `expected_arity` placeholders.
    pub fn new(sql: impl Into<Cow<'static, str>>, expected_arity: usize) -> Result<Self> {
        let sql = sql.into();
        let arity = placeholder_arity(&sql)?;
        if arity != expected_arity {
            return Err(StoreError::InvalidStatement(format!(
                "template declares {} placeholder(s), expected {}: {}",
                arity, expected_arity, sql
            )));
        }
        Ok(Self {
            sql,
            arity,
            returns_generated_key: false,
        })
    }

    pub fn returning_generated_key(mut self) -> Self {
        self.returns_generated_key = true;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Produce an executable statement from this template.
    pub fn bind(&self, params: Vec<SqlValue>) -> Result<Statement> {
        if params.len() != self.arity {
            return Err(StoreError::BindMismatch {
                expected: self.arity,
                actual: params.len(),
            });
        }
        Ok(Statement {
            sql: self.sql.to_string(),
            params,
            returns_generated_key: self.returns_generated_key,
        })
    }
}

/// Counts the `$n` placeholders of a PostgreSQL statement.
///
/// Text inside string literals, quoted identifiers, dollar-quoted bodies and
/// comments is skipped. Placeholders must be numbered 1..=n without gaps,
/// and blank text is rejected.
pub fn placeholder_arity(sql: &str) -> Result<usize> {
    if sql.trim().is_empty() {
        return Err(StoreError::InvalidStatement("statement text is empty".to_string()));
    }

    let bytes = sql.as_bytes();
    let mut seen = BTreeSet::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                let backslash_escapes =
                    i > 0 && matches!(bytes[i - 1], b'E' | b'e') && !(i > 1 && is_ident(bytes[i - 2]));
                i = skip_quoted(bytes, i, b'\'', backslash_escapes)?;
            }
            b'"' => i = skip_quoted(bytes, i, b'"', false)?,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = match sql[i..].find('\n') {
                    Some(pos) => i + pos + 1,
                    None => bytes.len(),
                };
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i)?,
            b'$' if i > 0 && is_ident(bytes[i - 1]) => i += 1,
            b'$' => {
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > start {
                    let index: usize = sql[start..j].parse().map_err(|_| {
                        StoreError::InvalidStatement(format!("placeholder {} is out of range", &sql[i..j]))
                    })?;
                    if index == 0 {
                        return Err(StoreError::InvalidStatement(
                            "placeholders are numbered from $1".to_string(),
                        ));
                    }
                    seen.insert(index);
                    i = j;
                    continue;
                }

                while j < bytes.len() && is_ident(bytes[j]) {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'$' {
                    let tag = &sql[i..=j];
                    let body = j + 1;
                    i = match sql[body..].find(tag) {
                        Some(pos) => body + pos + tag.len(),
                        None => {
                            return Err(StoreError::InvalidStatement(format!(
                                "unterminated dollar-quoted string {}",
                                tag
                            )))
                        }
                    };
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    let arity = seen.iter().next_back().copied().unwrap_or(0);
    if seen.len() != arity {
        let missing = (1..=arity).find(|n| !seen.contains(n)).unwrap_or(arity);
        return Err(StoreError::InvalidStatement(format!(
            "placeholders must be numbered without gaps; ${} is unused",
            missing
        )));
    }
    Ok(arity)
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_quoted(bytes: &[u8], open: usize, quote: u8, backslash_escapes: bool) -> Result<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if backslash_escapes && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            // doubled quote is an escaped quote
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(StoreError::InvalidStatement(format!(
        "unterminated {} quote",
        quote as char
    )))
}

fn skip_block_comment(bytes: &[u8], open: usize) -> Result<usize> {
    // PostgreSQL block comments nest
    let mut depth = 0usize;
    let mut i = open;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Ok(i);
            }
        } else {
            i += 1;
        }
    }
    Err(StoreError::InvalidStatement(
        "unterminated block comment".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_positional_placeholders() {
        assert_eq!(placeholder_arity("SELECT 1").unwrap(), 0);
        assert_eq!(
            placeholder_arity("UPDATE livres SET titre = $1 WHERE id = $2").unwrap(),
            2
        );
        // reuse of an index counts once
        assert_eq!(
            placeholder_arity("SELECT * FROM livres WHERE titre ILIKE $1 OR auteur ILIKE $1").unwrap(),
            1
        );
    }

    #[test]
    fn test_ignores_literals_and_comments() {
        let sql = "SELECT '$1', \"col$2\", $$ $3 $$, $body$ $4 $body$ -- $5\n FROM t /* $6 /* $7 */ */ WHERE a = $1";
        assert_eq!(placeholder_arity(sql).unwrap(), 1);
        assert_eq!(placeholder_arity("SELECT 'it''s $1' WHERE x = $1").unwrap(), 1);
        assert_eq!(placeholder_arity("SELECT E'\\' $2' WHERE x = $1").unwrap(), 1);
    }

    #[test]
    fn test_rejects_gaps_and_zero() {
        assert!(matches!(
            placeholder_arity("SELECT $1, $3"),
            Err(StoreError::InvalidStatement(_))
        ));
        assert!(matches!(
            placeholder_arity("SELECT $0"),
            Err(StoreError::InvalidStatement(_))
        ));
        assert!(matches!(
            placeholder_arity("SELECT 'open"),
            Err(StoreError::InvalidStatement(_))
        ));
    }

    #[test]
    fn test_statement_arity_mismatch() {
        let stmt = Statement::new("DELETE FROM livres WHERE id = $1");
        match stmt.check_arity().unwrap_err() {
            StoreError::BindMismatch { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            other => panic!("Expected BindMismatch error, got {:?}", other),
        }
        assert_eq!(stmt.bind(3).check_arity().unwrap(), 1);
    }

    #[test]
    fn test_template_validated_at_construction() {
        assert!(StatementTemplate::new("SELECT * FROM livres WHERE id = $1", 2).is_err());

        let template = StatementTemplate::new("SELECT * FROM livres WHERE id = $1", 1).unwrap();
        assert_eq!(template.arity(), 1);
        assert!(matches!(
            template.bind(params![1, 2]),
            Err(StoreError::BindMismatch {
                expected: 1,
                actual: 2
            })
        ));
        let stmt = template.bind(params![7]).unwrap();
        assert_eq!(stmt.params(), &[SqlValue::Int32(7)]);
        assert!(!stmt.returns_generated_key());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert!(matches!(
            StatementTemplate::new("", 0),
            Err(StoreError::InvalidStatement(_))
        ));
        assert!(Statement::new("   ").check_arity().is_err());
    }
}
