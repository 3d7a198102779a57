use thiserror::Error;

/// Which integrity rule a rejected write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

/// Error type for pgstore operations
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The session is unusable; the caller should reconnect.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A write was rejected by a uniqueness or referential-integrity rule.
    #[error("Constraint violation ({kind:?}): {message}")]
    Constraint {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    /// The backend rejected the statement itself.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error("Statement expects {expected} bind parameter(s), got {actual}")]
    BindMismatch { expected: usize, actual: usize },

    #[error("Expected at most {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {column} holds {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for pgstore operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Only a lost session is worth retrying, and only after reconnecting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Constraint { .. })
    }

    /// Errors raised before or after the round trip because of how the
    /// caller built the statement or read the row.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidStatement(_)
                | StoreError::BindMismatch { .. }
                | StoreError::UnexpectedRowCount { .. }
                | StoreError::ColumnNotFound(_)
                | StoreError::TypeMismatch { .. }
        )
    }

    /// Builds the error for a backend failure carrying a SQLSTATE code.
    pub fn from_sqlstate(code: &str, message: impl Into<String>, constraint: Option<String>) -> Self {
        let message = message.into();
        match code {
            "23505" => Self::constraint(ConstraintKind::Unique, constraint, message),
            "23503" => Self::constraint(ConstraintKind::ForeignKey, constraint, message),
            "23502" => Self::constraint(ConstraintKind::NotNull, constraint, message),
            "23514" => Self::constraint(ConstraintKind::Check, constraint, message),
            c if c.starts_with("23") => Self::constraint(ConstraintKind::Other, constraint, message),
            // admin_shutdown, crash_shutdown, cannot_connect_now
            "57P01" | "57P02" | "57P03" => StoreError::Connection(message),
            c if c.starts_with("08") => StoreError::Connection(message),
            _ => StoreError::Query(format!("{} (SQLSTATE {})", message, code)),
        }
    }

    fn constraint(kind: ConstraintKind, constraint: Option<String>, message: String) -> Self {
        StoreError::Constraint {
            kind,
            constraint,
            message,
        }
    }
}
