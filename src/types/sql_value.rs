use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Represents a SQL scalar in a driver-agnostic way, both as a bind
/// parameter and as a decoded result value.
/// Drivers are responsible for converting these to and from their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
}

impl SqlValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Text(_) => "text",
            SqlValue::Int32(_) => "int32",
            SqlValue::Int64(_) => "int64",
            SqlValue::Float64(_) => "float64",
            SqlValue::Bool(_) => "bool",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            SqlValue::Date(_) => "date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float64(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::TimestampTz(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Conversion from a decoded [`SqlValue`] into a Rust type.
///
/// Integer widths widen losslessly (`Int32` reads as `i64`); every other
/// mismatch is reported rather than coerced.
pub trait FromSqlValue: Sized {
    /// Name of the expected SQL kind, used in error messages.
    const EXPECTED: &'static str;

    /// Returns `None` when the value has another kind.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

impl FromSqlValue for SqlValue {
    const EXPECTED: &'static str = "any";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromSqlValue for String {
    const EXPECTED: &'static str = "text";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromSqlValue for i32 {
    const EXPECTED: &'static str = "int32";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int32(i) => Some(*i),
            SqlValue::Int64(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromSqlValue for i64 {
    const EXPECTED: &'static str = "int64";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int32(i) => Some(i64::from(*i)),
            SqlValue::Int64(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromSqlValue for f64 {
    const EXPECTED: &'static str = "float64";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float64(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromSqlValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    const EXPECTED: &'static str = "timestamp";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    const EXPECTED: &'static str = "timestamptz";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::TimestampTz(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl FromSqlValue for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}
