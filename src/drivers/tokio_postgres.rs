use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use crate::config::ConnectParams;
use crate::error::{Result, StoreError};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// PostgreSQL driver implementation using tokio-postgres.
/// Owns exactly one session.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(params: &ConnectParams) -> Result<Self> {
        let (client, connection) = params
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        debug!(host = %params.host, dbname = %params.dbname, "connected to PostgreSQL");
        Ok(Self { client })
    }

    /// Prepare the statement and convert the parameters to the types the
    /// server inferred for each placeholder.
    async fn prepare(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<(tokio_postgres::Statement, Vec<BoxedParam>)> {
        let statement = self.client.prepare(sql).await.map_err(translate_error)?;

        let types = statement.params();
        if types.len() != params.len() {
            return Err(StoreError::BindMismatch {
                expected: types.len(),
                actual: params.len(),
            });
        }

        let converted = types
            .iter()
            .zip(params)
            .enumerate()
            .map(|(i, (ty, value))| to_native(value, ty, i + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok((statement, converted))
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let (statement, converted_params) = self.prepare(sql, params).await?;

        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(&statement, &param_refs)
            .await
            .map_err(translate_error)?;

        // Column names come from the prepared statement, so they are
        // known even when no row matched.
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let result_rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let (statement, converted_params) = self.prepare(sql, params).await?;

        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        self.client
            .execute(&statement, &param_refs)
            .await
            .map_err(translate_error)
    }
}

/// Map a tokio-postgres failure onto the store's error taxonomy.
fn translate_error(err: tokio_postgres::Error) -> StoreError {
    if let Some(db) = err.as_db_error() {
        let message = match db.detail() {
            Some(detail) => format!("{}: {}", db.message(), detail),
            None => db.message().to_string(),
        };
        return StoreError::from_sqlstate(
            db.code().code(),
            message,
            db.constraint().map(str::to_string),
        );
    }

    if err.is_closed() {
        return StoreError::Connection(err.to_string());
    }

    let io_failure = std::error::Error::source(&err).map_or(false, |s| s.is::<std::io::Error>());
    if io_failure {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Query(err.to_string())
    }
}

fn is_text(ty: &Type) -> bool {
    *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
}

/// Convert a SqlValue to the native type of the parameter at `position`.
fn to_native(value: &SqlValue, ty: &Type, position: usize) -> Result<BoxedParam> {
    let unsupported = || {
        StoreError::Query(format!(
            "cannot bind {} to parameter ${} of type {}",
            value.kind(),
            position,
            ty
        ))
    };

    let boxed: BoxedParam = match value {
        SqlValue::Null => return null_for(ty).ok_or_else(unsupported),
        SqlValue::Int32(i) => return integer_for(i64::from(*i), ty, position),
        SqlValue::Int64(i) => return integer_for(*i, ty, position),
        SqlValue::Bool(b) if *ty == Type::BOOL => Box::new(*b),
        SqlValue::Float64(f) if *ty == Type::FLOAT8 => Box::new(*f),
        SqlValue::Float64(f) if *ty == Type::FLOAT4 => {
            let narrowed = *f as f32;
            // NaN never compares equal but narrows to NaN
            if !f.is_nan() && f64::from(narrowed) != *f {
                return Err(StoreError::Query(format!(
                    "value {} loses precision in parameter ${} of type {}",
                    f, position, ty
                )));
            }
            Box::new(narrowed)
        }
        SqlValue::Text(s) if is_text(ty) => Box::new(s.clone()),
        SqlValue::Timestamp(ts) if *ty == Type::TIMESTAMP => Box::new(*ts),
        SqlValue::Timestamp(ts) if *ty == Type::TIMESTAMPTZ => Box::new(ts.and_utc()),
        SqlValue::TimestampTz(ts) if *ty == Type::TIMESTAMPTZ => Box::new(*ts),
        SqlValue::TimestampTz(ts) if *ty == Type::TIMESTAMP => Box::new(ts.naive_utc()),
        SqlValue::Date(d) if *ty == Type::DATE => Box::new(*d),
        _ => return Err(unsupported()),
    };
    Ok(boxed)
}

/// Integers bind to any integer or float parameter they fit exactly.
fn integer_for(value: i64, ty: &Type, position: usize) -> Result<BoxedParam> {
    let out_of_range = || {
        StoreError::Query(format!(
            "value {} does not fit parameter ${} of type {}",
            value, position, ty
        ))
    };

    if *ty == Type::INT2 {
        let v = i16::try_from(value).map_err(|_| out_of_range())?;
        Ok(Box::new(v))
    } else if *ty == Type::INT4 {
        let v = i32::try_from(value).map_err(|_| out_of_range())?;
        Ok(Box::new(v))
    } else if *ty == Type::INT8 {
        Ok(Box::new(value))
    } else if *ty == Type::FLOAT8 {
        let v = value as f64;
        if v as i128 != i128::from(value) {
            return Err(out_of_range());
        }
        Ok(Box::new(v))
    } else if *ty == Type::FLOAT4 {
        let v = value as f32;
        if v as i128 != i128::from(value) {
            return Err(out_of_range());
        }
        Ok(Box::new(v))
    } else {
        Err(StoreError::Query(format!(
            "cannot bind an integer to parameter ${} of type {}",
            position, ty
        )))
    }
}

/// A NULL typed to match the parameter, so the driver's type check passes.
/// `None` when the parameter type has no native counterpart.
fn null_for(ty: &Type) -> Option<BoxedParam> {
    let boxed: BoxedParam = if *ty == Type::BOOL {
        Box::new(None::<bool>)
    } else if *ty == Type::INT2 {
        Box::new(None::<i16>)
    } else if *ty == Type::INT4 {
        Box::new(None::<i32>)
    } else if *ty == Type::INT8 {
        Box::new(None::<i64>)
    } else if *ty == Type::FLOAT4 {
        Box::new(None::<f32>)
    } else if *ty == Type::FLOAT8 {
        Box::new(None::<f64>)
    } else if *ty == Type::TIMESTAMP {
        Box::new(None::<NaiveDateTime>)
    } else if *ty == Type::TIMESTAMPTZ {
        Box::new(None::<DateTime<Utc>>)
    } else if *ty == Type::DATE {
        Box::new(None::<NaiveDate>)
    } else if is_text(ty) {
        Box::new(None::<String>)
    } else {
        return None;
    };
    Some(boxed)
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Vec<SqlValue>> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| decode_value(row, i, col))
        .collect()
}

/// Decode one column into a SqlValue according to its declared type.
fn decode_value(
    row: &tokio_postgres::Row,
    index: usize,
    column: &tokio_postgres::Column,
) -> Result<SqlValue> {
    let ty = column.type_();
    let decode_err = |e: tokio_postgres::Error| {
        StoreError::Query(format!("cannot decode column {}: {}", column.name(), e))
    };

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map_err(decode_err)?
            .map(|v| SqlValue::Int32(i32::from(v)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Int32)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Int64)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map_err(decode_err)?
            .map(|v| SqlValue::Float64(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Float64)
    } else if is_text(ty) {
        row.try_get::<_, Option<String>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Text)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Timestamp)
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(index)
            .map_err(decode_err)?
            .map(SqlValue::TimestampTz)
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(index)
            .map_err(decode_err)?
            .map(SqlValue::Date)
    } else {
        return Err(StoreError::Query(format!(
            "column {} has unsupported type {}; cast it in the projection",
            column.name(),
            ty
        )));
    };

    Ok(value.unwrap_or(SqlValue::Null))
}
