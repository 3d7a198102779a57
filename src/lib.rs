//! pgstore - injection-safe CRUD and aggregate queries over PostgreSQL
//!
//! One [`DataStore`] owns one session. Every per-call value travels as a
//! bind parameter; table and column names come only from [`Table`] and
//! [`Column`] implementations declared in code.
//!
//! # Example
//! ```ignore
//! use pgstore::{params, ConnectParams, DataStore, Statement};
//!
//! let store = DataStore::connect(&ConnectParams::from_env()?).await?;
//!
//! let inserted = store
//!     .execute(
//!         &Statement::with_params(
//!             "INSERT INTO utilisateurs (nom, prenom, email) VALUES ($1, $2, $3) RETURNING id",
//!             params!["Dupont", "Marie", "marie.dupont@email.com"],
//!         )
//!         .returning_generated_key(),
//!     )
//!     .await?;
//!
//! let row = store
//!     .query_one(&Statement::new("SELECT nom FROM utilisateurs WHERE id = $1").bind(inserted.generated_id))
//!     .await?;
//! ```

pub mod builders;
pub mod clauses;
pub mod config;
pub mod drivers;
pub mod error;
pub mod library;
pub mod statement;
pub mod traits;
pub mod types;

mod store;

// Re-export main types for convenient access
pub use clauses::{Order, WhereClause};
pub use config::ConnectParams;
pub use error::{ConstraintKind, Result, StoreError};
pub use statement::{Statement, StatementTemplate};
pub use store::DataStore;
pub use traits::{Column, DatabaseDriver, StaticColumn, Table};
pub use types::{AffectedRows, FromSqlValue, QueryResult, RawQueryResult, Row, SqlValue};
