use chrono::NaiveDateTime;

use crate::builders::{Insert, Select, Update};
use crate::clauses::{Order, WhereClause};
use crate::error::{Result, StoreError};
use crate::store::DataStore;
use crate::traits::Table;
use crate::types::Row;

use super::schema::Loans;

/// Record a loan starting now and return its id.
/// Unknown user or book ids fail with a foreign-key `StoreError::Constraint`.
pub async fn record_loan(store: &DataStore, user_id: i64, book_id: i64, due_at: NaiveDateTime) -> Result<i64> {
    let c = Loans::columns();
    let outcome = Insert::into(Loans)
        .value(&c.user_id, user_id)
        .value(&c.book_id, book_id)
        .value(&c.due_at, due_at)
        .returning(&c.id)
        .execute(store)
        .await?;

    outcome
        .generated_id
        .ok_or_else(|| StoreError::Query("INSERT INTO emprunts returned no id".to_string()))
}

/// Close an open loan. Returns 0 when the loan does not exist or was
/// already returned.
pub async fn return_loan(store: &DataStore, loan_id: i64, returned_at: NaiveDateTime) -> Result<u64> {
    let c = Loans::columns();
    let outcome = Update::table(Loans)
        .set(&c.returned_at, returned_at)
        .where_(WhereClause::eq(&c.id, loan_id).and(WhereClause::is_null(&c.returned_at)))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

/// Loans not yet returned, oldest first.
pub async fn open_loans(store: &DataStore) -> Result<Vec<Row>> {
    let c = Loans::columns();
    Select::columns(&[&c.id, &c.user_id, &c.book_id, &c.borrowed_at, &c.due_at])
        .from(Loans)
        .where_(WhereClause::is_null(&c.returned_at))
        .order_by(&c.borrowed_at, Order::Asc)
        .order_by(&c.id, Order::Asc)
        .fetch_all(store)
        .await
}
