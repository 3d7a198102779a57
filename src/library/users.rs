use chrono::NaiveDateTime;

use crate::builders::{Delete, Insert, Select, SelectWithTable, Update};
use crate::clauses::{Order, WhereClause};
use crate::error::{Result, StoreError};
use crate::store::DataStore;
use crate::traits::Table;
use crate::types::Row;

use super::schema::Users;

/// Values for a new library member.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: Option<String>,
}

fn select_users() -> SelectWithTable {
    let c = Users::columns();
    Select::columns(&[
        &c.id,
        &c.last_name,
        &c.first_name,
        &c.email,
        &c.phone,
        &c.registered_at,
        &c.loan_count,
    ])
    .from(Users)
}

/// Insert a member and return the generated id.
/// An e-mail already in use fails with a unique `StoreError::Constraint`.
pub async fn add_user(store: &DataStore, user: &NewUser) -> Result<i64> {
    let c = Users::columns();
    let outcome = Insert::into(Users)
        .value(&c.last_name, &user.last_name)
        .value(&c.first_name, &user.first_name)
        .value(&c.email, &user.email)
        .value(&c.phone, user.phone.as_ref())
        .returning(&c.id)
        .execute(store)
        .await?;

    outcome
        .generated_id
        .ok_or_else(|| StoreError::Query("INSERT INTO utilisateurs returned no id".to_string()))
}

pub async fn find_user_by_id(store: &DataStore, id: i64) -> Result<Option<Row>> {
    select_users()
        .where_(WhereClause::eq(&Users::columns().id, id))
        .fetch_optional(store)
        .await
}

pub async fn all_users(store: &DataStore) -> Result<Vec<Row>> {
    select_users()
        .order_by(&Users::columns().id, Order::Asc)
        .fetch_all(store)
        .await
}

/// Name and e-mail of members registered after `since`, sorted by last
/// name in `order`, then by id.
pub async fn users_registered_after(
    store: &DataStore,
    since: NaiveDateTime,
    order: Order,
) -> Result<Vec<Row>> {
    let c = Users::columns();
    Select::columns(&[&c.id, &c.last_name, &c.first_name, &c.email])
        .from(Users)
        .where_(WhereClause::gt(&c.registered_at, since))
        .order_by(&c.last_name, order)
        .order_by(&c.id, Order::Asc)
        .fetch_all(store)
        .await
}

pub async fn update_email(store: &DataStore, id: i64, email: &str) -> Result<u64> {
    let c = Users::columns();
    let outcome = Update::table(Users)
        .set(&c.email, email)
        .where_(WhereClause::eq(&c.id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

pub async fn update_user(store: &DataStore, id: i64, last_name: &str, email: &str) -> Result<u64> {
    let c = Users::columns();
    let outcome = Update::table(Users)
        .set(&c.last_name, last_name)
        .set(&c.email, email)
        .where_(WhereClause::eq(&c.id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

pub async fn delete_user(store: &DataStore, id: i64) -> Result<u64> {
    let outcome = Delete::from(Users)
        .where_(WhereClause::eq(&Users::columns().id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

pub async fn delete_users_registered_before(store: &DataStore, before: NaiveDateTime) -> Result<u64> {
    let outcome = Delete::from(Users)
        .where_(WhereClause::lt(&Users::columns().registered_at, before))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}
