use crate::builders::{Delete, Insert, Select, SelectWithTable, Update};
use crate::clauses::{Order, WhereClause};
use crate::error::{Result, StoreError};
use crate::store::DataStore;
use crate::traits::Table;
use crate::types::Row;

use super::schema::Books;

/// Values for a new or replaced book.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub category_id: Option<i64>,
}

fn select_books() -> SelectWithTable {
    let c = Books::columns();
    Select::columns(&[
        &c.id,
        &c.title,
        &c.author,
        &c.year,
        &c.isbn,
        &c.category_id,
        &c.available,
        &c.added_at,
    ])
    .from(Books)
}

/// Insert a book and return its generated id.
/// A duplicate ISBN or unknown category fails with `StoreError::Constraint`.
pub async fn add_book(store: &DataStore, book: &NewBook) -> Result<i64> {
    let c = Books::columns();
    let outcome = Insert::into(Books)
        .value(&c.title, &book.title)
        .value(&c.author, &book.author)
        .value(&c.year, book.year)
        .value(&c.isbn, book.isbn.as_ref())
        .value(&c.category_id, book.category_id)
        .returning(&c.id)
        .execute(store)
        .await?;

    outcome
        .generated_id
        .ok_or_else(|| StoreError::Query("INSERT INTO livres returned no id".to_string()))
}

pub async fn find_book_by_id(store: &DataStore, id: i64) -> Result<Option<Row>> {
    select_books()
        .where_(WhereClause::eq(&Books::columns().id, id))
        .fetch_optional(store)
        .await
}

pub async fn all_books(store: &DataStore) -> Result<Vec<Row>> {
    select_books()
        .order_by(&Books::columns().id, Order::Asc)
        .fetch_all(store)
        .await
}

/// Replace every editable field of a book. Returns the affected-row count.
pub async fn update_book(store: &DataStore, id: i64, book: &NewBook, available: bool) -> Result<u64> {
    let c = Books::columns();
    let outcome = Update::table(Books)
        .set(&c.title, &book.title)
        .set(&c.author, &book.author)
        .set(&c.year, book.year)
        .set(&c.isbn, book.isbn.as_ref())
        .set(&c.category_id, book.category_id)
        .set(&c.available, available)
        .where_(WhereClause::eq(&c.id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

pub async fn mark_book_unavailable(store: &DataStore, id: i64) -> Result<u64> {
    let c = Books::columns();
    let outcome = Update::table(Books)
        .set(&c.available, false)
        .where_(WhereClause::eq(&c.id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

/// Fails with a foreign-key `Constraint` error while loans still reference the book.
pub async fn delete_book(store: &DataStore, id: i64) -> Result<u64> {
    let outcome = Delete::from(Books)
        .where_(WhereClause::eq(&Books::columns().id, id))
        .execute(store)
        .await?;
    Ok(outcome.rows)
}

/// Case-insensitive search on title or author. The term matches literally.
pub async fn search_books(store: &DataStore, term: &str) -> Result<Vec<Row>> {
    let c = Books::columns();
    select_books()
        .where_(WhereClause::contains(&c.title, term).or(WhereClause::contains(&c.author, term)))
        .order_by(&c.id, Order::Asc)
        .fetch_all(store)
        .await
}
