use std::sync::Arc;

use pgstore::builders::{Delete, Insert, Select, Update};
use pgstore::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use pgstore::traits::{DatabaseDriver, Table};
use pgstore::types::SqlValue;
use pgstore::{params, DataStore, Order, StoreError, WhereClause};

pgstore::table! {
    struct Users("users") {
        UsersColumns { id: "id", name: "name" }
    }
}

fn store_over(driver: &Arc<InMemoryTestDriver>) -> DataStore {
    let driver: Arc<dyn DatabaseDriver> = Arc::clone(driver) as Arc<dyn DatabaseDriver>;
    DataStore::with_driver(driver)
}

#[tokio::test]
async fn test_simple_select_single_column() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(params![1])
                .build(),
        ),
    );
    let store = store_over(&in_memory_test_driver);

    let row = Select::columns(&[&Users::columns().id])
        .from(Users)
        .fetch_optional(&store)
        .await
        .unwrap()
        .unwrap();

    // Verify the query that was executed
    in_memory_test_driver.assert_last_query("SELECT users.id FROM users", &[]);
    in_memory_test_driver.assert_query_count(1);

    // Verify the result
    assert_eq!(row.get::<i32, _>(&Users::columns().id).unwrap(), 1);
}

#[tokio::test]
async fn test_select_with_where_order_and_limit() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(params![1])
                .row(params![2])
                .row(params![3])
                .build(),
        ),
    );
    let store = store_over(&in_memory_test_driver);

    let rows = Select::columns(&[&Users::columns().id])
        .from(Users)
        .where_(WhereClause::eq(&Users::columns().name, "Test"))
        .order_by(&Users::columns().id, Order::Asc)
        .limit(3)
        .fetch_all(&store)
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT users.id FROM users WHERE users.name = $1 ORDER BY users.id ASC LIMIT $2",
        &[SqlValue::Text("Test".to_string()), SqlValue::Int64(3)],
    );

    // Verify we got multiple rows, in order
    assert_eq!(rows.len(), 3);
    let ids: Vec<i64> = rows
        .iter()
        .map(|r| r.get(&Users::columns().id).unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_select_empty_result_is_not_an_error() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(
        InMemoryTestResponseBuilder::new().columns(&["id"]).build(), // No rows
    ));
    let store = store_over(&in_memory_test_driver);

    let row = Select::columns(&[&Users::columns().id])
        .from(Users)
        .where_(WhereClause::eq(&Users::columns().id, 999))
        .fetch_optional(&store)
        .await
        .unwrap();
    assert!(row.is_none());

    // unscripted statements return no rows
    let rows = Select::columns(&[&Users::columns().id])
        .from(Users)
        .fetch_all(&store)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_fetch_optional_rejects_several_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(params![1])
                .row(params![2])
                .build(),
        ),
    );
    let store = store_over(&in_memory_test_driver);

    let err = Select::columns(&[&Users::columns().id])
        .from(Users)
        .fetch_optional(&store)
        .await
        .unwrap_err();

    match err {
        StoreError::UnexpectedRowCount { expected, actual } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        _ => panic!("Expected UnexpectedRowCount error"),
    }
}

#[tokio::test]
async fn test_multiple_queries() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["id"])
                    .row(params![1])
                    .build(),
            )
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["name"])
                    .row(params!["Alice"])
                    .build(),
            ),
    );
    let store = store_over(&in_memory_test_driver);

    let first = Select::columns(&[&Users::columns().id])
        .from(Users)
        .fetch_optional(&store)
        .await
        .unwrap()
        .unwrap();

    let second = Select::columns(&[&Users::columns().name])
        .from(Users)
        .fetch_optional(&store)
        .await
        .unwrap()
        .unwrap();

    // Verify both queries were recorded
    in_memory_test_driver.assert_query_count(2);

    let queries = in_memory_test_driver.recorded_queries();
    assert_eq!(queries[0].sql, "SELECT users.id FROM users");
    assert_eq!(queries[1].sql, "SELECT users.name FROM users");

    assert_eq!(first.get::<i64, _>(&Users::columns().id).unwrap(), 1);
    assert_eq!(
        second.get::<String, _>(&Users::columns().name).unwrap(),
        "Alice"
    );
}

#[tokio::test]
async fn test_compound_where_clause() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["name"])
                .row(params!["Admin"])
                .build(),
        ),
    );
    let store = store_over(&in_memory_test_driver);

    let row = Select::columns(&[&Users::columns().name])
        .from(Users)
        .where_(
            WhereClause::eq(&Users::columns().name, "Admin")
                .and(WhereClause::eq(&Users::columns().id, 1)),
        )
        .fetch_optional(&store)
        .await
        .unwrap()
        .unwrap();

    // Verify compound WHERE clause
    in_memory_test_driver.assert_last_query(
        "SELECT users.name FROM users WHERE (users.name = $1) AND (users.id = $2)",
        &[SqlValue::Text("Admin".to_string()), SqlValue::Int32(1)],
    );

    assert_eq!(
        row.get::<String, _>(&Users::columns().name).unwrap(),
        "Admin"
    );
}

#[tokio::test]
async fn test_write_builders_report_affected_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["id"])
                    .row(params![12])
                    .build(),
            )
            .with_affected(1)
            .with_affected(0),
    );
    let store = store_over(&in_memory_test_driver);
    let cols = Users::columns();

    let inserted = Insert::into(Users)
        .value(&cols.name, "Grace")
        .returning(&cols.id)
        .execute(&store)
        .await
        .unwrap();
    assert_eq!(inserted.rows, 1);
    assert_eq!(inserted.generated_id, Some(12));

    let updated = Update::table(Users)
        .set(&cols.name, "Grace Hopper")
        .where_(WhereClause::eq(&cols.id, 12))
        .execute(&store)
        .await
        .unwrap();
    assert_eq!(updated.rows, 1);
    assert_eq!(updated.generated_id, None);

    let deleted = Delete::from(Users)
        .where_(WhereClause::eq(&cols.id, 13))
        .execute(&store)
        .await
        .unwrap();
    assert_eq!(deleted.rows, 0);

    let queries = in_memory_test_driver.recorded_queries();
    assert_eq!(
        queries[0].sql,
        "INSERT INTO users (name) VALUES ($1) RETURNING id"
    );
    assert_eq!(
        queries[1].sql,
        "UPDATE users SET name = $1 WHERE users.id = $2"
    );
    assert_eq!(queries[2].sql, "DELETE FROM users WHERE users.id = $1");
}
