use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatusType},
    traits::StoreError,
};

/// Inserts a new order row. Orders normally arrive from the storefront outside this subsystem;
/// this exists for the storage API surface and for test fixtures.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (order_number, customer_name, customer_email, memo)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.memo)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, sku, quantity, unit_price, discount_percent) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(item.sku.as_str())
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.discount_percent)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_number(number: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_number = $1").bind(number).fetch_optional(conn).await?;
    Ok(order)
}

/// Orders that still need a submission attempt, in insertion order so successive passes visit
/// them fairly. `Processing` is included deliberately: a poller that crashed between claim and
/// submit leaves its order in `Processing`, and re-claiming it later is safe because the claim
/// is conditional.
pub async fn fetch_awaiting_submission(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE status IN ('Pending', 'Processing', 'Error') AND processed_at IS NULL
        ORDER BY id ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await?;
    trace!("📦️ fetch_awaiting_submission returned {} orders", orders.len());
    Ok(orders)
}

/// The conditional claim. The UPDATE only matches while the status column still holds the value
/// the caller observed, so of N concurrent claimers exactly one sees a row count of 1.
pub async fn claim_order(
    id: i64,
    expected: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE orders SET status = 'Processing', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected.to_string())
            .execute(conn)
            .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn record_submission_success(
    id: i64,
    document_id: &str,
    raw_response: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'Processed',
            processed_at = CURRENT_TIMESTAMP,
            remote_document_id = $1,
            remote_response = $2,
            last_error = NULL,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(document_id)
    .bind(raw_response)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(StoreError::OrderNotFound(id))
}

pub async fn record_submission_failure(
    id: i64,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = 'Error', last_error = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(reason)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(StoreError::OrderNotFound(id))
}

/// Resets an order so the next discovery pass picks it up again.
pub async fn requeue_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let result = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'Pending',
            processed_at = NULL,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}
