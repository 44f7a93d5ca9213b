use thiserror::Error;

use crate::{
    db_types::{Order, OrderItem, OrderStatusType},
    traits::data_objects::StockLevelUpdate,
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order with id {0} does not exist")]
    OrderNotFound(i64),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// Read and write operations against the order collections, as the order reconciler consumes
/// them.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Fetches up to `limit` orders that still need a submission attempt: status in
    /// {Pending, Processing, Error} and `processed_at` unset, ordered by id so that every pass
    /// visits orders in a stable, fair order.
    async fn fetch_orders_awaiting_submission(&self, limit: i64) -> Result<Vec<Order>, StoreError>;

    /// Atomically moves the order to `Processing`, guarded by the status the caller last
    /// observed. Returns `false` when the guard does not match, which means another poller got
    /// there first and this order must be skipped without error.
    ///
    /// This compare-and-swap is the only thing standing between concurrent pollers and duplicate
    /// document submission, so implementations must guarantee its atomicity.
    async fn claim_order(&self, id: i64, expected: OrderStatusType) -> Result<bool, StoreError>;

    /// Records a successful submission: status `Processed`, `processed_at` stamped, the remote
    /// document id and raw response stored, `last_error` cleared.
    async fn record_submission_success(&self, id: i64, document_id: &str, raw_response: &str) -> Result<Order, StoreError>;

    /// Records a failed attempt: status `Error` with the reason in `last_error`. The order
    /// remains eligible for the next discovery pass.
    async fn record_submission_failure(&self, id: i64, reason: &str) -> Result<Order, StoreError>;

    /// Fetches the items belonging to an order.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError>;

    /// Resets an order to `Pending` and clears `processed_at`, making it visible to the next
    /// discovery pass. This is the manual-trigger surface invoked (after a debounce delay) by
    /// the inbound notification handler. Returns `None` when the order does not exist.
    async fn requeue_order(&self, id: i64) -> Result<Option<Order>, StoreError>;
}

/// Write operations against the stock collection, as the stock reconciler consumes them.
#[allow(async_fn_in_trait)]
pub trait StockStore {
    /// Insert-or-replace each `{sku, quantity}` pair, keyed on SKU, stamping `updated_at`.
    /// Last write wins; any row rejection fails the whole batch.
    async fn upsert_stock_levels(&self, updates: &[StockLevelUpdate]) -> Result<(), StoreError>;
}
