//! `SqliteDatabase` is the concrete storage backend for the sync gateway. It implements the
//! [`OrderStore`] and [`StockStore`] traits over a SQLite connection pool.
use std::fmt::Debug;

use log::debug;
use sqlx::SqlitePool;

use super::db::{self, orders, stock};
use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatusType, StockRecord},
    traits::{OrderStore, StockLevelUpdate, StockStore, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = db::new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await
    }

    /// Creates an order with its items in one transaction. Order creation is the storefront's
    /// job in production; the sync engine only needs this for its own test fixtures and tooling.
    pub async fn insert_order_with_items(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        orders::insert_order_items(order.id, items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} inserted with id {} and {} items", order.order_number, order.id, items.len());
        Ok(order)
    }

    pub async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_id(id, &mut conn).await?)
    }

    pub async fn fetch_order_by_number(&self, number: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    pub async fn fetch_stock_level(&self, sku: &str) -> Result<Option<StockRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(stock::fetch_stock_level(sku, &mut conn).await?)
    }

    pub async fn stock_level_count(&self) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(stock::stock_level_count(&mut conn).await?)
    }
}

impl OrderStore for SqliteDatabase {
    async fn fetch_orders_awaiting_submission(&self, limit: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_awaiting_submission(limit, &mut conn).await?)
    }

    async fn claim_order(&self, id: i64, expected: OrderStatusType) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::claim_order(id, expected, &mut conn).await?)
    }

    async fn record_submission_success(&self, id: i64, document_id: &str, raw_response: &str) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::record_submission_success(id, document_id, raw_response, &mut conn).await
    }

    async fn record_submission_failure(&self, id: i64, reason: &str) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::record_submission_failure(id, reason, &mut conn).await
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_items(order_id, &mut conn).await?)
    }

    async fn requeue_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::requeue_order(id, &mut conn).await?;
        if let Some(o) = &order {
            debug!("🗃️ Order {} requeued for submission", o.order_number);
        }
        Ok(order)
    }
}

impl StockStore for SqliteDatabase {
    /// The whole batch goes through one transaction: either every row lands or none do, so a
    /// rejected row cannot leave the page half-applied.
    async fn upsert_stock_levels(&self, updates: &[StockLevelUpdate]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for update in updates {
            stock::upsert_stock_level(update, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Upserted {} stock levels", updates.len());
        Ok(())
    }
}
