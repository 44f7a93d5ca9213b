use std::time::Duration;

use log::*;
use sync_engine::{
    reconcilers::{OrderReconciler, StockReconciler},
    traits::OrderStore,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

use crate::{config::SyncConfig, integrations::commerce::CommerceRemoteAdapter};

/// Starts the order fulfillment worker. Do not await the returned JoinHandle, as it will run
/// indefinitely. Ticks are serialized: the next pass only starts once the previous one finished.
pub fn start_order_worker(db: SqliteDatabase, remote: CommerceRemoteAdapter, config: SyncConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(config.startup_delay).await;
        let reconciler = OrderReconciler::new(db, remote, config.order_batch_size);
        let mut timer = tokio::time::interval(config.order_poll_interval);
        info!("🕰️ Order fulfillment worker started (every {:?})", config.order_poll_interval);
        loop {
            timer.tick().await;
            match reconciler.run_pass().await {
                Ok(summary) if summary.discovered == 0 => trace!("🕰️ Order pass: nothing to submit"),
                Ok(summary) => info!("🕰️ Order pass complete: {summary}"),
                // The pass is over but the timer must keep ticking; the next pass retries.
                Err(e) => error!("🕰️ Order pass aborted: {e}"),
            }
        }
    })
}

/// Starts the stock synchronization worker. Do not await the returned JoinHandle.
pub fn start_stock_worker(db: SqliteDatabase, remote: CommerceRemoteAdapter, config: SyncConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(config.startup_delay).await;
        let reconciler = StockReconciler::new(db, remote, config.stock.clone());
        let mut timer = tokio::time::interval(config.stock_poll_interval);
        info!("🕰️ Stock sync worker started (every {:?})", config.stock_poll_interval);
        loop {
            timer.tick().await;
            match reconciler.run_pass().await {
                Ok(summary) => info!("🕰️ Stock pass complete: {summary}"),
                Err(e) => error!("🕰️ Stock pass aborted: {e}"),
            }
        }
    })
}

/// Schedules a debounced requeue of a single order, giving the upstream write time to propagate
/// before the poller goes looking for it. Fire-and-forget; the outcome is only observable via
/// the order's status.
pub fn schedule_requeue(db: SqliteDatabase, order_id: i64, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match db.requeue_order(order_id).await {
            Ok(Some(order)) => info!("🔔️ Order {} requeued for submission", order.order_number),
            Ok(None) => warn!("🔔️ Requeue requested for unknown order id {order_id}"),
            Err(e) => error!("🔔️ Could not requeue order {order_id}: {e}"),
        }
    })
}
