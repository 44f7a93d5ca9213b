//! The two reconciliation engines.
//!
//! Each reconciler is generic over the trait seams in [`crate::traits`] and runs one bounded
//! *pass* at a time; a scheduler (in the server crate) decides when passes happen. A pass never
//! lets a per-order or per-record failure escape: those are recorded and the pass continues.
//! Only pass-level failures (storage down, page fetch exhausted its retries) surface as errors,
//! and even those are absorbed by the scheduling worker so the timer keeps ticking.

mod order;
mod stock;

use thiserror::Error;

pub use order::{OrderPassSummary, OrderReconciler};
pub use stock::{StockPassSummary, StockReconciler, StockSyncConfig};

use crate::traits::{RemoteError, StoreError};

/// A pass-aborting failure in either reconciler.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
    #[error("Remote API failure: {0}")]
    Remote(#[from] RemoteError),
}
