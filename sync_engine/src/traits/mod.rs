//! Interface contracts between the reconcilers and the outside world.
//!
//! The reconcilers only ever talk to two collaborators: the storage backend (split into
//! [`OrderStore`] and [`StockStore`]) and the remote commerce API ([`CommerceRemote`]). The
//! SQLite backend in this crate implements the storage traits; the server crate adapts the
//! commerce HTTP client to [`CommerceRemote`]. Tests substitute mocks for either side.
//!
//! The one concurrency-critical contract lives here: [`OrderStore::claim_order`] must be an
//! atomic compare-and-swap on the order's status column. Without that atomicity, two pollers can
//! submit the same order twice.

mod commerce_remote;
mod data_objects;
mod storage;

pub use commerce_remote::{CommerceRemote, RemoteError};
pub use data_objects::{DocumentLine, DocumentPayload, InventoryPage, PageCursor, RawStockLevel, StockLevelUpdate, SubmitResponse};
pub use storage::{OrderStore, StockStore, StoreError};
