//! Order & Stock Sync Engine
//!
//! The core of the sync gateway: two reconcilers that bring a local order store and a remote
//! commerce platform into agreement.
//!
//! 1. The [`reconcilers::OrderReconciler`] discovers orders awaiting submission, claims each one
//!    with an atomic conditional status update, submits an order document to the remote API and
//!    records the outcome on the order row. Correctness under concurrent pollers rests entirely
//!    on the conditional claim.
//! 2. The [`reconcilers::StockReconciler`] pages through the remote stock feed, normalizes each
//!    record to a `{sku, quantity}` pair (resolving incomplete identifiers via bounded concurrent
//!    lookups) and upserts the local stock table with last-write-wins semantics.
//!
//! Storage and the remote API are consumed through the trait seams in [`traits`]; the SQLite
//! backend ([`SqliteDatabase`]) is the only storage implementation. Reconciler logic never
//! touches SQL or HTTP directly, which is what makes it testable with mocked seams.

pub mod db_types;
pub mod reconcilers;
pub mod traits;

mod sqlite;

pub use sqlite::SqliteDatabase;
