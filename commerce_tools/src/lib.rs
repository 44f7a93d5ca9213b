//! A thin client for the commerce platform's REST API.
//!
//! The client covers exactly the three capabilities the sync gateway consumes: submitting an order
//! document, streaming the paginated stock-level feed, and resolving a variant detail handle to a
//! SKU code. Everything else the platform offers is out of scope.

mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::CommerceApi;
pub use config::CommerceConfig;
pub use data_objects::{DocumentLineItem, DocumentRequest, StockEntry, StockFeedPage, SubmitOutcome, VariantRef};
pub use error::CommerceApiError;
