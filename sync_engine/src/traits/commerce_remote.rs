use thiserror::Error;

use crate::traits::data_objects::{DocumentPayload, InventoryPage, PageCursor, SubmitResponse};

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Timeout or connection failure. The operation may be retried on a later pass.
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The upstream API throttled the request.
    #[error("Rate limited by the remote API")]
    RateLimited,
    /// A non-2xx answer on a read path.
    #[error("Remote rejection. Status {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Remote resource not found: {0}")]
    NotFound(String),
    #[error("Unusable remote response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether this error indicates the requested scope filter is inaccessible (auth or
    /// not-found class), as opposed to a transient failure. Drives the one-shot unscoped
    /// fallback on the first stock page.
    pub fn is_scope_rejection(&self) -> bool {
        match self {
            RemoteError::NotFound(_) => true,
            RemoteError::Rejected { status, .. } => matches!(status, 401 | 403 | 404),
            _ => false,
        }
    }
}

/// The remote commerce API, as the reconcilers consume it.
#[allow(async_fn_in_trait)]
pub trait CommerceRemote {
    /// Submits an order document. Implementations return `Ok` for any HTTP-level answer,
    /// including rejections; `Err` is reserved for transport-class failures.
    async fn submit_document(&self, payload: &DocumentPayload) -> Result<SubmitResponse, RemoteError>;

    /// Fetches one page of the stock feed, optionally scoped to a warehouse.
    async fn fetch_inventory_page(&self, cursor: &PageCursor, scope: Option<String>) -> Result<InventoryPage, RemoteError>;

    /// Resolves a variant detail handle to its SKU code.
    async fn resolve_variant_code(&self, handle: &str) -> Result<String, RemoteError>;
}
