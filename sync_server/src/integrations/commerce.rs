//! Adapts the commerce HTTP client to the engine's [`CommerceRemote`] seam: shape mapping in
//! both directions plus error-taxonomy translation. No behavior lives here beyond that.

use commerce_tools::{CommerceApi, CommerceApiError, DocumentLineItem, DocumentRequest, StockEntry, StockFeedPage};
use sync_engine::traits::{
    CommerceRemote,
    DocumentPayload,
    InventoryPage,
    PageCursor,
    RawStockLevel,
    RemoteError,
    SubmitResponse,
};

#[derive(Clone)]
pub struct CommerceRemoteAdapter {
    api: CommerceApi,
}

impl CommerceRemoteAdapter {
    pub fn new(api: CommerceApi) -> Self {
        Self { api }
    }
}

impl CommerceRemote for CommerceRemoteAdapter {
    async fn submit_document(&self, payload: &DocumentPayload) -> Result<SubmitResponse, RemoteError> {
        let request = document_request_from(payload);
        let outcome = self.api.submit_document(&request).await.map_err(remote_error_from)?;
        Ok(SubmitResponse { status: outcome.status, body: outcome.body })
    }

    async fn fetch_inventory_page(&self, cursor: &PageCursor, scope: Option<String>) -> Result<InventoryPage, RemoteError> {
        let scope = scope.as_deref();
        let page = match cursor {
            PageCursor::Page(n) => self.api.fetch_stock_levels(None, *n, scope).await,
            PageCursor::Token(t) => self.api.fetch_stock_levels(Some(t), 1, scope).await,
        }
        .map_err(remote_error_from)?;
        Ok(inventory_page_from(page, cursor))
    }

    async fn resolve_variant_code(&self, handle: &str) -> Result<String, RemoteError> {
        self.api.resolve_variant_code(handle).await.map_err(remote_error_from)
    }
}

fn document_request_from(payload: &DocumentPayload) -> DocumentRequest {
    let lines = payload
        .lines
        .iter()
        .map(|line| DocumentLineItem {
            code: line.code.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.to_major_units(),
            discount_percent: line.discount_percent,
            tax_class: line.tax_class.clone(),
        })
        .collect();
    DocumentRequest {
        external_ref: payload.order_number.clone(),
        customer_name: payload.customer_name.clone(),
        customer_email: payload.customer_email.clone(),
        note: payload.note.clone(),
        lines,
    }
}

fn inventory_page_from(page: StockFeedPage, current: &PageCursor) -> InventoryPage {
    let items = page.data.into_iter().map(raw_stock_level_from).collect();
    // A continuation token from the feed wins; otherwise `has_more` advances the page number.
    let next = match (page.next_cursor, page.has_more, current) {
        (Some(token), _, _) => Some(PageCursor::Token(token)),
        (None, true, PageCursor::Page(n)) => Some(PageCursor::Page(n + 1)),
        _ => None,
    };
    InventoryPage { items, next }
}

fn raw_stock_level_from(entry: StockEntry) -> RawStockLevel {
    let (variant_sku, variant_handle) = match entry.variant {
        Some(variant) => (variant.code, variant.href),
        None => (None, None),
    };
    RawStockLevel { sku: entry.code, variant_sku, variant_handle, quantity: entry.quantity }
}

fn remote_error_from(e: CommerceApiError) -> RemoteError {
    match e {
        CommerceApiError::Transport(s) | CommerceApiError::Initialization(s) => RemoteError::Transport(s),
        CommerceApiError::RateLimited => RemoteError::RateLimited,
        CommerceApiError::NotFound(path) => RemoteError::NotFound(path),
        CommerceApiError::QueryError { status, message } => RemoteError::Rejected { status, message },
        CommerceApiError::JsonError(s) => RemoteError::InvalidResponse(s),
    }
}
