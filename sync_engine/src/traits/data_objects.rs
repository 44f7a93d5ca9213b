use osg_common::Money;
use serde_json::Value;

//--------------------------------------  Order submission  ----------------------------------------------------------

/// The structural contract for an outbound order document. The remote adapter maps this onto
/// whatever wire shape the commerce API wants; the reconciler only deals in these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub note: Option<String>,
    pub lines: Vec<DocumentLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLine {
    pub code: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount_percent: f64,
    pub tax_class: String,
}

/// An HTTP-level answer to a document submission. Carries non-2xx statuses as data rather than
/// errors; the reconciler decides how to record a rejection.
#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: Value,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The remote document identifier, if the body carries a recognizable one. Accepts both
    /// numeric and string ids.
    pub fn document_id(&self) -> Option<String> {
        match &self.body["id"] {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

//--------------------------------------   Stock feed   --------------------------------------------------------------

/// Position in the paginated stock feed. The upstream API paginates either by 1-based page
/// number or by opaque continuation token; the reconciler treats both uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Page(u32),
    Token(String),
}

impl PageCursor {
    pub fn first() -> Self {
        PageCursor::Page(1)
    }
}

/// One page of the stock feed, already lifted out of the wire format. `next` is `None` on the
/// final page.
#[derive(Debug, Clone)]
pub struct InventoryPage {
    pub items: Vec<RawStockLevel>,
    pub next: Option<PageCursor>,
}

/// A stock record as the feed delivers it. SKU information is unreliable upstream: it can sit
/// directly on the record, on the embedded variant, or only be reachable through the variant
/// detail handle.
#[derive(Debug, Clone, Default)]
pub struct RawStockLevel {
    pub sku: Option<String>,
    pub variant_sku: Option<String>,
    /// Handle of the variant detail resource, used for secondary lookup when no code is present.
    pub variant_handle: Option<String>,
    /// Decimal upstream; truncated toward zero when stored.
    pub quantity: f64,
}

impl RawStockLevel {
    /// The SKU, if the record carries one inline: the direct code wins, then the variant code.
    /// Empty strings count as absent.
    pub fn inline_sku(&self) -> Option<&str> {
        self.sku
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.variant_sku.as_deref().filter(|s| !s.is_empty()))
    }
}

/// A resolved `{sku, quantity}` pair ready for upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevelUpdate {
    pub sku: String,
    pub quantity: i64,
}

impl StockLevelUpdate {
    pub fn new<S: Into<String>>(sku: S, quantity: i64) -> Self {
        Self { sku: sku.into(), quantity }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_id_accepts_numeric_and_string_ids() {
        let resp = SubmitResponse { status: 200, body: json!({"id": 777}) };
        assert_eq!(resp.document_id().as_deref(), Some("777"));
        let resp = SubmitResponse { status: 201, body: json!({"id": "DOC-42"}) };
        assert_eq!(resp.document_id().as_deref(), Some("DOC-42"));
    }

    #[test]
    fn document_id_rejects_missing_or_empty_ids() {
        let resp = SubmitResponse { status: 200, body: json!({"result": "ok"}) };
        assert!(resp.document_id().is_none());
        let resp = SubmitResponse { status: 200, body: json!({"id": ""}) };
        assert!(resp.document_id().is_none());
    }

    #[test]
    fn inline_sku_prefers_direct_code() {
        let raw = RawStockLevel {
            sku: Some("A1".into()),
            variant_sku: Some("B2".into()),
            ..Default::default()
        };
        assert_eq!(raw.inline_sku(), Some("A1"));
        let raw = RawStockLevel { variant_sku: Some("B2".into()), ..Default::default() };
        assert_eq!(raw.inline_sku(), Some("B2"));
        let raw = RawStockLevel { sku: Some(String::new()), ..Default::default() };
        assert_eq!(raw.inline_sku(), None);
    }
}
