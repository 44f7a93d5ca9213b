use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An order document ready for submission to the commerce API.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRequest {
    /// The local order number, carried upstream for traceability.
    pub external_ref: String,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub lines: Vec<DocumentLineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentLineItem {
    pub code: String,
    pub quantity: i64,
    /// Unit price in major currency units, the way the upstream API expects it.
    pub unit_price: f64,
    pub discount_percent: f64,
    pub tax_class: String,
}

/// The outcome of a document submission. Non-2xx statuses are reported here rather than as
/// errors, since the caller decides how to record a rejection.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub status: u16,
    pub body: Value,
}

/// One page of the stock-level feed.
#[derive(Debug, Clone, Deserialize)]
pub struct StockFeedPage {
    #[serde(default)]
    pub data: Vec<StockEntry>,
    /// Opaque continuation token, when the API paginates by cursor.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Page-number style continuation flag, when it does not.
    #[serde(default)]
    pub has_more: bool,
}

/// A raw stock record as the feed returns it. SKU information is spotty upstream: some records
/// carry the code directly, some only on the embedded variant, and some only link to the variant
/// detail resource.
#[derive(Debug, Clone, Deserialize)]
pub struct StockEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub variant: Option<VariantRef>,
    /// Quantities are decimal upstream (bulk goods are weighed).
    #[serde(default)]
    pub quantity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantRef {
    #[serde(default)]
    pub code: Option<String>,
    /// Relative path of the variant detail resource, e.g. "/variants/8812".
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VariantDetail {
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stock_page_deserializes_sparse_records() {
        let json = r#"{
            "data": [
                {"code": "A1", "quantity": 12.0},
                {"variant": {"code": "B2"}, "quantity": 3.5},
                {"variant": {"href": "/variants/99"}, "quantity": 1.0}
            ],
            "next_cursor": "abc"
        }"#;
        let page: StockFeedPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
        assert!(!page.has_more);
        assert_eq!(page.data[2].variant.as_ref().unwrap().href.as_deref(), Some("/variants/99"));
    }
}
