use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::CommerceConfig,
    data_objects::{DocumentRequest, StockFeedPage, SubmitOutcome, VariantDetail},
    CommerceApiError,
};

#[derive(Clone)]
pub struct CommerceApi {
    config: CommerceConfig,
    client: Arc<Client>,
}

impl CommerceApi {
    pub fn new(config: CommerceConfig) -> Result<Self, CommerceApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let token = format!("Bearer {}", config.api_token.reveal());
        let val = HeaderValue::from_str(&token).map_err(|e| CommerceApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| CommerceApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}{path}", self.config.base_url.trim_end_matches('/'), self.config.api_version)
    }

    async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, CommerceApiError> {
        let url = self.url(path);
        trace!("🛒️ Sending GET query: {url}");
        let mut req = self.client.request(Method::GET, url).timeout(timeout);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| CommerceApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("🛒️ GET query successful. {status}");
            return response.json::<T>().await.map_err(|e| CommerceApiError::JsonError(e.to_string()));
        }
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(CommerceApiError::RateLimited),
            StatusCode::NOT_FOUND => Err(CommerceApiError::NotFound(path.to_string())),
            _ => {
                let message = response.text().await.map_err(|e| CommerceApiError::Transport(e.to_string()))?;
                Err(CommerceApiError::QueryError { status: status.as_u16(), message })
            },
        }
    }

    /// Submits an order document. An HTTP-level answer, 2xx or not, is returned as a
    /// [`SubmitOutcome`] so the caller can record the rejection body; only transport failures
    /// surface as errors.
    pub async fn submit_document(&self, document: &DocumentRequest) -> Result<SubmitOutcome, CommerceApiError> {
        let url = self.url("/documents");
        debug!("🛒️ Submitting document for order {}", document.external_ref);
        let response = self
            .client
            .request(Method::POST, url)
            .timeout(self.config.submit_timeout)
            .json(document)
            .send()
            .await
            .map_err(|e| CommerceApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| CommerceApiError::Transport(e.to_string()))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        info!("🛒️ Document submission for order {} answered with status {status}", document.external_ref);
        Ok(SubmitOutcome { status, body })
    }

    /// Fetches one page of the stock-level feed. Exactly one of `cursor` / `page` drives
    /// pagination: a cursor returned by a previous page wins, otherwise the 1-based page number
    /// is sent.
    pub async fn fetch_stock_levels(
        &self,
        cursor: Option<&str>,
        page: u32,
        scope: Option<&str>,
    ) -> Result<StockFeedPage, CommerceApiError> {
        let limit = self.config.page_size.to_string();
        let mut params: Vec<(&str, String)> = vec![("limit", limit)];
        match cursor {
            Some(c) => params.push(("cursor", c.to_string())),
            None => params.push(("page", page.to_string())),
        }
        if let Some(office) = scope {
            params.push(("office_id", office.to_string()));
        }
        debug!("🛒️ Fetching stock levels (page {page}, cursor: {}, scope: {})", cursor.unwrap_or("none"), scope.unwrap_or("none"));
        let result = self.get_query::<StockFeedPage>("/stock-levels", &params, self.config.fetch_timeout).await?;
        debug!(
            "🛒️ Fetched {} stock records. next_cursor: {} has_more: {}",
            result.data.len(),
            result.next_cursor.as_deref().unwrap_or("none"),
            result.has_more
        );
        Ok(result)
    }

    /// Resolves a variant detail handle (as found in a stock record's `variant.href`) to its SKU
    /// code.
    pub async fn resolve_variant_code(&self, handle: &str) -> Result<String, CommerceApiError> {
        trace!("🛒️ Resolving variant handle {handle}");
        let detail = self.get_query::<VariantDetail>(handle, &[], self.config.lookup_timeout).await?;
        match detail.code {
            Some(code) if !code.is_empty() => {
                trace!("🛒️ Variant {handle} resolved to {code}");
                Ok(code)
            },
            _ => Err(CommerceApiError::NotFound(handle.to_string())),
        }
    }
}
