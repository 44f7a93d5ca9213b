use std::time::Duration;

use log::*;
use osg_common::ApiToken;

const DEFAULT_API_VERSION: &str = "v2";
const DEFAULT_PAGE_SIZE: u32 = 100;
// Document submission can take a while upstream; give it more headroom than the read paths.
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Base URL of the commerce API, e.g. "https://api.my-commerce.example".
    pub base_url: String,
    pub api_version: String,
    pub api_token: ApiToken,
    /// Number of stock records requested per feed page.
    pub page_size: u32,
    pub submit_timeout: Duration,
    pub fetch_timeout: Duration,
    pub lookup_timeout: Duration,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            base_url: String::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_token: ApiToken::default(),
            page_size: DEFAULT_PAGE_SIZE,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl CommerceConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("OSG_COMMERCE_BASE_URL").unwrap_or_else(|_| {
            warn!("OSG_COMMERCE_BASE_URL not set, using a (probably useless) default");
            "https://api.commerce.example".to_string()
        });
        let api_version = std::env::var("OSG_COMMERCE_API_VERSION").unwrap_or_else(|_| {
            warn!("OSG_COMMERCE_API_VERSION not set, using {DEFAULT_API_VERSION} as default");
            DEFAULT_API_VERSION.to_string()
        });
        let api_token = ApiToken::new(std::env::var("OSG_COMMERCE_API_TOKEN").unwrap_or_else(|_| {
            warn!("OSG_COMMERCE_API_TOKEN not set, using a (probably useless) default");
            "token_00000000000000".to_string()
        }));
        let page_size = std::env::var("OSG_COMMERCE_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { base_url, api_version, api_token, page_size, ..Default::default() }
    }
}
