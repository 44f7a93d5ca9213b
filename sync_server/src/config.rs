use std::{env, time::Duration};

use commerce_tools::CommerceConfig;
use log::*;
use sync_engine::reconcilers::StockSyncConfig;

const DEFAULT_OSG_HOST: &str = "127.0.0.1";
const DEFAULT_OSG_PORT: u16 = 8360;
const DEFAULT_ORDER_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_STOCK_POLL_INTERVAL: Duration = Duration::from_secs(900);
const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(10);
// Upstream writes need a moment to propagate before the poller can see the order.
const DEFAULT_REQUEUE_DEBOUNCE: Duration = Duration::from_secs(3);
const DEFAULT_ORDER_BATCH_SIZE: i64 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub commerce: CommerceConfig,
    pub sync: SyncConfig,
}

/// Scheduling knobs for the two reconciliation workers. Built once at startup and handed to the
/// workers by value; reconcilers never read the environment themselves.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub order_poll_interval: Duration,
    pub stock_poll_interval: Duration,
    /// Wait before the first pass, so the process settles (migrations, connections) first.
    pub startup_delay: Duration,
    /// Delay between an order-updated notification and the requeue it triggers.
    pub requeue_debounce: Duration,
    pub order_batch_size: i64,
    pub stock: StockSyncConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            order_poll_interval: DEFAULT_ORDER_POLL_INTERVAL,
            stock_poll_interval: DEFAULT_STOCK_POLL_INTERVAL,
            startup_delay: DEFAULT_STARTUP_DELAY,
            requeue_debounce: DEFAULT_REQUEUE_DEBOUNCE,
            order_batch_size: DEFAULT_ORDER_BATCH_SIZE,
            stock: StockSyncConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OSG_HOST.to_string(),
            port: DEFAULT_OSG_PORT,
            database_url: String::default(),
            commerce: CommerceConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("OSG_HOST").ok().unwrap_or_else(|| DEFAULT_OSG_HOST.into());
        let port = env::var("OSG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for OSG_PORT. {e} Using the default, {DEFAULT_OSG_PORT}, instead.");
                    DEFAULT_OSG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OSG_PORT);
        let database_url = env::var("OSG_DATABASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ OSG_DATABASE_URL is not set. Using the default sqlite database.");
            "sqlite://data/osg_store.db".to_string()
        });
        let commerce = CommerceConfig::new_from_env_or_default();
        let sync = SyncConfig::from_env_or_default();
        Self { host, port, database_url, commerce, sync }
    }
}

impl SyncConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = SyncConfig::default();
        let stock_defaults = StockSyncConfig::default();
        let stock = StockSyncConfig {
            scope: env::var("OSG_STOCK_SCOPE").ok().filter(|s| !s.is_empty()),
            max_pages: env_u32("OSG_STOCK_MAX_PAGES", stock_defaults.max_pages),
            resolve_concurrency: env_u32("OSG_RESOLVE_CONCURRENCY", stock_defaults.resolve_concurrency as u32) as usize,
            rate_limit_retries: env_u32("OSG_RATE_LIMIT_RETRIES", stock_defaults.rate_limit_retries),
            backoff_base: stock_defaults.backoff_base,
        };
        Self {
            order_poll_interval: env_secs("OSG_ORDER_POLL_SECS", defaults.order_poll_interval),
            stock_poll_interval: env_secs("OSG_STOCK_POLL_SECS", defaults.stock_poll_interval),
            startup_delay: env_secs("OSG_STARTUP_DELAY_SECS", defaults.startup_delay),
            requeue_debounce: env_secs("OSG_REQUEUE_DEBOUNCE_SECS", defaults.requeue_debounce),
            order_batch_size: env_u32("OSG_ORDER_BATCH_SIZE", defaults.order_batch_size as u32) as i64,
            stock,
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(s) => s.parse::<u32>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    match env::var(name) {
        Ok(s) => match s.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(e) => {
                error!("🪛️ {s} is not a valid number of seconds for {name}. {e} Using the default instead.");
                default
            },
        },
        Err(_) => default,
    }
}
