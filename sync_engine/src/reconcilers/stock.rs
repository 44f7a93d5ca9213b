use std::{collections::HashMap, fmt::Display, time::Duration};

use futures_util::{stream, StreamExt};
use log::*;

use crate::{
    reconcilers::SyncError,
    traits::{CommerceRemote, InventoryPage, PageCursor, RawStockLevel, RemoteError, StockLevelUpdate, StockStore},
};

const DEFAULT_MAX_PAGES: u32 = 50;
const DEFAULT_RESOLVE_CONCURRENCY: usize = 5;
const DEFAULT_RATE_LIMIT_RETRIES: u32 = 4;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);
/// Ceiling on the backoff exponent: delays stop growing after base × 2^10.
const BACKOFF_MAX_DOUBLINGS: u32 = 10;

#[derive(Debug, Clone)]
pub struct StockSyncConfig {
    /// Warehouse/office filter sent with the feed request. When the very first page rejects the
    /// scope (auth or not-found class), the pass falls back to an unscoped feed once and stays
    /// unscoped for the remainder of the run.
    pub scope: Option<String>,
    /// Hard ceiling on pages fetched per pass, bounding worst-case runtime.
    pub max_pages: u32,
    /// Simultaneous variant detail lookups during unresolved-SKU resolution.
    pub resolve_concurrency: usize,
    /// Retries after a rate-limited page fetch before the pass gives up.
    pub rate_limit_retries: u32,
    /// First retry delay; doubles on every subsequent attempt.
    pub backoff_base: Duration,
}

impl Default for StockSyncConfig {
    fn default() -> Self {
        Self {
            scope: None,
            max_pages: DEFAULT_MAX_PAGES,
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
            rate_limit_retries: DEFAULT_RATE_LIMIT_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockPassSummary {
    pub pages: u32,
    pub upserted: usize,
    /// Records dropped because their SKU could not be determined.
    pub dropped: usize,
}

impl Display for StockPassSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} pages, {} stock levels upserted, {} records dropped", self.pages, self.upserted, self.dropped)
    }
}

/// The stock synchronization engine. Stateless between passes; all durable state lives in the
/// stock table. Safe to run from several instances concurrently since the upsert is
/// last-write-wins.
pub struct StockReconciler<B, R> {
    store: B,
    remote: R,
    config: StockSyncConfig,
}

impl<B, R> StockReconciler<B, R>
where
    B: StockStore,
    R: CommerceRemote,
{
    pub fn new(store: B, remote: R, config: StockSyncConfig) -> Self {
        Self { store, remote, config }
    }

    /// Runs one full pass over the feed. A pass-level failure (page fetch exhausted, upsert
    /// rejected) aborts the pass but leaves already-committed pages in place; there is no
    /// transaction spanning the whole run.
    pub async fn run_pass(&self) -> Result<StockPassSummary, SyncError> {
        let mut summary = StockPassSummary::default();
        let mut cursor = PageCursor::first();
        let mut scope = self.config.scope.clone();
        loop {
            let page = match self.fetch_page_with_backoff(&cursor, scope.clone()).await {
                Ok(page) => page,
                Err(e) if summary.pages == 0 && scope.is_some() && e.is_scope_rejection() => {
                    warn!("📊️ Scoped stock feed rejected ({e}); retrying page 1 without the scope filter");
                    scope = None;
                    self.fetch_page_with_backoff(&cursor, None).await?
                },
                Err(e) => return Err(e.into()),
            };
            summary.pages += 1;
            let InventoryPage { items, next } = page;
            let item_count = items.len();
            let updates = self.resolve_levels(items).await;
            summary.dropped += item_count - updates.len();
            if !updates.is_empty() {
                self.store.upsert_stock_levels(&updates).await?;
                summary.upserted += updates.len();
            }
            match next {
                Some(next_cursor) if item_count > 0 && summary.pages < self.config.max_pages => cursor = next_cursor,
                Some(_) if item_count == 0 => {
                    debug!("📊️ Stock feed returned an empty page with a continuation marker; stopping");
                    break;
                },
                Some(_) => {
                    warn!("📊️ Stock pass hit the {}-page ceiling before the feed was exhausted", self.config.max_pages);
                    break;
                },
                None => break,
            }
        }
        Ok(summary)
    }

    /// Fetches one page, retrying rate-limit answers with exponential backoff (base × 2^attempt)
    /// until the retry ceiling, after which the rate limit is returned as a hard failure.
    async fn fetch_page_with_backoff(
        &self,
        cursor: &PageCursor,
        scope: Option<String>,
    ) -> Result<InventoryPage, RemoteError> {
        let mut attempt = 0u32;
        loop {
            match self.remote.fetch_inventory_page(cursor, scope.clone()).await {
                Err(RemoteError::RateLimited) if attempt < self.config.rate_limit_retries => {
                    // The doubling stops at 2^10 so a huge retry ceiling cannot overflow the
                    // exponent or produce a multi-year sleep.
                    let delay = self.config.backoff_base.saturating_mul(2u32.pow(attempt.min(BACKOFF_MAX_DOUBLINGS)));
                    warn!("📊️ Stock feed rate-limited; backing off {delay:?} (attempt {})", attempt + 1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                other => return other,
            }
        }
    }

    /// Normalizes a page of raw records into `{sku, quantity}` updates. Records without an
    /// inline SKU but with a variant handle go through a bounded-concurrency secondary lookup;
    /// records whose SKU cannot be determined at all are dropped.
    async fn resolve_levels(&self, items: Vec<RawStockLevel>) -> Vec<StockLevelUpdate> {
        let mut pending: Vec<(String, f64)> = Vec::new();
        let mut handles: Vec<String> = Vec::new();
        let mut updates = Vec::with_capacity(items.len());
        for item in items {
            if let Some(sku) = item.inline_sku() {
                updates.push(StockLevelUpdate::new(sku, item.quantity.trunc() as i64));
            } else if let Some(handle) = item.variant_handle.as_deref().filter(|h| !h.is_empty()) {
                if !handles.contains(&handle.to_string()) {
                    handles.push(handle.to_string());
                }
                pending.push((handle.to_string(), item.quantity));
            } else {
                debug!("📊️ Dropping stock record with no SKU and no variant handle");
            }
        }
        if pending.is_empty() {
            return updates;
        }
        trace!("📊️ Resolving {} variant handles ({} records pending)", handles.len(), pending.len());
        let remote = &self.remote;
        let resolved: HashMap<String, String> = stream::iter(handles)
            .map(|handle| async move {
                let result = remote.resolve_variant_code(&handle).await;
                (handle, result)
            })
            .buffer_unordered(self.config.resolve_concurrency)
            .filter_map(|(handle, result)| async move {
                match result {
                    Ok(code) if !code.is_empty() => Some((handle, code)),
                    Ok(_) => {
                        warn!("📊️ Variant {handle} resolved to an empty code; dropping its records");
                        None
                    },
                    Err(e) => {
                        warn!("📊️ Could not resolve variant {handle}: {e}; dropping its records");
                        None
                    },
                }
            })
            .collect()
            .await;
        for (handle, quantity) in pending {
            if let Some(code) = resolved.get(&handle) {
                updates.push(StockLevelUpdate::new(code.clone(), quantity.trunc() as i64));
            }
        }
        updates
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
        Mutex,
    };

    use mockall::mock;

    use super::*;
    use crate::traits::{DocumentPayload, StoreError, SubmitResponse};

    mock! {
        pub Remote {}
        impl CommerceRemote for Remote {
            async fn submit_document(&self, payload: &DocumentPayload) -> Result<SubmitResponse, RemoteError>;
            async fn fetch_inventory_page(&self, cursor: &PageCursor, scope: Option<String>) -> Result<InventoryPage, RemoteError>;
            async fn resolve_variant_code(&self, handle: &str) -> Result<String, RemoteError>;
        }
    }

    /// A store that records every upsert batch it receives.
    #[derive(Clone, Default)]
    struct RecordingStore {
        batches: Arc<Mutex<Vec<Vec<StockLevelUpdate>>>>,
        fail: bool,
    }

    impl StockStore for RecordingStore {
        async fn upsert_stock_levels(&self, updates: &[StockLevelUpdate]) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::DatabaseError("disk I/O error".to_string()));
            }
            self.batches.lock().unwrap().push(updates.to_vec());
            Ok(())
        }
    }

    fn raw(sku: Option<&str>, variant_sku: Option<&str>, handle: Option<&str>, quantity: f64) -> RawStockLevel {
        RawStockLevel {
            sku: sku.map(String::from),
            variant_sku: variant_sku.map(String::from),
            variant_handle: handle.map(String::from),
            quantity,
        }
    }

    fn page_of(items: Vec<RawStockLevel>, next: Option<PageCursor>) -> InventoryPage {
        InventoryPage { items, next }
    }

    #[tokio::test]
    async fn pagination_stops_when_feed_is_exhausted() {
        let mut remote = MockRemote::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        remote.expect_fetch_inventory_page().times(3).returning(move |cursor, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(*cursor, PageCursor::Page(n));
            let next = (n < 3).then(|| PageCursor::Page(n + 1));
            Ok(page_of(vec![raw(Some(&format!("SKU-{n}")), None, None, n as f64)], next))
        });
        let store = RecordingStore::default();
        let reconciler = StockReconciler::new(store.clone(), remote, StockSyncConfig::default());
        let summary = reconciler.run_pass().await.unwrap();
        assert_eq!(summary, StockPassSummary { pages: 3, upserted: 3, dropped: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.batches.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_page_with_continuation_stops_the_pass() {
        let mut remote = MockRemote::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        remote.expect_fetch_inventory_page().returning(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let items = if n == 1 { vec![raw(Some("A1"), None, None, 2.0)] } else { vec![] };
            Ok(page_of(items, Some(PageCursor::Page(n + 1))))
        });
        let store = RecordingStore::default();
        let reconciler = StockReconciler::new(store, remote, StockSyncConfig::default());
        let summary = reconciler.run_pass().await.unwrap();
        assert_eq!(summary.pages, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn page_ceiling_bounds_the_pass() {
        let mut remote = MockRemote::new();
        remote.expect_fetch_inventory_page().times(4).returning(|cursor, _| {
            let n = match cursor {
                PageCursor::Page(n) => *n,
                PageCursor::Token(_) => unreachable!(),
            };
            Ok(page_of(vec![raw(Some(&format!("S{n}")), None, None, 1.0)], Some(PageCursor::Page(n + 1))))
        });
        let config = StockSyncConfig { max_pages: 4, ..Default::default() };
        let reconciler = StockReconciler::new(RecordingStore::default(), remote, config);
        let summary = reconciler.run_pass().await.unwrap();
        assert_eq!(summary.pages, 4);
    }

    #[tokio::test]
    async fn scoped_404_on_first_page_falls_back_to_unscoped_once() {
        let mut remote = MockRemote::new();
        remote
            .expect_fetch_inventory_page()
            .withf(|_, scope| scope.as_deref() == Some("WH-7"))
            .times(1)
            .returning(|_, _| Err(RemoteError::NotFound("/stock-levels".to_string())));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        remote.expect_fetch_inventory_page().withf(|_, scope| scope.is_none()).returning(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let next = (n < 2).then(|| PageCursor::Page(n + 1));
            Ok(page_of(vec![raw(Some(&format!("S{n}")), None, None, 1.0)], next))
        });
        let config = StockSyncConfig { scope: Some("WH-7".to_string()), ..Default::default() };
        let store = RecordingStore::default();
        let reconciler = StockReconciler::new(store.clone(), remote, config);
        let summary = reconciler.run_pass().await.unwrap();
        // Both unscoped pages succeed; the scoped failure is not counted as a page.
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.upserted, 2);
    }

    #[tokio::test]
    async fn scoped_failure_after_first_page_aborts_the_pass() {
        let mut remote = MockRemote::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        remote.expect_fetch_inventory_page().returning(move |_, scope| {
            assert_eq!(scope.as_deref(), Some("WH-7"));
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                Ok(page_of(vec![raw(Some("A1"), None, None, 1.0)], Some(PageCursor::Page(2))))
            } else {
                Err(RemoteError::NotFound("/stock-levels".to_string()))
            }
        });
        let config = StockSyncConfig { scope: Some("WH-7".to_string()), ..Default::default() };
        let store = RecordingStore::default();
        let reconciler = StockReconciler::new(store.clone(), remote, config);
        let result = reconciler.run_pass().await;
        assert!(matches!(result, Err(SyncError::Remote(RemoteError::NotFound(_)))));
        // The first page was already committed.
        assert_eq!(store.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unresolved_handles_are_looked_up_and_failures_dropped() {
        let mut remote = MockRemote::new();
        remote.expect_fetch_inventory_page().times(1).returning(|_, _| {
            Ok(page_of(
                vec![
                    raw(Some("A1"), None, None, 5.0),
                    raw(None, Some("B2"), None, 3.9),
                    raw(None, None, Some("/variants/10"), 7.0),
                    raw(None, None, Some("/variants/11"), 2.0),
                    raw(None, None, None, 4.0),
                ],
                None,
            ))
        });
        remote
            .expect_resolve_variant_code()
            .withf(|h| h == "/variants/10")
            .times(1)
            .returning(|_| Ok("C3".to_string()));
        remote
            .expect_resolve_variant_code()
            .withf(|h| h == "/variants/11")
            .times(1)
            .returning(|h| Err(RemoteError::NotFound(h.to_string())));
        let store = RecordingStore::default();
        let reconciler = StockReconciler::new(store.clone(), remote, StockSyncConfig::default());
        let summary = reconciler.run_pass().await.unwrap();
        // Two records dropped: the failed lookup and the record with no identifiers at all.
        assert_eq!(summary, StockPassSummary { pages: 1, upserted: 3, dropped: 2 });
        let batches = store.batches.lock().unwrap();
        let batch = &batches[0];
        assert!(batch.contains(&StockLevelUpdate::new("A1", 5)));
        assert!(batch.contains(&StockLevelUpdate::new("B2", 3)));
        assert!(batch.contains(&StockLevelUpdate::new("C3", 7)));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_is_retried_then_becomes_a_hard_failure() {
        let mut remote = MockRemote::new();
        // Initial attempt plus both allowed retries, all throttled.
        remote.expect_fetch_inventory_page().times(3).returning(|_, _| Err(RemoteError::RateLimited));
        let config = StockSyncConfig { rate_limit_retries: 2, ..Default::default() };
        let reconciler = StockReconciler::new(RecordingStore::default(), remote, config);
        let result = reconciler.run_pass().await;
        assert!(matches!(result, Err(SyncError::Remote(RemoteError::RateLimited))));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delay_stops_growing_past_the_doubling_ceiling() {
        let mut remote = MockRemote::new();
        // A retry ceiling well past 32 would overflow 2^attempt without the doubling cap.
        remote.expect_fetch_inventory_page().times(41).returning(|_, _| Err(RemoteError::RateLimited));
        let config = StockSyncConfig { rate_limit_retries: 40, ..Default::default() };
        let reconciler = StockReconciler::new(RecordingStore::default(), remote, config);
        let result = reconciler.run_pass().await;
        assert!(matches!(result, Err(SyncError::Remote(RemoteError::RateLimited))));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_recovery_continues_the_pass() {
        let mut remote = MockRemote::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        remote.expect_fetch_inventory_page().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RemoteError::RateLimited)
            } else {
                Ok(page_of(vec![raw(Some("A1"), None, None, 1.0)], None))
            }
        });
        let reconciler = StockReconciler::new(RecordingStore::default(), remote, StockSyncConfig::default());
        let summary = reconciler.run_pass().await.unwrap();
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.upserted, 1);
    }

    #[tokio::test]
    async fn upsert_failure_aborts_the_pass() {
        let mut remote = MockRemote::new();
        remote
            .expect_fetch_inventory_page()
            .times(1)
            .returning(|_, _| Ok(page_of(vec![raw(Some("A1"), None, None, 1.0)], Some(PageCursor::Page(2)))));
        let store = RecordingStore { fail: true, ..Default::default() };
        let reconciler = StockReconciler::new(store, remote, StockSyncConfig::default());
        let result = reconciler.run_pass().await;
        assert!(matches!(result, Err(SyncError::Store(StoreError::DatabaseError(_)))));
    }
}
