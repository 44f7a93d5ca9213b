use std::fmt::Display;

use log::*;

use crate::{
    db_types::{Order, OrderItem},
    reconcilers::SyncError,
    traits::{CommerceRemote, DocumentLine, DocumentPayload, OrderStore, SubmitResponse},
};

/// Buyer defaults used when the order carries no customer fields. The remote API requires a
/// buyer block on every document.
const DEFAULT_CUSTOMER_NAME: &str = "Walk-in customer";
const DEFAULT_CUSTOMER_EMAIL: &str = "sales@example.com";
const DEFAULT_TAX_CLASS: &str = "standard";

/// The order fulfillment poller. One pass discovers a bounded batch of orders awaiting
/// submission, claims each with a conditional status update, submits a document for each claimed
/// order and records the outcome. Orders are handled strictly one at a time so a single pass can
/// never submit the same order twice.
pub struct OrderReconciler<B, R> {
    store: B,
    remote: R,
    batch_size: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPassSummary {
    pub discovered: usize,
    pub submitted: usize,
    pub failed: usize,
    /// Orders another poller claimed between our discovery and our claim attempt.
    pub skipped: usize,
}

impl Display for OrderPassSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} discovered, {} submitted, {} failed, {} skipped",
            self.discovered, self.submitted, self.failed, self.skipped
        )
    }
}

impl<B, R> OrderReconciler<B, R>
where
    B: OrderStore,
    R: CommerceRemote,
{
    pub fn new(store: B, remote: R, batch_size: i64) -> Self {
        Self { store, remote, batch_size }
    }

    /// Runs one reconciliation pass. Per-order failures are recorded on the order row and never
    /// abort the pass; only a storage failure on the shared paths does.
    pub async fn run_pass(&self) -> Result<OrderPassSummary, SyncError> {
        let orders = self.store.fetch_orders_awaiting_submission(self.batch_size).await?;
        let mut summary = OrderPassSummary { discovered: orders.len(), ..Default::default() };
        for order in orders {
            if !self.store.claim_order(order.id, order.status).await? {
                debug!("📦️ Order {} was claimed by another poller, skipping", order.order_number);
                summary.skipped += 1;
                continue;
            }
            if self.process_claimed_order(&order).await? {
                summary.submitted += 1;
            } else {
                summary.failed += 1;
            }
        }
        Ok(summary)
    }

    /// Submits a single claimed order. Returns `true` on a recorded success, `false` on a
    /// recorded failure; `Err` only when recording itself fails.
    async fn process_claimed_order(&self, order: &Order) -> Result<bool, SyncError> {
        let items = match self.store.fetch_order_items(order.id).await {
            Ok(items) => items,
            Err(e) => {
                // No remote call when we cannot read the lines; the document would be empty.
                warn!("📦️ Could not read items for order {}: {e}", order.order_number);
                self.store.record_submission_failure(order.id, &format!("Could not read order items: {e}")).await?;
                return Ok(false);
            },
        };
        let payload = build_document_payload(order, &items);
        match self.remote.submit_document(&payload).await {
            Ok(response) if response.is_success() => self.record_accepted(order, &response).await,
            Ok(response) => {
                let reason = format!("Submission rejected with status {}: {}", response.status, response.body);
                warn!("📦️ Order {} rejected upstream with status {}", order.order_number, response.status);
                self.store.record_submission_failure(order.id, &reason).await?;
                Ok(false)
            },
            Err(e) => {
                warn!("📦️ Submission of order {} failed: {e}", order.order_number);
                self.store.record_submission_failure(order.id, &format!("Submission failed: {e}")).await?;
                Ok(false)
            },
        }
    }

    async fn record_accepted(&self, order: &Order, response: &SubmitResponse) -> Result<bool, SyncError> {
        match response.document_id() {
            Some(document_id) => {
                info!("📦️ Order {} submitted. Remote document id: {document_id}", order.order_number);
                self.store.record_submission_success(order.id, &document_id, &response.body.to_string()).await?;
                Ok(true)
            },
            None => {
                // A 2xx without a document id is not a success we can audit later.
                let reason = format!("Response carried no document id: {}", response.body);
                warn!("📦️ Order {}: {reason}", order.order_number);
                self.store.record_submission_failure(order.id, &reason).await?;
                Ok(false)
            },
        }
    }
}

/// Maps an order and its items onto the outbound document shape, filling in buyer defaults where
/// the order has none.
pub fn build_document_payload(order: &Order, items: &[OrderItem]) -> DocumentPayload {
    let lines = items
        .iter()
        .map(|item| DocumentLine {
            code: item.sku.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            tax_class: DEFAULT_TAX_CLASS.to_string(),
        })
        .collect();
    DocumentPayload {
        order_number: order.order_number.clone(),
        customer_name: order.customer_name.clone().unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
        customer_email: order.customer_email.clone().unwrap_or_else(|| DEFAULT_CUSTOMER_EMAIL.to_string()),
        note: order.memo.clone(),
        lines,
    }
}
