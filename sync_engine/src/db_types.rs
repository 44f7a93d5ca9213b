use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use osg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------  OrderStatusType  -----------------------------------------------------------

/// The submission lifecycle of an order. `Pending → Processing → {Processed | Error}`, with
/// `Error` re-entering `Processing` on the next reconciliation pass. `Processed` is terminal and
/// is the only state in which `processed_at` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is awaiting its first submission attempt.
    Pending,
    /// A reconciler has claimed the order and a submission may be in flight.
    Processing,
    /// The document was accepted upstream. Terminal.
    Processed,
    /// The last submission attempt failed; the order is eligible for retry.
    Error,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Processed => write!(f, "Processed"),
            OrderStatusType::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Processed" => Ok(Self::Processed),
            "Error" => Ok(Self::Error),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------       Order       -----------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    /// Human-readable order number, assigned by the system that created the order.
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub memo: Option<String>,
    pub status: OrderStatusType,
    /// Set exactly when the order transitions to `Processed`.
    pub processed_at: Option<DateTime<Utc>>,
    /// Summary of the most recent failed submission attempt.
    pub last_error: Option<String>,
    /// Identifier of the document created upstream, once submission succeeded.
    pub remote_document_id: Option<String>,
    /// Raw response body of the successful submission, kept for auditing.
    pub remote_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_processed(&self) -> bool {
        self.status == OrderStatusType::Processed
    }
}

/// Fields needed to create an order row. Orders are created by the storefront, not by the sync
/// engine; this type exists for the storage API and test fixtures.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub memo: Option<String>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(order_number: S) -> Self {
        Self { order_number: order_number.into(), ..Default::default() }
    }
}

//--------------------------------------     OrderItem     -----------------------------------------------------------

/// A line on an order. Read-only from the sync engine's perspective.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount_percent: f64,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount_percent: f64,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(sku: S, quantity: i64, unit_price: Money) -> Self {
        Self { sku: sku.into(), quantity, unit_price, discount_percent: 0.0 }
    }
}

//--------------------------------------    StockRecord    -----------------------------------------------------------

/// Local mirror of an upstream stock level. One row per SKU, overwritten on every successful
/// stock pass. Rows are never deleted here; upstream absence does not imply local deletion.
#[derive(Debug, Clone, FromRow)]
pub struct StockRecord {
    pub sku: String,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::OrderStatusType;

    #[test]
    fn status_round_trips_through_strings() {
        for status in
            [OrderStatusType::Pending, OrderStatusType::Processing, OrderStatusType::Processed, OrderStatusType::Error]
        {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("Paid".parse::<OrderStatusType>().is_err());
    }
}
