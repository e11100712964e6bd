//! Domain service for delivery orders: prices a client-submitted cart and
//! writes a printable PDF receipt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Address is required")]
    AddressRequired,

    #[error("Items are required")]
    ItemsRequired,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<std::io::Error> for OrderError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Order as posted by the public page. Numbers are taken leniently:
/// malformed prices or quantities count as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    pub restaurant_name: Option<String>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub items: Value,
    pub total: Option<Value>,
    pub payment_method: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub pdf_url: String,
    pub total: f64,
}

#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// # Errors
    ///
    /// [`OrderError::AddressRequired`] for a blank address and
    /// [`OrderError::ItemsRequired`] when `items` is missing, not an array
    /// or empty.
    async fn create_order(&self, request: OrderRequest) -> Result<OrderReceipt, OrderError>;
}
