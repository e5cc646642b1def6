//! Store API trait definitions
//!
//! This module defines the error taxonomy shared by every call against the
//! Commerce API and the `StoreApi` contract the store manager is written
//! against. The HTTP client in `naver` implements it; tests substitute an
//! in-memory fake.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::providers::naver::models::{
    Confirmation, Inventory, Order, OrderPage, Product, ProductPage, SellerInfo,
};

// ============================================================================
// Error Types
// ============================================================================

/// Store API error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Build a configuration error from anything printable
    pub fn config(message: impl Into<String>) -> Self {
        StoreError::Config(message.into())
    }

    /// HTTP status carried by an `Api` error
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Transport(err)
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Query Types
// ============================================================================

/// Optional `YYYY-MM-DD` date range for order listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

// ============================================================================
// Store API Trait
// ============================================================================

/// One authenticated request/response cycle per operation.
///
/// Implementations never retry; a failed call is reported exactly once.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// List products (`page` is 1-indexed)
    async fn list_products(&self, page: u32, page_size: u32) -> StoreResult<ProductPage>;

    /// Get product details by ID
    async fn get_product(&self, product_id: &str) -> StoreResult<Product>;

    /// Register a new product
    async fn create_product(&self, payload: &Map<String, Value>) -> StoreResult<Product>;

    /// Partially update a product
    async fn update_product(
        &self,
        product_id: &str,
        payload: &Map<String, Value>,
    ) -> StoreResult<Product>;

    /// List orders, optionally restricted to a date range
    async fn list_orders(
        &self,
        page: u32,
        page_size: u32,
        range: &DateRange,
    ) -> StoreResult<OrderPage>;

    /// Get order details by ID
    async fn get_order(&self, order_id: &str) -> StoreResult<Order>;

    /// Change the status of an order
    async fn update_order_status(&self, order_id: &str, status: &str)
        -> StoreResult<Confirmation>;

    /// Current stock for a product
    async fn get_inventory(&self, product_id: &str) -> StoreResult<Inventory>;

    /// Overwrite the stock quantity of a product
    async fn update_inventory(&self, product_id: &str, quantity: i64)
        -> StoreResult<Confirmation>;

    /// Seller / store information
    async fn get_seller_info(&self) -> StoreResult<SellerInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_body() {
        let err = StoreError::Api {
            status: 500,
            body: "{\"code\":\"ERR\"}".to_string(),
        };

        assert_eq!(err.to_string(), "API error: 500 - {\"code\":\"ERR\"}");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_status_only_for_api_errors() {
        assert_eq!(StoreError::Timeout.status(), None);
        assert_eq!(StoreError::config("missing").status(), None);
    }

    #[test]
    fn test_date_range_default_is_open() {
        let range = DateRange::default();
        assert!(range.start.is_none());
        assert!(range.end.is_none());

        let range = DateRange::new("2024-01-01", "2024-01-08");
        assert_eq!(range.start.as_deref(), Some("2024-01-01"));
    }
}
