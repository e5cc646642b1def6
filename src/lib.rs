//! Naver SmartStore
//!
//! Async client for the Naver Commerce API: SELF-mode token issuance, one
//! call per catalog / order / inventory operation, and bounded multi-page
//! workflows on top (catalog scans, recent orders, low-stock detection).

pub mod config;
pub mod logging;
pub mod providers;
pub mod store;

pub use crate::config::Settings;
pub use crate::logging::LogSession;
pub use crate::providers::{NaverCommerceClient, StoreApi, StoreError, StoreResult};
pub use crate::store::StoreManager;
