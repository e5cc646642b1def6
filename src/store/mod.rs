//! Multi-call store workflows built on the `StoreApi` trait

pub mod manager;
pub mod report;

pub use manager::{ManagerSettings, StoreManager};
pub use report::{order_window, LowStockItem, PageOutcome, ProductCollection};
