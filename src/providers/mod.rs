//! Commerce API Provider Module
//!
//! ```text
//!   ┌──────────────────┐     ┌─────────────────┐
//!   │  StoreManager<A> │────▶│ StoreApi trait  │
//!   └──────────────────┘     └────────┬────────┘
//!                                     │
//!                          ┌──────────┴──────────┐
//!                          │ NaverCommerceClient │
//!                          └──────────┬──────────┘
//!                                     │
//!                              ┌──────┴─────┐
//!                              │ ApiSession │
//!                              └────────────┘
//! ```

pub mod http_client;
pub mod naver;
pub mod traits;

// Re-export commonly used types
pub use http_client::ApiSession;
pub use naver::NaverCommerceClient;
pub use traits::{DateRange, StoreApi, StoreError, StoreResult};
