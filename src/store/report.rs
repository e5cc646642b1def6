//! Aggregation outcomes and derived report types

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::providers::naver::models::Product;
use crate::providers::traits::DateRange;

/// Offset used for order date windows (KST, UTC+9)
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// What a single page fetch means for the aggregation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Full page; fetch the next one
    Continue,
    /// Fewer items than the page size; this was the last page
    ShortPage,
    /// Response had no list key
    MissingList,
    /// The request failed
    Failed,
    /// `max_pages` pages have been fetched
    BoundReached,
}

impl PageOutcome {
    /// Classify a page that returned `received` items
    pub fn for_page(received: usize, page_size: u32, page: u32, max_pages: u32) -> Self {
        if received < page_size as usize {
            PageOutcome::ShortPage
        } else if page >= max_pages {
            PageOutcome::BoundReached
        } else {
            PageOutcome::Continue
        }
    }

    pub fn is_terminal(self) -> bool {
        self != PageOutcome::Continue
    }
}

impl std::fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageOutcome::Continue => write!(f, "continue"),
            PageOutcome::ShortPage => write!(f, "short_page"),
            PageOutcome::MissingList => write!(f, "missing_list"),
            PageOutcome::Failed => write!(f, "failed"),
            PageOutcome::BoundReached => write!(f, "bound_reached"),
        }
    }
}

/// Products gathered by a bounded multi-page scan
#[derive(Debug, Clone)]
pub struct ProductCollection {
    pub products: Vec<Product>,
    /// Number of list calls issued
    pub pages_fetched: u32,
    /// Why the scan stopped
    pub stop: PageOutcome,
}

impl ProductCollection {
    /// Whether everything up to the last page was read
    pub fn is_complete(&self) -> bool {
        self.stop == PageOutcome::ShortPage
    }
}

/// A product at or below the stock threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: String,
    pub current_quantity: i64,
    pub threshold: i64,
}

/// `[now - days, now]` as `YYYY-MM-DD` dates in UTC+9
pub fn order_window(now: DateTime<Utc>, days: u32) -> DateRange {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    let end = now.with_timezone(&kst);
    let start = end - Duration::days(i64::from(days));

    DateRange::new(
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}
