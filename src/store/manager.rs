//! Store manager
//!
//! Composes single `StoreApi` calls into bounded, sequential scans: paging
//! through the product catalog, fetching recent orders and flagging low stock.
//! Failures inside a scan are logged and end (or skip) that step; they are
//! never returned to the caller.

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::providers::naver::models::{Order, Product};
use crate::providers::traits::StoreApi;

use super::report::{order_window, LowStockItem, PageOutcome, ProductCollection};

/// Page size used for catalog scans
pub const PRODUCT_PAGE_SIZE: u32 = 20;
/// Page size of the single recent-orders request
pub const ORDER_PAGE_SIZE: u32 = 100;
/// Catalog pages scanned by low-stock detection
pub const LOW_STOCK_MAX_PAGES: u32 = 5;

/// Pacing between consecutive calls
#[derive(Debug, Clone, Copy)]
pub struct ManagerSettings {
    /// Delay between product list pages
    pub page_delay: Duration,
    /// Delay between inventory lookups
    pub inventory_delay: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        ManagerSettings {
            page_delay: Duration::from_millis(500),
            inventory_delay: Duration::from_millis(200),
        }
    }
}

impl ManagerSettings {
    /// No pacing at all (tests, mock servers)
    pub fn no_delay() -> Self {
        ManagerSettings {
            page_delay: Duration::ZERO,
            inventory_delay: Duration::ZERO,
        }
    }
}

/// Multi-call workflows on top of a `StoreApi`
pub struct StoreManager<A> {
    api: A,
    settings: ManagerSettings,
}

impl<A: StoreApi> StoreManager<A> {
    /// Create a manager with the default rate-limit pacing
    pub fn new(api: A) -> Self {
        Self::with_settings(api, ManagerSettings::default())
    }

    pub fn with_settings(api: A, settings: ManagerSettings) -> Self {
        StoreManager { api, settings }
    }

    /// Underlying API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Collect products from pages `1..=max_pages`; partial on early stop.
    pub async fn get_all_products(&self, max_pages: u32) -> Vec<Product> {
        self.collect_products(max_pages).await.products
    }

    /// Page through the catalog, recording why the scan stopped.
    #[instrument(skip(self))]
    pub async fn collect_products(&self, max_pages: u32) -> ProductCollection {
        let mut collection = ProductCollection {
            products: Vec::new(),
            pages_fetched: 0,
            stop: PageOutcome::BoundReached,
        };

        let mut page = 1;
        while page <= max_pages {
            if page > 1 {
                pause(self.settings.page_delay).await;
            }

            info!(page, "Fetching product list page");
            let outcome = match self.api.list_products(page, PRODUCT_PAGE_SIZE).await {
                Ok(response) => match response.products {
                    Some(products) => {
                        let outcome =
                            PageOutcome::for_page(products.len(), PRODUCT_PAGE_SIZE, page, max_pages);
                        collection.products.extend(products);
                        outcome
                    }
                    None => {
                        warn!(page, "No product data found in page response");
                        PageOutcome::MissingList
                    }
                },
                Err(e) => {
                    error!(page, error = %e, "Failed to fetch product page");
                    PageOutcome::Failed
                }
            };
            collection.pages_fetched += 1;

            if outcome.is_terminal() {
                collection.stop = outcome;
                break;
            }
            page += 1;
        }

        info!(
            total = collection.products.len(),
            pages = collection.pages_fetched,
            stop = %collection.stop,
            "Product scan finished"
        );
        collection
    }

    /// Orders from the last `days` days (dates in UTC+9), first 100 only.
    #[instrument(skip(self))]
    pub async fn get_recent_orders(&self, days: u32) -> Vec<Order> {
        let range = order_window(Utc::now(), days);
        info!(
            start = range.start.as_deref().unwrap_or_default(),
            end = range.end.as_deref().unwrap_or_default(),
            "Fetching recent orders"
        );

        match self.api.list_orders(1, ORDER_PAGE_SIZE, &range).await {
            Ok(response) => match response.orders {
                Some(orders) => {
                    info!(total = orders.len(), "Recent orders fetched");
                    orders
                }
                None => {
                    warn!("No order data found in response");
                    Vec::new()
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to fetch recent orders");
                Vec::new()
            }
        }
    }

    /// Report products whose stock is at or below `threshold`.
    ///
    /// Detect-only: no inventory is modified. Products without an identifier
    /// or whose inventory has no quantity are skipped; a failed lookup is
    /// logged and the scan moves on.
    #[instrument(skip(self))]
    pub async fn find_low_stock_products(&self, threshold: i64) -> Vec<LowStockItem> {
        let collection = self.collect_products(LOW_STOCK_MAX_PAGES).await;
        let mut low_stock = Vec::new();
        let mut first = true;

        for product in &collection.products {
            let Some(product_id) = product.id() else {
                continue;
            };

            if !first {
                pause(self.settings.inventory_delay).await;
            }
            first = false;

            let inventory = match self.api.get_inventory(product_id).await {
                Ok(inventory) => inventory,
                Err(e) => {
                    error!(product_id, error = %e, "Failed to fetch inventory");
                    continue;
                }
            };

            let Some(quantity) = inventory.quantity else {
                debug!(product_id, "Inventory response has no quantity");
                continue;
            };

            if quantity <= threshold {
                warn!(product_id, quantity, threshold, "Low stock");
                low_stock.push(LowStockItem {
                    product_id: product_id.to_string(),
                    current_quantity: quantity,
                    threshold,
                });
            }
        }

        info!(count = low_stock.len(), threshold, "Low-stock scan finished");
        low_stock
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
