//! SmartStore
//!
//! Walks through the store once: seller information, the first catalog pages,
//! last week's orders and low-stock products. Everything is logged to the
//! console and the configured log file.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};

use naver_smartstore::config::DEFAULT_LOG_FILE;
use naver_smartstore::{LogSession, NaverCommerceClient, Settings, StoreApi, StoreManager, StoreResult};

/// Items of each listing shown in the log
const PREVIEW_LEN: usize = 3;
const PRODUCT_PAGES: u32 = 2;
const ORDER_DAYS: u32 = 7;
const LOW_STOCK_THRESHOLD: i64 = 10;

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut session = LogSession::start();

    let config_path = Settings::default_path();
    let loaded = Settings::load(&config_path);
    let log_path = loaded
        .as_ref()
        .map(|s| s.log_file.clone())
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));

    if let Err(e) = session.attach(&log_path) {
        eprintln!("Cannot open log file {}: {}", log_path.display(), e);
        return ExitCode::FAILURE;
    }

    let code = match loaded.and_then(|settings| run(&settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "SmartStore run aborted");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    };

    if let Err(e) = session.close() {
        eprintln!("Cannot flush log file: {e}");
    }
    code
}

fn run(settings: &Settings) -> StoreResult<()> {
    settings.validate()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| naver_smartstore::StoreError::config(format!("cannot start runtime: {e}")))?;

    let client = NaverCommerceClient::new(settings)?;
    runtime.block_on(walk_store(StoreManager::new(client)));
    Ok(())
}

async fn walk_store(manager: StoreManager<NaverCommerceClient>) {
    info!(
        "Starting SmartStore v{} against {}",
        env!("CARGO_PKG_VERSION"),
        manager.api().session().base_url()
    );

    match manager.api().get_seller_info().await {
        Ok(seller) => info!(seller = %serde_json::Value::Object(seller.fields), "Store info"),
        Err(e) => warn!(error = %e, "Store info unavailable"),
    }

    let products = manager.get_all_products(PRODUCT_PAGES).await;
    info!(total = products.len(), "Products");
    for product in products.iter().take(PREVIEW_LEN) {
        info!(
            product_id = product.id().unwrap_or("-"),
            name = product.product_name.as_deref().unwrap_or("-"),
            "Product"
        );
    }

    let orders = manager.get_recent_orders(ORDER_DAYS).await;
    info!(total = orders.len(), days = ORDER_DAYS, "Recent orders");
    for order in orders.iter().take(PREVIEW_LEN) {
        info!(
            order_id = order.order_id.as_deref().unwrap_or("-"),
            status = order.order_status.as_deref().unwrap_or("-"),
            "Order"
        );
    }

    let low_stock = manager.find_low_stock_products(LOW_STOCK_THRESHOLD).await;
    info!(
        count = low_stock.len(),
        threshold = LOW_STOCK_THRESHOLD,
        report = %serde_json::to_string(&low_stock).unwrap_or_default(),
        "Low-stock products"
    );
    for item in &low_stock {
        warn!(
            product_id = %item.product_id,
            quantity = item.current_quantity,
            "Restock needed"
        );
    }

    info!("SmartStore run complete");
}
