use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::analytics::{
    fast_moving, low_stock, slow_moving, top_sellers, ProductSales,
};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::product::ProductId;
use partsdesk_core::errors::ApplicationError;
use partsdesk_db::{open_store, ProductRepository, SaleRepository};

#[derive(Debug, Serialize)]
struct LowStockItem {
    id: ProductId,
    name: String,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct AnalyticsOutput {
    generated_at: chrono::DateTime<Utc>,
    low_stock_threshold: u32,
    low_stock: Vec<LowStockItem>,
    fast_moving: Vec<ProductSales>,
    slow_moving: Vec<ProductSales>,
    top_sellers: Vec<ProductSales>,
    total_revenue: Decimal,
    total_units_sold: u64,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("analytics", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("analytics") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let settings = &config.analytics;
    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let products = store.list_products().await?;
        let sales = store.list_sales().await?;

        let low = low_stock(&products, settings.low_stock_threshold)
            .into_iter()
            .map(|product| LowStockItem {
                id: product.id,
                name: product.name.clone(),
                quantity: product.quantity,
            })
            .collect();

        Ok::<_, ApplicationError>(AnalyticsOutput {
            generated_at: Utc::now(),
            low_stock_threshold: settings.low_stock_threshold,
            low_stock: low,
            fast_moving: fast_moving(&sales, settings.fast_moving_limit),
            slow_moving: slow_moving(&products, &sales, settings.slow_moving_limit),
            top_sellers: top_sellers(&sales, settings.top_sellers_limit),
            total_revenue: sales.iter().map(|sale| sale.effective_total()).sum(),
            total_units_sold: sales.iter().map(|sale| u64::from(sale.quantity)).sum(),
        })
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "analytics",
            format!("{} products at or below stock threshold", output.low_stock.len()),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("analytics", error),
    }
}
