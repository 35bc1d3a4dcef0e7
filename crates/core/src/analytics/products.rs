use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::domain::sale::Sale;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;
pub const DEFAULT_MOVEMENT_LIMIT: usize = 5;
pub const DEFAULT_TOP_SELLER_LIMIT: usize = 10;

/// Per-product sales rollup used by the movement reports. Revenue falls back
/// to `price × quantity` for sales whose total was not stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub id: ProductId,
    pub name: String,
    pub total_sold: u64,
    pub total_revenue: Decimal,
}

/// Products at or below `threshold` units, emptiest first.
pub fn low_stock(products: &[Product], threshold: u32) -> Vec<&Product> {
    let mut low: Vec<&Product> =
        products.iter().filter(|product| product.quantity <= threshold).collect();
    low.sort_by_key(|product| product.quantity);
    low
}

/// Best-selling products by units, only counting products that sold at all.
pub fn fast_moving(sales: &[Sale], limit: usize) -> Vec<ProductSales> {
    let mut rollup = rollup_sales(sales);
    rollup.retain(|entry| entry.total_sold > 0);
    rollup.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    rollup.truncate(limit);
    rollup
}

/// Worst-selling products by units. Catalog products with no sales at all
/// are included with zero sold.
pub fn slow_moving(products: &[Product], sales: &[Sale], limit: usize) -> Vec<ProductSales> {
    let mut rollup = rollup_sales(sales);
    for product in products {
        if !rollup.iter().any(|entry| entry.id == product.id) {
            rollup.push(ProductSales {
                id: product.id,
                name: product.name.clone(),
                total_sold: 0,
                total_revenue: Decimal::ZERO,
            });
        }
    }
    rollup.sort_by_key(|entry| entry.total_sold);
    rollup.truncate(limit);
    rollup
}

pub fn top_sellers(sales: &[Sale], limit: usize) -> Vec<ProductSales> {
    fast_moving(sales, limit)
}

/// Sales at or after `start`, newest first. Undated sales are dropped.
pub fn sales_since(sales: &[Sale], start: DateTime<Utc>) -> Vec<&Sale> {
    let mut recent: Vec<&Sale> =
        sales.iter().filter(|sale| sale.occurred_at_or_after(start)).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent
}

/// Groups sales by product in order of first appearance.
fn rollup_sales(sales: &[Sale]) -> Vec<ProductSales> {
    let mut positions: HashMap<ProductId, usize> = HashMap::new();
    let mut rollup: Vec<ProductSales> = Vec::new();

    for sale in sales {
        let index = *positions.entry(sale.product_id).or_insert_with(|| {
            let name = if sale.product_name.trim().is_empty() {
                "Unknown Product".to_string()
            } else {
                sale.product_name.clone()
            };
            rollup.push(ProductSales {
                id: sale.product_id,
                name,
                total_sold: 0,
                total_revenue: Decimal::ZERO,
            });
            rollup.len() - 1
        });
        let entry = &mut rollup[index];
        entry.total_sold += u64::from(sale.quantity);
        entry.total_revenue += sale.effective_total();
    }

    rollup
}
