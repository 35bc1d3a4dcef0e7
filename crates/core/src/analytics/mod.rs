//! Sales reporting: per-product stats, income over time and stock movement.

pub mod income;
pub mod products;
pub mod stats;

pub use income::{aggregate, Bucket, IncomeReport, Period, PeriodSelector, WEEKDAY_LABELS};
pub use products::{
    fast_moving, low_stock, sales_since, slow_moving, top_sellers, ProductSales,
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_MOVEMENT_LIMIT, DEFAULT_TOP_SELLER_LIMIT,
};
pub use stats::{sales_stats_by_product, SalesStats};
