pub mod analytics;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod inventory;
pub mod scoring;

pub use analytics::{
    aggregate, fast_moving, low_stock, sales_since, slow_moving, top_sellers, Bucket,
    IncomeReport, Period, PeriodSelector, ProductSales, SalesStats,
};
pub use catalog::{
    apply_filters, sort_products, CatalogFilter, ComparisonSelection, PriceRange, SortOrder,
};
pub use domain::product::{NewProduct, Product, ProductId, ProductPatch};
pub use domain::sale::Sale;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use inventory::{
    adjust_stock, edit_product, set_stock, InventoryAction, Role, StockAdjustment,
    StockDirection,
};
pub use scoring::{
    comparison_highlights, compute_compatibility_score, compute_standout_score, score_selection,
    ComparisonHighlights, ScoreBand, ScoreResult, ScoringStrategy,
};
