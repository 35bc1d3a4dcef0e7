use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::analytics::{sales_stats_by_product, SalesStats};
use partsdesk_core::catalog::{apply_filters, CatalogFilter, ComparisonSelection, SortOrder};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::product::{Product, ProductId};
use partsdesk_core::errors::ApplicationError;
use partsdesk_core::scoring::{
    comparison_highlights, score_selection, ComparisonHighlights, ScoreBand, ScoringStrategy,
};
use partsdesk_db::{open_store, ProductRepository, SaleRepository};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    Standout,
    Compatibility,
}

#[derive(Clone, Debug)]
pub struct CompareArgs {
    pub ids: Vec<u64>,
    pub strategy: StrategyKind,
    pub search: Option<String>,
    pub sort: SortOrder,
}

#[derive(Debug, Serialize)]
struct ComparedProduct {
    id: ProductId,
    name: String,
    brand: String,
    category: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    price: Decimal,
    quantity: u32,
    score: u8,
    band: ScoreBand,
    sales: SalesStats,
}

#[derive(Debug, Serialize)]
struct ComparisonOutput {
    strategy: ScoringStrategy,
    products: Vec<ComparedProduct>,
    highlights: ComparisonHighlights,
}

pub fn run(options: &LoadOptions, args: CompareArgs) -> CommandResult {
    let config = match load_config("compare", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let selection = match ComparisonSelection::from_ids(
        args.ids.iter().copied().map(ProductId),
        config.comparison.max_selection,
    ) {
        Ok(selection) => selection,
        Err(error) => {
            return CommandResult::from_application_error("compare", error.into());
        }
    };

    let strategy = match args.strategy {
        StrategyKind::Standout => ScoringStrategy::Standout,
        StrategyKind::Compatibility => ScoringStrategy::Compatibility {
            search_term: args.search.clone().unwrap_or_default(),
            sort: args.sort,
        },
    };

    let runtime = match runtime("compare") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let products = store.list_products().await?;
        let sales = store.list_sales().await?;

        let selected = selection.resolve(&products)?;
        let filter = CatalogFilter { search: args.search.clone(), ..CatalogFilter::default() };
        let shown: Vec<Product> = apply_filters(&products, &filter).into_iter().cloned().collect();

        let scores = score_selection(&strategy, &selected, &shown, &sales);
        let highlights = comparison_highlights(&selected, &sales, &scores);
        let stats = sales_stats_by_product(&sales);
        let compared = selected
            .iter()
            .zip(&scores)
            .map(|(product, score)| ComparedProduct {
                id: product.id,
                name: product.name.clone(),
                brand: product.brand.clone(),
                category: product.category.clone(),
                price: product.price,
                quantity: product.quantity,
                score: score.score,
                band: score.band,
                sales: stats.get(&product.id).cloned().unwrap_or_default(),
            })
            .collect();

        Ok::<_, ApplicationError>(ComparisonOutput {
            strategy: strategy.clone(),
            products: compared,
            highlights,
        })
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "compare",
            format!("compared {} products", output.products.len()),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("compare", error),
    }
}
