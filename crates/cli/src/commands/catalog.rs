use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::catalog::{
    apply_filters, format_category_name, sort_products, unique_brands, unique_categories,
    CatalogFilter, SortOrder,
};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::product::ProductId;
use partsdesk_core::errors::ApplicationError;
use partsdesk_db::{open_store, ProductRepository};

#[derive(Debug, Serialize)]
struct CatalogItem {
    id: ProductId,
    name: String,
    brand: String,
    category: String,
    price: Decimal,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct CatalogOutput {
    sort: SortOrder,
    total: usize,
    products: Vec<CatalogItem>,
    brands: Vec<String>,
    categories: Vec<String>,
}

pub fn run(options: &LoadOptions, filter: CatalogFilter, sort: SortOrder) -> CommandResult {
    let config = match load_config("catalog", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("catalog") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let products = store.list_products().await?;

        let mut shown = apply_filters(&products, &filter);
        sort_products(&mut shown, sort);

        let items: Vec<CatalogItem> = shown
            .into_iter()
            .map(|product| CatalogItem {
                id: product.id,
                name: product.name.clone(),
                brand: product.brand.clone(),
                category: format_category_name(&product.category),
                price: product.price,
                quantity: product.quantity,
            })
            .collect();

        Ok::<_, ApplicationError>(CatalogOutput {
            sort,
            total: products.len(),
            products: items,
            brands: unique_brands(&products),
            categories: unique_categories(&products),
        })
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "catalog",
            format!("showing {} of {} products", output.products.len(), output.total),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("catalog", error),
    }
}
