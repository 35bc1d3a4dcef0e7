use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::product::{NewProduct, ProductId, ProductPatch};
use partsdesk_core::errors::{ApplicationError, DomainError};
use partsdesk_core::inventory::{authorize, edit_product, InventoryAction, Role};
use partsdesk_db::{open_store, ProductRepository};

#[derive(Clone, Debug)]
pub struct AddProductArgs {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    pub description: Option<String>,
    pub specs: Vec<(String, String)>,
    pub role: Role,
}

pub fn add(options: &LoadOptions, args: AddProductArgs) -> CommandResult {
    let AddProductArgs { name, brand, category, price, quantity, description, specs, role } = args;
    let draft = NewProduct {
        name,
        brand,
        category,
        price,
        quantity,
        specs: specs.into_iter().collect::<BTreeMap<_, _>>(),
        description,
    };

    if let Err(error) = authorize(role, InventoryAction::AddProduct).and_then(|()| draft.validate())
    {
        return CommandResult::from_application_error("add-product", error.into());
    }

    let config = match load_config("add-product", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("add-product") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        Ok::<_, ApplicationError>(store.insert(draft).await?)
    });

    match result {
        Ok(product) => CommandResult::success_with_data(
            "add-product",
            format!("added product {} ({})", product.id, product.name),
            &product,
        ),
        Err(error) => CommandResult::from_application_error("add-product", error),
    }
}

#[derive(Clone, Debug)]
pub struct EditProductArgs {
    pub id: u64,
    pub patch: ProductPatch,
    pub role: Role,
}

/// Full-record update: the edited product replaces the stored one.
pub fn edit(options: &LoadOptions, args: EditProductArgs) -> CommandResult {
    let config = match load_config("edit-product", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("edit-product") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let id = ProductId(args.id);
    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let product =
            store.find_by_id(id).await?.ok_or(DomainError::ProductNotFound(id))?;

        let edited = edit_product(&product, args.patch, args.role)?;
        store.update(edited.clone()).await?;
        Ok::<_, ApplicationError>(edited)
    });

    match result {
        Ok(product) => CommandResult::success_with_data(
            "edit-product",
            format!("updated product {} ({})", product.id, product.name),
            &product,
        ),
        Err(error) => CommandResult::from_application_error("edit-product", error),
    }
}

pub fn delete(options: &LoadOptions, id: u64, role: Role) -> CommandResult {
    if let Err(error) = authorize(role, InventoryAction::DeleteProduct) {
        return CommandResult::from_application_error("delete-product", error.into());
    }

    let config = match load_config("delete-product", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("delete-product") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let id = ProductId(id);
    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        if store.find_by_id(id).await?.is_none() {
            return Err(ApplicationError::from(DomainError::ProductNotFound(id)));
        }
        store.delete(id).await?;
        Ok::<_, ApplicationError>(())
    });

    match result {
        Ok(()) => CommandResult::success("delete-product", format!("deleted product {id}")),
        Err(error) => CommandResult::from_application_error("delete-product", error),
    }
}

/// Parses `key=value` spec pairs such as `displacement=150cc`.
pub fn parse_spec(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid spec `{raw}` (expected key=value)"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid spec `{raw}` (key must not be empty)"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
