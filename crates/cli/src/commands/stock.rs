use chrono::Utc;
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult};
use partsdesk_core::config::LoadOptions;
use partsdesk_core::domain::product::ProductId;
use partsdesk_core::domain::sale::Sale;
use partsdesk_core::errors::{ApplicationError, DomainError};
use partsdesk_core::inventory::{adjust_stock, set_stock, Role, StockDirection};
use partsdesk_db::{open_store, ProductRepository, SaleRepository};

#[derive(Debug, Serialize)]
struct StockOutput {
    product_id: ProductId,
    previous_quantity: u32,
    quantity: u32,
    change: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sale: Option<Sale>,
}

/// Positive `change` restocks, negative sells (and records a sale).
pub fn adjust(options: &LoadOptions, id: u64, change: i64, role: Role) -> CommandResult {
    let (direction, units) = match split_change(change) {
        Ok(split) => split,
        Err(message) => return CommandResult::failure("stock", "bad_request", message, 5),
    };

    let config = match load_config("stock", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("stock") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let product = store
            .find_by_id(ProductId(id))
            .await?
            .ok_or(DomainError::ProductNotFound(ProductId(id)))?;

        let adjustment = adjust_stock(&product, direction, units, role, Utc::now())?;
        store.update_quantity(product.id, adjustment.product.quantity).await?;
        if let Some(sale) = &adjustment.sale {
            store.append_sale(sale.clone()).await?;
        }

        Ok::<_, ApplicationError>(StockOutput {
            product_id: product.id,
            previous_quantity: product.quantity,
            quantity: adjustment.product.quantity,
            change: adjustment.change,
            sale: adjustment.sale,
        })
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "stock",
            format!("product {} stock is now {}", output.product_id, output.quantity),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("stock", error),
    }
}

pub fn set(options: &LoadOptions, id: u64, quantity: u32, role: Role) -> CommandResult {
    let config = match load_config("set-stock", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("set-stock") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config)?;
        let product = store
            .find_by_id(ProductId(id))
            .await?
            .ok_or(DomainError::ProductNotFound(ProductId(id)))?;

        let updated = set_stock(&product, quantity, role)?;
        store.update_quantity(updated.id, updated.quantity).await?;

        Ok::<_, ApplicationError>(StockOutput {
            product_id: updated.id,
            previous_quantity: product.quantity,
            quantity: updated.quantity,
            change: i64::from(updated.quantity) - i64::from(product.quantity),
            sale: None,
        })
    });

    match result {
        Ok(output) => CommandResult::success_with_data(
            "set-stock",
            format!("product {} stock set to {}", output.product_id, output.quantity),
            &output,
        ),
        Err(error) => CommandResult::from_application_error("set-stock", error),
    }
}

fn split_change(change: i64) -> Result<(StockDirection, u32), String> {
    let direction = match change {
        0 => return Err("stock change must not be zero".to_string()),
        change if change > 0 => StockDirection::Restock,
        _ => StockDirection::Sell,
    };
    let units = u32::try_from(change.unsigned_abs())
        .map_err(|_| format!("stock change {change} is out of range"))?;
    Ok((direction, units))
}

#[cfg(test)]
mod tests {
    use partsdesk_core::inventory::StockDirection;

    use super::split_change;

    #[test]
    fn change_sign_picks_direction() {
        assert_eq!(split_change(4), Ok((StockDirection::Restock, 4)));
        assert_eq!(split_change(-3), Ok((StockDirection::Sell, 3)));
    }

    #[test]
    fn zero_and_oversized_changes_are_rejected() {
        assert!(split_change(0).is_err());
        assert!(split_change(i64::from(u32::MAX) + 1).is_err());
    }
}
