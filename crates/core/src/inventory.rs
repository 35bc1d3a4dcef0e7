//! Role-gated stock and catalog edits.
//!
//! Roles arrive from whatever front end signed the operator in; this module
//! only decides what each role may do and how a stock change turns into a
//! recorded sale.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::product::{Product, ProductPatch};
use crate::domain::sale::Sale;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    pub fn can(&self, action: InventoryAction) -> bool {
        match self {
            Self::Admin => true,
            Self::Staff => matches!(action, InventoryAction::AdjustStock | InventoryAction::SetStock),
            Self::Guest => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role `{other}` (expected guest|staff|admin)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    AdjustStock,
    SetStock,
    AddProduct,
    EditProduct,
    DeleteProduct,
}

impl fmt::Display for InventoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AdjustStock => "adjust stock",
            Self::SetStock => "set stock",
            Self::AddProduct => "add products",
            Self::EditProduct => "edit products",
            Self::DeleteProduct => "delete products",
        };
        f.write_str(label)
    }
}

pub fn authorize(role: Role, action: InventoryAction) -> Result<(), DomainError> {
    if role.can(action) {
        Ok(())
    } else {
        Err(DomainError::Forbidden { role, action })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockDirection {
    Restock,
    Sell,
}

impl StockDirection {
    fn sign(self) -> i64 {
        match self {
            Self::Restock => 1,
            Self::Sell => -1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product: Product,
    pub change: i64,
    /// Present when stock left the shelf.
    pub sale: Option<Sale>,
}

/// Moves stock by `units` in `direction`. Selling records a sale priced at
/// the product's current price. A unit count of zero is treated as one.
pub fn adjust_stock(
    product: &Product,
    direction: StockDirection,
    units: u32,
    role: Role,
    now: DateTime<Utc>,
) -> Result<StockAdjustment, DomainError> {
    authorize(role, InventoryAction::AdjustStock)?;

    let units = units.max(1);
    let change = direction.sign() * i64::from(units);
    let next = i64::from(product.quantity) + change;
    if next < 0 {
        return Err(DomainError::NegativeStock {
            product_id: product.id,
            current: product.quantity,
            change,
        });
    }
    let next = u32::try_from(next).map_err(|_| {
        DomainError::InvariantViolation(format!("stock for product {} overflowed", product.id))
    })?;

    let mut updated = product.clone();
    updated.quantity = next;
    let sale = matches!(direction, StockDirection::Sell).then(|| Sale::record(product, units, now));

    info!(
        event_name = "partsdesk.inventory.stock_adjusted",
        product_id = product.id.0,
        change,
        new_quantity = next,
        role = role.as_str(),
        "stock adjusted"
    );

    Ok(StockAdjustment { product: updated, change, sale })
}

/// Overwrites the stock level without recording a sale.
pub fn set_stock(product: &Product, quantity: u32, role: Role) -> Result<Product, DomainError> {
    authorize(role, InventoryAction::SetStock)?;

    let mut updated = product.clone();
    updated.quantity = quantity;
    Ok(updated)
}

/// Applies an administrator's edit. The result must still pass product
/// validation; the id never changes.
pub fn edit_product(
    product: &Product,
    patch: ProductPatch,
    role: Role,
) -> Result<Product, DomainError> {
    authorize(role, InventoryAction::EditProduct)?;
    if patch.is_empty() {
        return Err(DomainError::InvalidProduct("edit changes nothing".to_string()));
    }

    let edited = patch.apply_to(product);
    edited.validate()?;

    info!(
        event_name = "partsdesk.inventory.product_edited",
        product_id = product.id.0,
        role = role.as_str(),
        "product edited"
    );
    Ok(edited)
}
