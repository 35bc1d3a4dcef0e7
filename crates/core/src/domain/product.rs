use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lenient;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::decimal"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: u32,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Same rules as [`NewProduct::validate`], applied to a stored product.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.name, &self.brand, &self.category, self.price)
    }

    /// Returns the spec value when present and not blank.
    pub fn spec(&self, key: &str) -> Option<&str> {
        self.specs.get(key).map(String::as_str).filter(|value| !value.trim().is_empty())
    }
}

/// Product fields supplied by an administrator before an id is assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.name, &self.brand, &self.category, self.price)
    }

    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            brand: self.brand,
            category: self.category,
            price: self.price,
            quantity: self.quantity,
            specs: self.specs,
            description: self.description,
        }
    }
}

/// Changes an administrator makes to an existing product. `None` keeps the
/// current value. Spec entries are merged; a blank value removes the key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub description: Option<String>,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, product: &Product) -> Product {
        let mut edited = product.clone();
        if let Some(name) = self.name {
            edited.name = name;
        }
        if let Some(brand) = self.brand {
            edited.brand = brand;
        }
        if let Some(category) = self.category {
            edited.category = category;
        }
        if let Some(price) = self.price {
            edited.price = price;
        }
        if let Some(quantity) = self.quantity {
            edited.quantity = quantity;
        }
        if let Some(description) = self.description {
            edited.description = Some(description).filter(|text| !text.trim().is_empty());
        }
        for (key, value) in self.specs {
            if value.trim().is_empty() {
                edited.specs.remove(&key);
            } else {
                edited.specs.insert(key, value);
            }
        }
        edited
    }
}

fn validate_fields(
    name: &str,
    brand: &str,
    category: &str,
    price: Decimal,
) -> Result<(), DomainError> {
    for (field, value) in [("name", name), ("brand", brand), ("category", category)] {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidProduct(format!("{field} must not be empty")));
        }
    }

    if price.is_sign_negative() {
        return Err(DomainError::InvalidProduct("price must not be negative".to_string()));
    }

    Ok(())
}

/// Next free id: one past the largest id in the catalog.
pub fn next_product_id(products: &[Product]) -> ProductId {
    ProductId(products.iter().map(|product| product.id.0).max().unwrap_or(0) + 1)
}
