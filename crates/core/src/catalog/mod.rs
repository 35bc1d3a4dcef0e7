//! Catalog search, filtering and ordering.

pub mod comparison;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::DomainError;

pub use comparison::{ComparisonSelection, DEFAULT_MAX_SELECTION, MIN_SELECTION};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            other => Err(format!(
                "unsupported sort `{other}` (expected price_asc|price_desc|name_asc|name_desc)"
            )),
        }
    }
}

/// Inclusive price bounds. `max == None` means open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

impl FromStr for PriceRange {
    type Err = DomainError;

    /// Accepts `min-max`, `min-+` and `min+`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPriceRange(value.to_string());
        let trimmed = value.trim();

        let (min_raw, max_raw) = match trimmed.split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (trimmed.strip_suffix('+').ok_or_else(invalid)?, None),
        };

        let min = min_raw.trim().parse::<Decimal>().map_err(|_| invalid())?;
        let max = match max_raw.map(str::trim) {
            None | Some("+") => None,
            Some(raw) => Some(raw.parse::<Decimal>().map_err(|_| invalid())?),
        };

        if min.is_sign_negative() || max.is_some_and(|max| max < min) {
            return Err(invalid());
        }

        Ok(Self { min, max })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && self.category.as_deref().map_or(true, |category| product.category == category)
            && self.brand.as_deref().map_or(true, |brand| product.brand == brand)
            && self.price_range.map_or(true, |range| range.contains(product.price))
    }

    fn matches_search(&self, product: &Product) -> bool {
        let Some(term) = self.search.as_deref().map(|term| term.trim().to_lowercase()) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }

        [Some(&product.name), Some(&product.brand), Some(&product.category)]
            .into_iter()
            .chain(std::iter::once(product.description.as_ref()))
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

pub fn apply_filters<'a>(products: &'a [Product], filter: &CatalogFilter) -> Vec<&'a Product> {
    products.iter().filter(|product| filter.matches(product)).collect()
}

pub fn sort_products(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::NameAsc => products.sort_by_key(|product| product.name.to_lowercase()),
        SortOrder::NameDesc => {
            products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
        }
    }
}

pub fn unique_brands(products: &[Product]) -> Vec<String> {
    unique(products.iter().map(|product| product.brand.as_str()))
}

pub fn unique_categories(products: &[Product]) -> Vec<String> {
    unique(products.iter().map(|product| product.category.as_str()))
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `"exhaust"` → `"Exhaust"`.
pub fn format_category_name(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
