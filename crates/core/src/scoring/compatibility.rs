//! Search-aware compatibility scoring for the catalog comparison table.
//!
//! Unlike the standout score this one ignores sales entirely: it rewards
//! matching the shopper's current search text, having the headline specs
//! filled in, and sitting at the end of the price range the shopper is
//! sorting towards.

use rust_decimal::prelude::ToPrimitive;

use super::standout::clamp_round;
use crate::catalog::SortOrder;
use crate::domain::product::Product;

pub const COMPATIBILITY_BASE: f64 = 50.0;

const NAME_MATCH: f64 = 10.0;
const BRAND_MATCH: f64 = 10.0;
const CATEGORY_MATCH: f64 = 8.0;
const PRICE_ALIGNMENT: f64 = 8.0;

/// Spec keys that earn points when present.
pub const SPEC_BONUSES: [(&str, f64); 3] =
    [("power", 6.0), ("size", 4.0), ("warranty_months", 4.0)];

pub fn compute_compatibility_score(
    product: &Product,
    all_products: &[Product],
    search_term: &str,
    sort: SortOrder,
) -> u8 {
    let mut score = COMPATIBILITY_BASE;

    let search = search_term.trim().to_lowercase();
    if !search.is_empty() {
        if product.name.to_lowercase().contains(&search) {
            score += NAME_MATCH;
        }
        if product.brand.to_lowercase().contains(&search) {
            score += BRAND_MATCH;
        }
        if product.category.to_lowercase().contains(&search) {
            score += CATEGORY_MATCH;
        }
    }

    score += SPEC_BONUSES
        .iter()
        .filter(|(key, _)| product.spec(key).is_some())
        .map(|(_, bonus)| bonus)
        .sum::<f64>();

    let prices: Vec<f64> =
        all_products.iter().map(|candidate| candidate.price.to_f64().unwrap_or(0.0)).collect();
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        let norm = (product.price.to_f64().unwrap_or(0.0) - min) / (max - min);
        score += match sort {
            SortOrder::PriceAsc => (1.0 - norm) * PRICE_ALIGNMENT,
            _ => norm * PRICE_ALIGNMENT,
        };
    }

    clamp_round(score)
}
