//! Sales-standout scoring for the comparison view.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::analytics::stats::SalesStats;
use crate::domain::product::Product;
use crate::domain::sale::Sale;

/// Points available per factor. The default table sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandoutWeights {
    pub sales_volume: f64,
    pub revenue: f64,
    pub stock: f64,
    pub price: f64,
}

impl Default for StandoutWeights {
    fn default() -> Self {
        super::DEFAULT_STANDOUT_WEIGHTS
    }
}

/// A comparison-set member together with its aggregated sales.
#[derive(Debug, Clone)]
pub struct ComparisonEntry<'a> {
    pub product: &'a Product,
    pub stats: SalesStats,
}

impl<'a> ComparisonEntry<'a> {
    pub fn from_sales(product: &'a Product, sales: &[Sale]) -> Self {
        Self { product, stats: SalesStats::for_product(sales, product.id) }
    }
}

/// Weighted factor values before they are summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StandoutComponents {
    pub sales_volume: f64,
    pub revenue: f64,
    pub stock: f64,
    pub price: f64,
}

impl StandoutComponents {
    pub fn total(&self) -> f64 {
        self.sales_volume + self.revenue + self.stock + self.price
    }
}

#[derive(Debug, Clone, Default)]
pub struct StandoutScorer {
    weights: StandoutWeights,
}

impl StandoutScorer {
    pub fn new() -> Self {
        Self { weights: StandoutWeights::default() }
    }

    pub fn with_weights(weights: StandoutWeights) -> Self {
        Self { weights }
    }

    pub fn components(
        &self,
        product: &Product,
        stats: &SalesStats,
        comparison_set: &[ComparisonEntry<'_>],
    ) -> StandoutComponents {
        let max_sold = floor_max(
            comparison_set.iter().map(|entry| entry.stats.total_quantity_sold as f64),
        );
        let max_revenue =
            floor_max(comparison_set.iter().map(|entry| to_f64(&entry.stats.total_revenue)));
        let max_stock =
            floor_max(comparison_set.iter().map(|entry| f64::from(entry.product.quantity)));

        StandoutComponents {
            sales_volume: stats.total_quantity_sold as f64 / max_sold * self.weights.sales_volume,
            revenue: to_f64(&stats.total_revenue) / max_revenue * self.weights.revenue,
            stock: f64::from(product.quantity) / max_stock * self.weights.stock,
            price: self.price_component(product, comparison_set),
        }
    }

    pub fn score(
        &self,
        product: &Product,
        stats: &SalesStats,
        comparison_set: &[ComparisonEntry<'_>],
    ) -> u8 {
        clamp_round(self.components(product, stats, comparison_set).total())
    }

    /// Cheaper scores higher. Falls back to the midpoint when prices give no
    /// spread or the product has no price.
    fn price_component(&self, product: &Product, comparison_set: &[ComparisonEntry<'_>]) -> f64 {
        let midpoint = self.weights.price / 2.0;
        let price = to_f64(&product.price);

        let positive_prices = comparison_set
            .iter()
            .map(|entry| to_f64(&entry.product.price))
            .filter(|price| *price > 0.0);
        let (min_price, max_price) = positive_prices
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), price| {
                (min.min(price), max.max(price))
            });

        if max_price > min_price && price > 0.0 {
            (max_price - price) / (max_price - min_price) * self.weights.price
        } else {
            midpoint
        }
    }
}

/// Standout score in `0..=100` for `product` against the comparison set it
/// belongs to.
pub fn compute_standout_score(
    product: &Product,
    stats: &SalesStats,
    comparison_set: &[ComparisonEntry<'_>],
) -> u8 {
    StandoutScorer::new().score(product, stats, comparison_set)
}

fn floor_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(1.0, f64::max)
}

fn to_f64(value: &rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

pub(crate) fn clamp_round(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{clamp_round, compute_standout_score, ComparisonEntry, StandoutScorer};
    use crate::analytics::stats::SalesStats;
    use crate::domain::product::{Product, ProductId};

    fn product(id: u64, price: i64, quantity: u32) -> Product {
        Product {
            id: ProductId(id),
            name: format!("part-{id}"),
            brand: "Honda".to_string(),
            category: "engine".to_string(),
            price: Decimal::from(price),
            quantity,
            specs: Default::default(),
            description: None,
        }
    }

    fn stats(sold: u64, revenue: i64) -> SalesStats {
        SalesStats {
            total_quantity_sold: sold,
            total_revenue: Decimal::from(revenue),
            number_of_sales: usize::from(sold > 0),
        }
    }

    fn scores(entries: &[ComparisonEntry<'_>]) -> Vec<u8> {
        entries
            .iter()
            .map(|entry| compute_standout_score(entry.product, &entry.stats, entries))
            .collect()
    }

    #[test]
    fn dominant_product_scores_one_hundred() {
        let leader = product(1, 350, 52);
        let other = product(2, 3500, 3);
        let entries = vec![
            ComparisonEntry { product: &leader, stats: stats(43, 15_050) },
            ComparisonEntry { product: &other, stats: stats(23, 10_000) },
        ];

        let scores = scores(&entries);
        assert_eq!(scores[0], 100);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn weakest_product_gets_only_its_proportional_share() {
        let leader = product(1, 100, 10);
        let weakest = product(2, 200, 5);
        let entries = vec![
            ComparisonEntry { product: &leader, stats: stats(10, 1000) },
            ComparisonEntry { product: &weakest, stats: stats(5, 500) },
        ];

        let components =
            StandoutScorer::new().components(&weakest, &entries[1].stats, &entries);
        assert!((components.sales_volume - 20.0).abs() < 1e-9);
        assert!((components.revenue - 15.0).abs() < 1e-9);
        assert!((components.stock - 10.0).abs() < 1e-9);
        assert!(components.price.abs() < 1e-9);
        assert_eq!(scores(&entries), vec![100, 45]);
    }

    #[test]
    fn degenerate_set_scores_are_equal() {
        let a = product(1, 500, 4);
        let b = product(2, 500, 4);
        let c = product(3, 500, 4);
        let entries = vec![
            ComparisonEntry { product: &a, stats: SalesStats::default() },
            ComparisonEntry { product: &b, stats: SalesStats::default() },
            ComparisonEntry { product: &c, stats: SalesStats::default() },
        ];

        let scores = scores(&entries);
        assert!(scores.windows(2).all(|pair| pair[0] == pair[1]));
        // stock 20 + price midpoint 5
        assert_eq!(scores[0], 25);
    }

    #[test]
    fn zero_sales_do_not_divide_by_zero() {
        let a = product(1, 0, 0);
        let entries = vec![ComparisonEntry { product: &a, stats: SalesStats::default() }];

        assert_eq!(scores(&entries), vec![5]);
    }

    #[test]
    fn single_member_set_uses_price_midpoint() {
        let a = product(1, 1200, 45);
        let entries = vec![ComparisonEntry { product: &a, stats: stats(27, 32_400) }];

        assert_eq!(scores(&entries), vec![95]);
    }

    #[test]
    fn empty_set_degrades_without_panicking() {
        let a = product(1, 1200, 45);
        let score = compute_standout_score(&a, &stats(2, 2400), &[]);
        assert_eq!(score, 100);
    }

    #[test]
    fn scores_stay_within_bounds_for_varied_sets() {
        let products: Vec<Product> = (1..=4)
            .map(|id| product(id, (id as i64 * 997) % 5000, (id as u32 * 13) % 60))
            .collect();
        let entries: Vec<ComparisonEntry<'_>> = products
            .iter()
            .enumerate()
            .map(|(index, product)| ComparisonEntry {
                product,
                stats: stats((index as u64 * 7) % 11, (index as i64 * 4_321) % 20_000),
            })
            .collect();

        for score in scores(&entries) {
            assert!(score <= 100);
        }
    }

    #[test]
    fn clamp_round_handles_out_of_range_values() {
        assert_eq!(clamp_round(-3.0), 0);
        assert_eq!(clamp_round(140.2), 100);
        assert_eq!(clamp_round(44.5), 45);
        assert_eq!(clamp_round(f64::NAN), 0);
    }
}
