//! Comparison scoring.
//!
//! Two independent policies live here. The standout score ranks the selected
//! products against each other on sales, revenue, stock and price. The
//! compatibility score rates a catalog entry against the shopper's current
//! search and sort. They are kept as separate strategies; pick the one that
//! matches the screen doing the comparison.

mod compatibility;
mod standout;

pub use compatibility::{compute_compatibility_score, COMPATIBILITY_BASE, SPEC_BONUSES};
pub use standout::{
    compute_standout_score, ComparisonEntry, StandoutComponents, StandoutScorer, StandoutWeights,
};

use serde::{Deserialize, Serialize};

use crate::analytics::SalesStats;
use crate::catalog::SortOrder;
use crate::domain::product::{Product, ProductId};
use crate::domain::sale::Sale;

pub const DEFAULT_STANDOUT_WEIGHTS: StandoutWeights =
    StandoutWeights { sales_volume: 40.0, revenue: 30.0, stock: 20.0, price: 10.0 };

/// Scores at or above this are shown as a strong match.
pub const GOOD_SCORE: u8 = 80;

/// Scores below this are shown as a weak match.
pub const POOR_SCORE: u8 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ScoringStrategy {
    Standout,
    Compatibility { search_term: String, sort: SortOrder },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Neutral,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= GOOD_SCORE {
            Self::Good
        } else if score < POOR_SCORE {
            Self::Poor
        } else {
            Self::Neutral
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub product_id: ProductId,
    pub score: u8,
    pub band: ScoreBand,
}

impl ScoreResult {
    fn new(product_id: ProductId, score: u8) -> Self {
        Self { product_id, score, band: ScoreBand::from_score(score) }
    }
}

/// Badges for the comparison header: the best seller (only when something
/// sold) and the highest score. Ties go to the earlier selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonHighlights {
    pub top_selling: Option<ProductId>,
    pub most_standout: Option<ProductId>,
}

pub fn comparison_highlights(
    selected: &[&Product],
    sales: &[Sale],
    results: &[ScoreResult],
) -> ComparisonHighlights {
    let mut top_selling: Option<(ProductId, u64)> = None;
    for product in selected {
        let sold = SalesStats::for_product(sales, product.id).total_quantity_sold;
        if sold > 0 && top_selling.map_or(true, |(_, best)| sold > best) {
            top_selling = Some((product.id, sold));
        }
    }

    let mut most_standout: Option<&ScoreResult> = None;
    for result in results {
        if most_standout.map_or(true, |best| result.score > best.score) {
            most_standout = Some(result);
        }
    }

    ComparisonHighlights {
        top_selling: top_selling.map(|(id, _)| id),
        most_standout: most_standout.map(|result| result.product_id),
    }
}

/// Scores every selected product under one strategy, preserving selection
/// order. `catalog` is the product list currently shown to the shopper and
/// only matters for the compatibility price range.
pub fn score_selection(
    strategy: &ScoringStrategy,
    selected: &[&Product],
    catalog: &[Product],
    sales: &[Sale],
) -> Vec<ScoreResult> {
    match strategy {
        ScoringStrategy::Standout => {
            let entries: Vec<ComparisonEntry<'_>> = selected
                .iter()
                .map(|product| ComparisonEntry::from_sales(product, sales))
                .collect();
            entries
                .iter()
                .map(|entry| {
                    let score = compute_standout_score(entry.product, &entry.stats, &entries);
                    ScoreResult::new(entry.product.id, score)
                })
                .collect()
        }
        ScoringStrategy::Compatibility { search_term, sort } => selected
            .iter()
            .map(|product| {
                let score = compute_compatibility_score(product, catalog, search_term, *sort);
                ScoreResult::new(product.id, score)
            })
            .collect(),
    }
}
