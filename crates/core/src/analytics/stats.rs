use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::sale::Sale;

/// Lifetime sales figures for one product.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_quantity_sold: u64,
    pub total_revenue: Decimal,
    pub number_of_sales: usize,
}

impl SalesStats {
    pub fn for_product(sales: &[Sale], product_id: ProductId) -> Self {
        sales.iter().filter(|sale| sale.product_id == product_id).fold(
            Self::default(),
            |mut stats, sale| {
                stats.absorb(sale);
                stats
            },
        )
    }

    fn absorb(&mut self, sale: &Sale) {
        self.total_quantity_sold += u64::from(sale.quantity);
        self.total_revenue += sale.total;
        self.number_of_sales += 1;
    }
}

/// Groups the whole sales list by product in one pass.
pub fn sales_stats_by_product(sales: &[Sale]) -> HashMap<ProductId, SalesStats> {
    let mut by_product: HashMap<ProductId, SalesStats> = HashMap::new();
    for sale in sales {
        by_product.entry(sale.product_id).or_default().absorb(sale);
    }
    by_product
}
