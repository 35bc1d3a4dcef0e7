//! Demo catalog and sales used to seed an empty local store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use partsdesk_core::domain::product::{Product, ProductId};
use partsdesk_core::domain::sale::Sale;

const SAMPLE_PRODUCTS: &[(u64, &str, &str, &str, i64, u32)] = &[
    (1, "Honda CB150R Exhaust Pipe", "Honda", "exhaust", 3500, 3),
    (2, "Yamaha R15 Brake Pad Set", "Yamaha", "brake", 1200, 45),
    (3, "Honda PCX160 Engine Oil Filter", "Honda", "engine", 450, 8),
    (4, "Yamaha MT-15 LED Headlight", "Yamaha", "accessories", 5500, 12),
    (5, "Honda Click 125i Air Filter", "Honda", "engine", 350, 52),
    (6, "Yamaha NMAX Suspension Kit", "Yamaha", "suspension", 8500, 15),
    (7, "Honda Grom Handlebar Grips", "Honda", "accessories", 800, 1),
    (8, "Yamaha R3 Racing Chain", "Yamaha", "engine", 3200, 5),
    (9, "Honda CRF250L Tire Set", "Honda", "tire", 6500, 22),
    (10, "Yamaha XSR700 Seat Cover", "Yamaha", "accessories", 2800, 18),
];

/// (product id, quantity)
const SAMPLE_SALES: &[(u64, u32)] = &[
    (1, 15),
    (1, 8),
    (2, 12),
    (2, 10),
    (2, 5),
    (3, 20),
    (3, 15),
    (4, 3),
    (5, 25),
    (5, 18),
    (6, 2),
    (7, 1),
];

pub fn sample_products() -> Vec<Product> {
    SAMPLE_PRODUCTS
        .iter()
        .map(|&(id, name, brand, category, price, quantity)| Product {
            id: ProductId(id),
            name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            price: Decimal::from(price),
            quantity,
            specs: BTreeMap::new(),
            description: None,
        })
        .collect()
}

/// Every sample sale is stamped `now`, so all of them land in the current
/// day, week and month.
pub fn sample_sales(now: DateTime<Utc>) -> Vec<Sale> {
    let products = sample_products();
    SAMPLE_SALES
        .iter()
        .filter_map(|&(id, quantity)| {
            products
                .iter()
                .find(|product| product.id == ProductId(id))
                .map(|product| Sale::record(product, quantity, now))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{sample_products, sample_sales};

    #[test]
    fn sample_sales_carry_product_price_and_total() {
        let sales = sample_sales(Utc::now());

        assert_eq!(sales.len(), 12);
        assert_eq!(sales[0].product_name, "Honda CB150R Exhaust Pipe");
        assert_eq!(sales[0].total, Decimal::from(52_500));
        let revenue: Decimal = sales.iter().map(|sale| sale.total).sum();
        assert_eq!(revenue, Decimal::from(178_000));
    }

    #[test]
    fn sample_catalog_ids_are_sequential() {
        let ids: Vec<u64> = sample_products().iter().map(|product| product.id.0).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
