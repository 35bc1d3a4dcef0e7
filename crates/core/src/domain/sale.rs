use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lenient;
use crate::domain::product::{Product, ProductId};

/// One recorded sale. Sales are append-only; the list is roughly
/// chronological but not guaranteed sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// `None` when the stored timestamp could not be parsed. Such a sale never
    /// falls inside a reporting period.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: u32,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::decimal"
    )]
    pub price: Decimal,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::decimal"
    )]
    pub total: Decimal,
}

impl Sale {
    pub fn record(product: &Product, quantity: u32, at: DateTime<Utc>) -> Self {
        Self {
            date: Some(at),
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            price: product.price,
            total: product.price * Decimal::from(quantity),
        }
    }

    /// Stored total, or `price × quantity` when the total was lost.
    pub fn effective_total(&self) -> Decimal {
        if self.total.is_zero() {
            self.price * Decimal::from(self.quantity)
        } else {
            self.total
        }
    }

    pub fn occurred_at_or_after(&self, start: DateTime<Utc>) -> bool {
        self.date.is_some_and(|date| date >= start)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::Sale;
    use crate::domain::product::{Product, ProductId};

    fn brake_pads() -> Product {
        Product {
            id: ProductId(2),
            name: "Yamaha R15 Brake Pad Set".to_string(),
            brand: "Yamaha".to_string(),
            category: "brake".to_string(),
            price: Decimal::from(1200),
            quantity: 45,
            specs: Default::default(),
            description: None,
        }
    }

    #[test]
    fn recorded_sale_totals_price_times_quantity() {
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).single().expect("valid instant");
        let sale = Sale::record(&brake_pads(), 3, at);

        assert_eq!(sale.total, Decimal::from(3600));
        assert_eq!(sale.product_name, "Yamaha R15 Brake Pad Set");
        assert_eq!(sale.date, Some(at));
    }

    #[test]
    fn decodes_camel_case_storage_records() {
        let sale: Sale = serde_json::from_str(
            r#"{"date":"2024-01-01T05:30:00.000Z","productId":1,"productName":"Exhaust Pipe","quantity":2,"price":3500,"total":7000}"#,
        )
        .expect("decode sale");

        assert_eq!(sale.product_id, ProductId(1));
        assert_eq!(sale.total, Decimal::from(7000));
        assert!(sale.date.is_some());
    }

    #[test]
    fn unparseable_dates_decode_to_none() {
        let sale: Sale =
            serde_json::from_str(r#"{"date":"not a date","productId":1,"quantity":1,"total":5}"#)
                .expect("decode sale");

        assert_eq!(sale.date, None);
        let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single().expect("valid instant");
        assert!(!sale.occurred_at_or_after(start));
    }

    #[test]
    fn effective_total_falls_back_to_price_times_quantity() {
        let sale: Sale =
            serde_json::from_str(r#"{"productId":1,"quantity":4,"price":"250"}"#).expect("decode");

        assert_eq!(sale.total, Decimal::ZERO);
        assert_eq!(sale.effective_total(), Decimal::from(1000));
    }

    #[test]
    fn stored_money_fields_are_numbers() {
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).single().expect("valid instant");
        let value = serde_json::to_value(Sale::record(&brake_pads(), 2, at)).expect("encode sale");

        assert!(value["price"].is_number(), "price serialized as {}", value["price"]);
        assert!(value["total"].is_number(), "total serialized as {}", value["total"]);
        assert_eq!(value["total"].as_f64(), Some(2400.0));
    }
}
