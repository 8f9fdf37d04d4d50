//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use voltmart_core::ProductId;

/// A catalog product.
///
/// `name` doubles as the PDP slug, so it carries a unique constraint.
/// `quantity` is the on-hand stock, decremented inside the order-creation
/// transaction when a payment is confirmed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image: String,
    pub category: String,
    pub quantity: i32,
    pub is_featured: bool,
    /// Clearance flag. Close-out products are excluded from normal category
    /// listings and surfaced only on the clearance page.
    pub close_out: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a shopper actually pays: sale price when set, list price
    /// otherwise.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: Decimal, sale_price: Option<Decimal>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Ceiling Fan".to_owned(),
            description: "Energy-efficient ceiling fan".to_owned(),
            price,
            sale_price,
            image: String::new(),
            category: "fans".to_owned(),
            quantity: 10,
            is_featured: false,
            close_out: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let p = product(Decimal::new(19999, 2), Some(Decimal::new(14999, 2)));
        assert_eq!(p.effective_price(), Decimal::new(14999, 2));
    }

    #[test]
    fn test_effective_price_falls_back_to_list() {
        let p = product(Decimal::new(19999, 2), None);
        assert_eq!(p.effective_price(), Decimal::new(19999, 2));
    }

    #[test]
    fn test_serializes_camel_case() {
        let p = product(Decimal::new(19999, 2), None);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("salePrice").is_some());
        assert!(json.get("isFeatured").is_some());
        assert!(json.get("closeOut").is_some());
    }
}
