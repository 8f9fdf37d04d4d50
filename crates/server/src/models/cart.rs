//! Cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use voltmart_core::{CartItemId, ProductId, UserId};

use super::Product;

/// A single cart line: one row per (user, product) pair.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Cart response shape: the full product with the cart quantity substituted
/// in, matching what the SPA renders on the cart page.
#[derive(Debug, Clone, Serialize)]
pub struct CartProduct {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: i32,
}
