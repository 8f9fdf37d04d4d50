//! Cart route handlers.
//!
//! A note on add-to-cart quantities: adding a product that is already in the
//! cart increments the stored quantity by exactly 1, no matter what quantity
//! the request carries. That is the behavior the frontend was built against,
//! so it is kept as-is; the requested quantity only applies to a brand-new
//! line.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use voltmart_core::ProductId;

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::{CartItem, CartProduct};
use crate::state::AppState;

/// Cart contents: products joined with their cart quantities.
#[instrument(skip(state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartProduct>>> {
    let products = CartRepository::new(state.pool())
        .products_for_user(user.id)
        .await?;

    Ok(Json(products))
}

/// Add-to-cart form data. The frontend sends the product id under several
/// keys depending on the page, so all are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<ProductId>,
    #[serde(rename = "_id")]
    pub legacy_id: Option<ProductId>,
    pub id: Option<ProductId>,
    pub quantity: Option<i32>,
}

impl AddToCartRequest {
    fn resolved_product_id(&self) -> Option<ProductId> {
        self.product_id.or(self.legacy_id).or(self.id)
    }
}

/// Add a product to the cart.
#[instrument(skip(state, body))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<Vec<CartItem>>> {
    let product_id = body
        .resolved_product_id()
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_owned()))?;

    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let cart = CartRepository::new(state.pool());

    match cart.find_item(user.id, product_id).await? {
        Some(existing) => {
            let next = quantity_after_add(Some(existing.quantity), body.quantity);
            cart.set_quantity(existing.id, next).await?;
        }
        None => {
            let quantity = quantity_after_add(None, body.quantity);
            if quantity > product.quantity {
                return Err(AppError::BadRequest(format!(
                    "Only {} in stock.",
                    product.quantity
                )));
            }
            cart.insert_item(user.id, product_id, quantity).await?;
        }
    }

    let items = cart.items_for_user(user.id).await?;
    Ok(Json(items))
}

/// The stored quantity after an add request.
///
/// An existing line always moves to current + 1; the requested quantity only
/// applies when the line is new (defaulting to 1).
const fn quantity_after_add(existing: Option<i32>, requested: Option<i32>) -> i32 {
    match existing {
        Some(current) => current + 1,
        None => match requested {
            Some(quantity) => quantity,
            None => 1,
        },
    }
}

/// Remove-from-cart form data; no product id clears the whole cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: Option<ProductId>,
}

/// Remove one product from the cart, or clear it.
#[instrument(skip(state, body))]
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<Vec<CartItem>>> {
    let cart = CartRepository::new(state.pool());

    match body.product_id {
        Some(product_id) => cart.remove_product(user.id, product_id).await?,
        None => cart.clear(user.id).await?,
    }

    let items = cart.items_for_user(user.id).await?;
    Ok(Json(items))
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Set a cart line's quantity; zero deletes the line.
#[instrument(skip(state, body))]
pub async fn update_quantity(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<Vec<CartItem>>> {
    let cart = CartRepository::new(state.pool());

    if body.quantity == 0 {
        cart.remove_product(user.id, product_id).await?;
    } else {
        let product = ProductRepository::new(state.pool())
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

        if body.quantity > product.quantity {
            return Err(AppError::BadRequest(format!(
                "Only {} in stock.",
                product.quantity
            )));
        }

        let item = cart
            .find_item(user.id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found in cart".to_owned()))?;

        cart.set_quantity(item.id, body.quantity).await?;
    }

    let items = cart.items_for_user(user.id).await?;
    Ok(Json(items))
}

/// Upsert the user's billing address from the checkout form.
#[instrument(skip(state, body))]
pub async fn set_billing_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>> {
    if !body.is_object() || body.as_object().is_some_and(serde_json::Map::is_empty) {
        return Err(AppError::BadRequest(
            "invalid form. Please enter all the necessary form fields.".to_owned(),
        ));
    }

    UserRepository::new(state.pool())
        .set_address(user.id, &body)
        .await?;

    Ok(Json(json!({
        "success": true,
        "msg": "billing address updated successfully.",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_uses_requested_quantity() {
        assert_eq!(quantity_after_add(None, Some(3)), 3);
        assert_eq!(quantity_after_add(None, None), 1);
    }

    #[test]
    fn test_existing_line_always_increments_by_one() {
        // Cart has quantity 3; an add request with quantity 1 yields 4.
        assert_eq!(quantity_after_add(Some(3), Some(1)), 4);
        // A follow-up add with quantity 10 yields 5, not 14 and not 10.
        assert_eq!(quantity_after_add(Some(4), Some(10)), 5);
        assert_eq!(quantity_after_add(Some(4), None), 5);
    }
}
