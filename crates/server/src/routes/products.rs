//! Product route handlers: catalog queries, admin mutations, and warranty
//! claims.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use voltmart_core::{ProductId, WarrantyClaimId, WarrantyStatus};

use crate::db::products::{NewProduct, ProductRepository, ProductUpdate};
use crate::db::warranty::{NewWarrantyClaim, WarrantyRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::models::Product;
use crate::state::AppState;

/// All products (admin listing).
#[instrument(skip(state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let products = ProductRepository::new(state.pool()).all().await?;

    Ok(Json(json!({ "products": products })))
}

/// Featured products, served through the read-through cache.
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().featured(state.pool()).await?;

    Ok(Json(products.as_ref().clone()))
}

/// Products in a category, excluding close-out stock.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<JsonValue>> {
    let products = ProductRepository::new(state.pool())
        .by_category(&category)
        .await?;

    Ok(Json(json!({ "success": true, "products": products })))
}

/// Close-out products for the clearance page.
#[instrument(skip(state))]
pub async fn clearance(State(state): State<AppState>) -> Result<Json<JsonValue>> {
    let products = ProductRepository::new(state.pool()).clearance().await?;

    if products.is_empty() {
        return Err(AppError::NotFound(
            "No clearance sale products found".to_owned(),
        ));
    }

    Ok(Json(json!({ "products": products })))
}

/// A random sample of products for the recommendation strip.
#[instrument(skip(state))]
pub async fn recommended(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).recommended(4).await?;

    Ok(Json(products))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

/// Case-insensitive product name search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<JsonValue>> {
    let name = params
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter is required".to_owned()))?;

    let products = ProductRepository::new(state.pool())
        .search_by_name(&name)
        .await?;

    if products.is_empty() {
        return Err(AppError::NotFound("No products found".to_owned()));
    }

    Ok(Json(json!({ "products": products })))
}

/// Product detail page data, addressed by exact name.
#[instrument(skip(state))]
pub async fn pdp(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<JsonValue>> {
    let product = ProductRepository::new(state.pool())
        .get_by_name(&name)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// Create-product form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
    pub quantity: i32,
    #[serde(default)]
    pub close_out: bool,
}

/// Create a product (admin).
#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = NewProduct {
        name: body.name,
        description: body.description,
        price: body.price,
        sale_price: body.sale_price,
        image: body.image.unwrap_or_default(),
        category: body.category,
        quantity: body.quantity,
        close_out: body.close_out,
    };

    let product = ProductRepository::new(state.pool()).create(&new).await?;

    state.catalog().refresh_featured(state.pool()).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Delete a product (admin).
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<JsonValue>> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    state.catalog().refresh_featured(state.pool()).await?;

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// Edit-product form data; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
}

/// Partially update a product (admin).
#[instrument(skip(state, body))]
pub async fn edit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<EditProductRequest>,
) -> Result<Json<Product>> {
    let update = ProductUpdate {
        name: body.name,
        description: body.description,
        price: body.price,
        sale_price: body.sale_price,
        image: body.image,
        category: body.category,
        quantity: body.quantity,
    };

    let product = ProductRepository::new(state.pool()).update(id, &update).await?;

    state.catalog().refresh_featured(state.pool()).await?;

    Ok(Json(product))
}

/// Flip a product's featured flag (admin).
#[instrument(skip(state))]
pub async fn toggle_featured(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).toggle_featured(id).await?;

    state.catalog().refresh_featured(state.pool()).await?;

    Ok(Json(product))
}

/// Stock pre-check form data.
#[derive(Debug, Deserialize)]
pub struct CheckQuantityRequest {
    pub id: ProductId,
    pub quantity: i32,
}

/// Pre-check that a requested quantity is in stock. Read-only; the actual
/// decrement happens inside the order-creation transaction.
#[instrument(skip(state))]
pub async fn check_quantity(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckQuantityRequest>,
) -> Result<Json<JsonValue>> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "Quantity cannot be negative".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(body.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if product.quantity < body.quantity {
        return Err(AppError::BadRequest(format!(
            "Only {} in stock.",
            product.quantity
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Product quantity updated successfully",
    })))
}

/// Warranty claim form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimWarrantyRequest {
    pub product_name: Option<String>,
    pub reason: Option<String>,
    pub photo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// File a warranty claim. The photo arrives as an already-hosted URL.
#[instrument(skip(state, body))]
pub async fn claim_warranty(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ClaimWarrantyRequest>,
) -> Result<(StatusCode, Json<JsonValue>)> {
    let (Some(product_name), Some(reason), Some(photo), Some(address), Some(phone)) = (
        body.product_name.filter(|v| !v.is_empty()),
        body.reason.filter(|v| !v.is_empty()),
        body.photo.filter(|v| !v.is_empty()),
        body.address.filter(|v| !v.is_empty()),
        body.phone.filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::BadRequest("All fields are required".to_owned()));
    };

    let new = NewWarrantyClaim {
        user_id: user.id,
        product_name,
        reason,
        address,
        phone,
        image_url: photo,
    };

    WarrantyRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

/// All warranty claims with claimant info (admin dashboard).
#[instrument(skip(state))]
pub async fn warranty_claims(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let claims = WarrantyRepository::new(state.pool()).all_with_user().await?;

    Ok(Json(json!(claims)))
}

/// Warranty status transition form data.
#[derive(Debug, Deserialize)]
pub struct WarrantyStatusRequest {
    pub status: Option<String>,
}

/// Update a warranty claim's status (admin).
#[instrument(skip(state, body))]
pub async fn update_warranty_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<WarrantyClaimId>,
    Json(body): Json<WarrantyStatusRequest>,
) -> Result<Json<JsonValue>> {
    let status: WarrantyStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_owned()))?;

    WarrantyRepository::new(state.pool())
        .set_status(id, status)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Claim not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Warranty claim status updated successfully",
    })))
}
