//! Order route handlers: history, returns, and admin status transitions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use voltmart_core::{OrderId, OrderStatus, ReturnStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::state::AppState;

/// The current user's order history, newest first.
#[instrument(skip(state))]
pub async fn history(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let orders = OrderRepository::new(state.pool())
        .history_for_user(user.id)
        .await?;

    if orders.is_empty() {
        return Err(AppError::NotFound(
            "No orders found for this user".to_owned(),
        ));
    }

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Return request form data. The form payload and the selected order arrive
/// together, mirroring the frontend's modal submit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequestBody {
    pub form: ReturnRequestForm,
    pub selected_order: OrderId,
}

/// The reason/description part of a return request.
#[derive(Debug, Deserialize)]
pub struct ReturnRequestForm {
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request a return for one of the current user's orders.
#[instrument(skip(state, body))]
pub async fn request_return(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ReturnRequestBody>,
) -> Result<Json<JsonValue>> {
    let orders = OrderRepository::new(state.pool());

    let order = orders
        .get(body.selected_order)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if order.user_id != user.id {
        return Err(AppError::Forbidden(
            "You are not authorized to return this order".to_owned(),
        ));
    }

    orders
        .request_return(
            order.id,
            &body.form.reason,
            body.form.description.as_deref().unwrap_or(""),
            Utc::now(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Return request submitted successfully",
    })))
}

/// All return-requested orders (admin).
#[instrument(skip(state))]
pub async fn return_history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let orders = OrderRepository::new(state.pool()).returns_requested().await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Pagination query parameters for the admin order list.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// One page of all orders with the page count (admin).
#[instrument(skip(state))]
pub async fn all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<JsonValue>> {
    let limit = params.limit.unwrap_or(10).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let offset = (page - 1) * limit;

    let (orders, total) = OrderRepository::new(state.pool())
        .paginated(limit, offset)
        .await?;

    let total_pages = (total as u64).div_ceil(limit as u64) as i64;

    Ok(Json(json!({ "orders": orders, "totalPages": total_pages })))
}

/// Status transition form data (both return and order status routes).
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: Option<String>,
}

/// Update an order's return status (admin).
#[instrument(skip(state, body))]
pub async fn change_return_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<JsonValue>> {
    let status: ReturnStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            AppError::BadRequest("Please provide a valid order ID and status".to_owned())
        })?;

    OrderRepository::new(state.pool())
        .set_return_status(id, status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "msg": "Return request status updated successfully",
    })))
}

/// Update an order's fulfillment status (admin).
#[instrument(skip(state, body))]
pub async fn change_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<JsonValue>> {
    let status: OrderStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            AppError::BadRequest("Please provide a valid order ID and status".to_owned())
        })?;

    OrderRepository::new(state.pool()).set_status(id, status).await?;

    Ok(Json(json!({
        "success": true,
        "msg": "Order status updated successfully",
    })))
}
