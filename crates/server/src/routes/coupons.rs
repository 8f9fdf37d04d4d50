//! Coupon route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::auth::RequireAuth;
use crate::services::CouponService;
use crate::state::AppState;

/// The user's current active coupon, or JSON null.
#[instrument(skip(state))]
pub async fn current(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let coupon = CouponService::new(state.pool())
        .current_for_user(user.id)
        .await?;

    Ok(Json(coupon.map_or(JsonValue::Null, |c| json!(c))))
}

/// Coupon validation form data.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
}

/// Validate a coupon code for the current user.
///
/// An expired coupon is deactivated as a side effect of the first failed
/// validation; the same code then reports "Coupon not found".
#[instrument(skip(state, body))]
pub async fn validate(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ValidateCouponRequest>,
) -> Result<Json<JsonValue>> {
    let coupon = CouponService::new(state.pool())
        .validate(&body.code, user.id)
        .await?;

    Ok(Json(json!({
        "message": "Coupon is valid",
        "code": coupon.code,
        "discountPercentage": coupon.discount_percentage,
    })))
}
