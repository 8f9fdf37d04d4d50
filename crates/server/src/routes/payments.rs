//! Payment route handlers.
//!
//! Thin wrappers over [`CheckoutService`]; all workflow logic lives there.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::User;
use crate::services::AuthService;
use crate::services::checkout::{
    CheckoutLine, CheckoutService, OrderConfirmation, RazorpayOrderResponse, StripeSessionResponse,
};
use crate::state::AppState;

fn checkout<'a>(state: &'a AppState) -> CheckoutService<'a> {
    CheckoutService::new(
        state.pool(),
        state.stripe(),
        state.razorpay(),
        state.notifications(),
        &state.config().client_url,
    )
}

/// Stripe checkout form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub products: Vec<CheckoutLine>,
    pub coupon_code: Option<String>,
}

/// Create a Stripe checkout session from the client cart snapshot.
#[instrument(skip(state, body))]
pub async fn create_checkout_session(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<StripeSessionResponse>> {
    let response = checkout(&state)
        .create_stripe_session(user.id, &body.products, body.coupon_code.as_deref())
        .await?;

    Ok(Json(response))
}

/// Stripe confirmation form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSuccessRequest {
    pub session_id: String,
}

/// Confirm a paid Stripe session and create the order.
#[instrument(skip(state, body))]
pub async fn checkout_success(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckoutSuccessRequest>,
) -> Result<Json<OrderConfirmation>> {
    let confirmation = checkout(&state)
        .confirm_stripe_session(&body.session_id)
        .await?;

    Ok(Json(confirmation))
}

/// Razorpay checkout form data.
#[derive(Debug, Deserialize)]
pub struct CreateRazorpayOrderRequest {
    #[serde(default)]
    pub products: Vec<CheckoutLine>,
}

/// Create a Razorpay order from the cart snapshot.
#[instrument(skip(state, body))]
pub async fn create_checkout_session_razorpay(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateRazorpayOrderRequest>,
) -> Result<Json<RazorpayOrderResponse>> {
    let user = full_user(&state, &current).await?;

    let response = checkout(&state)
        .create_razorpay_order(&user, &body.products)
        .await?;

    Ok(Json(response))
}

/// Razorpay confirmation form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpaySuccessRequest {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

/// Confirm an HMAC-signed Razorpay payment callback and create the order.
#[instrument(skip(state, body))]
pub async fn razorpay_success(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RazorpaySuccessRequest>,
) -> Result<Json<OrderConfirmation>> {
    let user = full_user(&state, &current).await?;

    let confirmation = checkout(&state)
        .confirm_razorpay_payment(&user, &body.order_id, &body.payment_id, &body.signature)
        .await?;

    Ok(Json(confirmation))
}

/// Cash-on-delivery form data.
#[derive(Debug, Deserialize)]
pub struct PlaceCodOrderRequest {
    #[serde(default)]
    pub products: Vec<CheckoutLine>,
}

/// Place a cash-on-delivery order.
#[instrument(skip(state, body))]
pub async fn place_order_cod(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<PlaceCodOrderRequest>,
) -> Result<Json<OrderConfirmation>> {
    let user = full_user(&state, &current).await?;

    let confirmation = checkout(&state).place_cod_order(&user, &body.products).await?;

    Ok(Json(confirmation))
}

/// Re-read the full user row (address and all) for checkout paths.
async fn full_user(state: &AppState, current: &crate::models::CurrentUser) -> Result<User> {
    AuthService::new(state.pool())
        .get_user(current.id)
        .await
        .map_err(AppError::from)
}
