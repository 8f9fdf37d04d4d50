//! Analytics route handlers.

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::auth::RequireAdmin;
use crate::services::AnalyticsService;
use crate::state::AppState;

/// Dashboard numbers: headline counts plus the trailing week of daily sales.
#[instrument(skip(state))]
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<JsonValue>> {
    let service = AnalyticsService::new(state.pool());

    let summary = service.summary().await?;

    let end = Utc::now();
    let start = end - Duration::days(7);
    let daily_sales = service.daily_sales(start, end).await?;

    Ok(Json(json!({
        "analyticsData": summary,
        "dailySalesData": daily_sales,
    })))
}
