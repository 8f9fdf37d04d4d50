//! Auth route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Signup form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new customer and log them in.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_owned()));
    }

    let user = AuthService::new(state.pool())
        .register(body.name.trim(), &body.email, &body.password)
        .await?;

    establish_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    establish_session(&session, &user).await?;

    Ok(Json(user))
}

/// Clear the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

/// The authenticated user's full profile.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    Ok(Json(user))
}

/// Rotate the session and store the authenticated user in it.
async fn establish_session(session: &Session, user: &User) -> Result<()> {
    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let current = CurrentUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.to_string(),
        role: user.role,
    };

    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
