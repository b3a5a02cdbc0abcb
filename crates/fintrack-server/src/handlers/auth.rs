//! Authentication-related handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, CurrentUser, SuccessResponse};
use fintrack_core::models::User;
use fintrack_core::Registration;

/// Body of a successful register or login
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    /// Session token, also set as the session cookie
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issue a session for `user` and set the cookie
fn start_session(state: &AppState, user: User) -> Result<Response, AppError> {
    let token = state.sessions.issue(&user)?;
    let cookie = state.sessions.cookie(&token);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse { user, token }),
    )
        .into_response())
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/auth/register - Create an account and log in
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Registration>,
) -> Result<Response, AppError> {
    let user = state.db.register_user(&form)?;

    state
        .db
        .log_audit(Some(user.id), "register", Some("user"), Some(user.id), None)?;

    start_session(&state, user)
}

/// POST /api/auth/login - Exchange credentials for a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state.db.authenticate(form.username.trim(), &form.password)?;

    info!(user_id = user.id, "User logged in");
    state
        .db
        .log_audit(Some(user.id), "login", Some("user"), Some(user.id), None)?;

    start_session(&state, user)
}

/// POST /api/auth/logout - Clear the session cookie
///
/// Tokens are stateless, so a copied bearer token stays valid until expiry.
pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(SuccessResponse { success: true }),
    )
        .into_response()
}

/// GET /api/me - The logged-in user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .db
        .get_user(current.id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}
