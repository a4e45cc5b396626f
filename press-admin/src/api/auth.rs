//! Admin session middleware and session endpoints
//!
//! Protected routes pass through [`require_admin`], which rejects requests
//! without a valid admin session before the body is read and hands the
//! signed-in user to handlers as a request extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use press_common::auth::{authenticate, clear_session_cookie, AuthUser};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn cookie_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn session_user(state: &AppState, cookie: Option<String>) -> Option<AuthUser> {
    authenticate(&state.db, cookie.as_deref(), &state.admin_email).await
}

/// Authentication middleware
///
/// Returns 401 `{ "error": "Unauthorized" }` when there is no admin session.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Copy the header out: the request body is not Sync
    let cookie = cookie_header(request.headers());
    let user = session_user(&state, cookie)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// GET /api/auth/check
///
/// The signed-in admin, or 401 when not authenticated.
pub async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthUser>> {
    session_user(&state, cookie_header(&headers))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

/// POST /api/auth/signout
///
/// Expires the session cookie.
pub async fn sign_out() -> ApiResult<Response> {
    let cookie = HeaderValue::from_str(&clear_session_cookie())
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {}", e)))?;

    let mut response = Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
    .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);

    Ok(response)
}

/// Build session routes (no authentication required)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/check", get(check_session))
        .route("/api/auth/signout", post(sign_out))
}
