//! press-admin library - admin service for the Press CMS
//!
//! Hosts the content import pipeline, its SQLite persistence and the HTTP
//! surface (import endpoint, session endpoints, health).

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod import;
pub mod startup;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Email of the administrator account sessions resolve to
    pub admin_email: String,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
    /// Service start time (for uptime in /health)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, admin_email: impl Into<String>, max_upload_bytes: usize) -> Self {
        Self {
            db,
            admin_email: admin_email.into(),
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Everything under `/api/admin` requires an admin session; health and the
/// session endpoints are public.
pub fn build_router(state: AppState) -> Router {
    let protected = api::import_routes(state.max_upload_bytes).route_layer(
        middleware::from_fn_with_state(state.clone(), api::require_admin),
    );

    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::auth_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
