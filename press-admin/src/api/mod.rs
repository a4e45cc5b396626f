//! HTTP API handlers for press-admin

pub mod auth;
pub mod health;
pub mod import;

pub use auth::{auth_routes, require_admin};
pub use health::health_routes;
pub use import::import_routes;
