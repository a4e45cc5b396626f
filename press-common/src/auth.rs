//! Admin session authentication
//!
//! The admin console has a single account. A request is authenticated when
//! it carries the `admin-auth=authenticated` cookie and the configured
//! administrator exists in the database.
//!
//! This module holds no HTTP framework code; services wrap it in their own
//! middleware.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db::find_user_by_email;

/// Session cookie name
pub const AUTH_COOKIE: &str = "admin-auth";

/// Session cookie value marking a signed-in admin
pub const AUTH_COOKIE_VALUE: &str = "authenticated";

/// The authenticated administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Extract a cookie value from a `Cookie` header
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

/// Authenticate a request from its `Cookie` header
///
/// Returns `None` when the session cookie is missing or wrong, when the
/// admin account doesn't exist, or when the lookup fails (logged).
pub async fn authenticate(
    pool: &SqlitePool,
    cookie_header: Option<&str>,
    admin_email: &str,
) -> Option<AuthUser> {
    let session = cookie_header.and_then(|header| cookie_value(header, AUTH_COOKIE))?;
    if session != AUTH_COOKIE_VALUE {
        return None;
    }

    match find_user_by_email(pool, admin_email).await {
        Ok(Some(user)) => Some(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
        Ok(None) => None,
        Err(e) => {
            error!("Auth check error: {}", e);
            None
        }
    }
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
}
