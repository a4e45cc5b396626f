//! Shared bootstrap for the press-admin binaries

use std::path::Path;

use press_common::config::{database_path, ensure_root_folder};
use press_common::db::init_database;
use sqlx::SqlitePool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins; otherwise `default_level` (from configuration) applies
/// to everything.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the root folder and open `press.db` inside it
pub async fn open_database(root_folder: &Path, admin_email: &str) -> press_common::Result<SqlitePool> {
    ensure_root_folder(root_folder)?;

    let db_path = database_path(root_folder);
    info!("Database path: {}", db_path.display());

    init_database(&db_path, admin_email).await
}
