//! press-admin - Press CMS admin service
//!
//! Serves the content import endpoint, the admin session endpoints and a
//! health check over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use press_admin::startup::{init_tracing, open_database};
use press_admin::{build_router, AppState};
use press_common::config::{resolve_root_folder, TomlConfig};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for press-admin
#[derive(Parser, Debug)]
#[command(name = "press-admin")]
#[command(about = "Admin service for the Press CMS")]
#[command(version)]
struct Args {
    /// Root folder holding press.db (falls back to PRESS_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PRESS_PORT")]
    port: Option<u16>,

    /// Email of the administrator account
    #[arg(long, env = "PRESS_ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Config file (defaults to the platform config location)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = TomlConfig::load(args.config.as_deref());

    init_tracing(&config.logging.level);

    // Build identification first, before any database work
    info!(
        "Starting Press Admin (press-admin) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Root folder: {}", root_folder.display());

    let admin_email = args.admin_email.unwrap_or_else(|| config.admin_email.clone());
    let port = args.port.unwrap_or(config.port);

    let pool = match open_database(&root_folder, &admin_email).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool, admin_email, config.max_upload_bytes);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("press-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
