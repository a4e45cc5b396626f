//! press-import - import an XML feed from the command line
//!
//! Runs the same pipeline as `POST /api/admin/import` against the
//! configured database, as the administrator account, and prints the
//! import report as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use press_admin::db::SqliteContentStore;
use press_admin::import::{run_import, ImportTarget};
use press_admin::startup::{init_tracing, open_database};
use press_common::config::{resolve_root_folder, TomlConfig};
use press_common::db::find_user_by_email;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "press-import")]
#[command(about = "Import a WordPress export or generic XML feed into Press")]
#[command(version)]
struct Args {
    /// XML file to import
    file: PathBuf,

    /// Destination collection
    #[arg(short, long, default_value = "auto", value_parser = ["auto", "posts", "pages"])]
    target: String,

    /// Root folder holding press.db (falls back to PRESS_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

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
    info!(
        "press-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log();

    let xml = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let admin_email = args.admin_email.unwrap_or_else(|| config.admin_email.clone());
    let pool = open_database(&root_folder, &admin_email)
        .await
        .context("Failed to open database")?;

    let Some(admin) = find_user_by_email(&pool, &admin_email).await? else {
        bail!("Administrator account {} not found", admin_email);
    };

    let target = ImportTarget::parse(Some(&args.target));
    let store = SqliteContentStore::new(pool);
    let report = run_import(&xml, target, &store, &admin.id)
        .await
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
