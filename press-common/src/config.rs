//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from (highest priority first):
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing or broken TOML file never prevents startup: a warning is
//! logged and the compiled defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PRESS_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "press.db";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional in the file; defaults fill the gaps.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Email of the single administrator account
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            bind_address: default_bind_address(),
            admin_email: default_admin_email(),
            max_upload_bytes: default_max_upload_bytes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    5780
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from `explicit` or the platform config file
    ///
    /// Never fails: a missing or unreadable file yields the defaults along
    /// with a [`ConfigSource`] describing what happened, so callers can log
    /// it once tracing is up.
    pub fn load(explicit: Option<&Path>) -> (Self, ConfigSource) {
        let path = match explicit.map(Path::to_path_buf).or_else(config_file_path) {
            Some(path) => path,
            None => return (Self::default(), ConfigSource::Defaults),
        };

        match Self::load_from(&path) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(e) => (
                Self::default(),
                ConfigSource::Invalid {
                    path,
                    reason: e.to_string(),
                },
            ),
        }
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No config file found
    Defaults,
    /// A file was found but could not be used; defaults apply
    Invalid { path: PathBuf, reason: String },
}

impl ConfigSource {
    /// Log the outcome of [`TomlConfig::load`]
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults => info!("No config file found, using defaults"),
            ConfigSource::Invalid { path, reason } => warn!(
                "Ignoring config file {}: {} (using defaults)",
                path.display(),
                reason
            ),
        }
    }
}

/// Resolve the root folder
///
/// Priority: CLI argument, then `PRESS_ROOT_FOLDER`, then TOML
/// `root_folder`, then the OS-dependent default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Create the root folder if it doesn't exist
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}

/// Locate the platform config file
///
/// Linux checks `~/.config/press/config.toml` then
/// `/etc/press/config.toml`; other platforms use the user config dir only.
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("press").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/press/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/press (or /var/lib/press for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("press"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/press"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("press"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/press"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("press"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\press"))
    } else {
        PathBuf::from("./press_data")
    }
}
