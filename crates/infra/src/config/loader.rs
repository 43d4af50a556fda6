//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read the file named by `LISTSYNC_CONFIG`, or the first file found
//! 2. Fall back to [`ClientConfig::default`] when no file exists
//! 3. Apply `LISTSYNC_*` environment overrides on top
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `LISTSYNC_CONFIG`: explicit config file path (must exist)
//! - `LISTSYNC_BASE_URL`: API base URL
//! - `LISTSYNC_REALTIME_URL`: push channel URL
//! - `LISTSYNC_REALTIME_ENABLED`: whether to open the push channel (true/false)
//! - `LISTSYNC_MAX_CONCURRENCY`: requests in flight across all queues
//! - `LISTSYNC_CLIENT_ID`: stable client identifier (UUID)
//! - `LISTSYNC_LOG_LEVEL`: default tracing filter
//! - `LISTSYNC_LOG_JSON`: emit JSON log lines (true/false)
//!
//! ## File Locations
//! Searched in order: `./listsync.toml`, `./listsync.json`, then the same two
//! names next to the executable. Format is chosen by extension.

use std::path::{Path, PathBuf};

use listsync_domain::{ClientConfig, SyncError, SyncResult};
use uuid::Uuid;

/// Explicit config file; skips the search path when set.
pub const ENV_CONFIG_PATH: &str = "LISTSYNC_CONFIG";
pub const ENV_BASE_URL: &str = "LISTSYNC_BASE_URL";
pub const ENV_REALTIME_URL: &str = "LISTSYNC_REALTIME_URL";
/// `1`, `true`, `yes` or `on` enable; anything else disables.
pub const ENV_REALTIME_ENABLED: &str = "LISTSYNC_REALTIME_ENABLED";
pub const ENV_MAX_CONCURRENCY: &str = "LISTSYNC_MAX_CONCURRENCY";
/// Must parse as a UUID.
pub const ENV_CLIENT_ID: &str = "LISTSYNC_CLIENT_ID";
pub const ENV_LOG_LEVEL: &str = "LISTSYNC_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "LISTSYNC_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 2] = ["listsync.toml", "listsync.json"];

/// Load, override and validate the client configuration.
///
/// # Errors
/// Returns `SyncError::Config` if an explicit file is missing, a file or
/// variable cannot be parsed, or the merged result fails validation.
pub fn load() -> SyncResult<ClientConfig> {
    let explicit = env_var(ENV_CONFIG_PATH).map(PathBuf::from);

    let mut config = match explicit.or_else(search_config_paths) {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::info!("No config file found; using defaults");
            ClientConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations.
///
/// # Errors
/// Returns `SyncError::Config` if the file is missing, unreadable or
/// malformed. Not validated; [`load`] validates after overrides.
pub fn load_from_file(path: Option<PathBuf>) -> SyncResult<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => search_config_paths().ok_or_else(|| {
            SyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overlay `LISTSYNC_*` variables onto `config`. Unset variables leave the
/// field alone.
///
/// # Errors
/// Returns `SyncError::Config` when a numeric or UUID variable does not
/// parse.
pub fn apply_env_overrides(config: &mut ClientConfig) -> SyncResult<()> {
    if let Some(base_url) = env_var(ENV_BASE_URL) {
        config.api.base_url = base_url;
    }
    if let Some(url) = env_var(ENV_REALTIME_URL) {
        config.realtime.url = url;
    }
    config.realtime.enabled = env_bool(ENV_REALTIME_ENABLED, config.realtime.enabled);
    if let Some(raw) = env_var(ENV_MAX_CONCURRENCY) {
        config.api.max_concurrency = raw.parse::<usize>().map_err(|e| {
            SyncError::Config(format!("Invalid {ENV_MAX_CONCURRENCY} '{raw}': {e}"))
        })?;
    }
    if let Some(raw) = env_var(ENV_CLIENT_ID) {
        let id = Uuid::parse_str(&raw)
            .map_err(|e| SyncError::Config(format!("Invalid {ENV_CLIENT_ID} '{raw}': {e}")))?;
        config.client_identifier = Some(id);
    }
    if let Some(level) = env_var(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);
    Ok(())
}

fn parse_config(contents: &str, path: &Path) -> SyncResult<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing `listsync.{toml,json}` in the working directory or next
/// to the executable.
pub fn search_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
