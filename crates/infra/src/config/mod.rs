//! Configuration loading
//!
//! Reads [`ClientConfig`](listsync_domain::ClientConfig) from a TOML or
//! JSON file and `LISTSYNC_*` environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_file, search_config_paths};
