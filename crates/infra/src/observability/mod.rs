//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; the host decides whether to
//! install a subscriber. [`init_tracing`] is the default one: `RUST_LOG`
//! wins when set, otherwise the configured level applies.

use listsync_domain::{LoggingConfig, SyncError, SyncResult};
use tracing_subscriber::EnvFilter;

/// Build the filter for `config`, preferring `RUST_LOG` when it is set.
///
/// # Errors
/// Returns `SyncError::Config` when the configured level is not a valid
/// filter directive.
pub fn env_filter(config: &LoggingConfig) -> SyncResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| SyncError::Config(format!("invalid log level '{}': {e}", config.level)))
}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling
/// this more than once is harmless.
///
/// # Errors
/// Returns `SyncError::Config` for an invalid level directive.
pub fn init_tracing(config: &LoggingConfig) -> SyncResult<bool> {
    let filter = env_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
    };

    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported_not_fatal() {
        let config = LoggingConfig { level: "debug".into(), json: true };

        // Another test may already have installed one.
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }

    #[test]
    fn invalid_level_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "listsync=verbose".into(), json: false };
        assert!(matches!(env_filter(&config), Err(SyncError::Config(_))));
    }
}
