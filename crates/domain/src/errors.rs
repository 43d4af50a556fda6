//! Error types used throughout the sync layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for listsync.
///
/// `Clone` so a single refresh outcome can be handed to every caller that
/// was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    /// Network failure or timeout; retried at the queue's fixed delay.
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// The access token was rejected; a refresh should fix it.
    #[error("Access token expired: {0}")]
    AuthExpired(String),

    /// Refresh failed. Only a new login recovers from this.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Push channel dropped; recovered by reconnecting.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The server refused an operation or it went unacknowledged.
    #[error("Operation rejected: {0}")]
    OperationRejected(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),
}

/// Coarse grouping used for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Auth,
    Server,
    Client,
    Internal,
}

impl SyncError {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TransientNetwork(_) | Self::ConnectionLost(_) => ErrorCategory::Network,
            Self::AuthExpired(_) | Self::InvalidCredential(_) => ErrorCategory::Auth,
            Self::Server { .. } => ErrorCategory::Server,
            Self::OperationRejected(_) | Self::Codec(_) => ErrorCategory::Client,
            Self::Config(_) | Self::Cancelled(_) => ErrorCategory::Internal,
        }
    }

    /// Whether trying again later can succeed without user involvement.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientNetwork(_)
                | Self::AuthExpired(_)
                | Self::ConnectionLost(_)
                | Self::OperationRejected(_)
                | Self::Server { .. }
        )
    }

    /// Whether the session is unusable until the user signs in again.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidCredential(_))
    }
}

/// Result type alias for listsync operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;
