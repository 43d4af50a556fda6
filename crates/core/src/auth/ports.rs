//! Port interfaces for the credential lifecycle

use async_trait::async_trait;
use listsync_domain::{Credential, SyncError, SyncResult};

/// Exchanges a refresh token for a new credential pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Issue exactly one refresh call.
    async fn refresh(&self, refresh_token: &str) -> SyncResult<Credential>;
}

/// Receives session lifecycle events; owned by whoever persists tokens and
/// drives the login flow.
pub trait SessionObserver: Send + Sync {
    /// A refresh succeeded and the new pair is now in use.
    fn on_tokens_refreshed(&self, credential: &Credential);

    /// A refresh failed. The session cannot recover without a new login.
    fn on_invalid_credential(&self, error: &SyncError);
}
