//! Single-flight token authority
//!
//! Holds the current [`Credential`] and serialises refreshes:
//! - the first caller of [`TokenAuthority::refresh`] becomes the leader and
//!   issues the network call
//! - callers arriving while it is in flight park on a oneshot and receive a
//!   clone of the leader's outcome
//! - the in-flight slot is released on every exit path, including failure
//!   and cancellation of the leader
//!
//! Once the server rejects the refresh token itself, later refreshes fail
//! fast with the same error until [`TokenAuthority::replace_credential`]
//! installs a new pair.

use std::fmt;
use std::sync::Arc;

use listsync_domain::constants::API_VERSION;
use listsync_domain::{AuthHeaders, Credential, SyncError, SyncResult};
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ports::{SessionObserver, TokenRefresher};

type Waiter = oneshot::Sender<SyncResult<Credential>>;

/// Owner of the credential pair shared by every queue and the push channel.
pub struct TokenAuthority {
    credential: RwLock<Credential>,
    client_identifier: Uuid,
    api_version: String,
    refresher: Arc<dyn TokenRefresher>,
    observer: Option<Arc<dyn SessionObserver>>,
    /// `Some` while a refresh is in flight; holds the parked callers.
    in_flight: Mutex<Option<Vec<Waiter>>>,
    /// Rejection of the current refresh token, if the server issued one.
    revoked: Mutex<Option<SyncError>>,
}

impl TokenAuthority {
    /// Authority holding `credential`; nothing is refreshed until a caller
    /// asks for it.
    pub fn new(
        credential: Credential,
        client_identifier: Uuid,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self {
            credential: RwLock::new(credential),
            client_identifier,
            api_version: API_VERSION.to_string(),
            refresher,
            observer: None,
            in_flight: Mutex::new(None),
            revoked: Mutex::new(None),
        }
    }

    /// Attach the collaborator that persists tokens and handles forced
    /// re-login.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Value sent in the API version header. Defaults to
    /// [`API_VERSION`].
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Headers for the latest committed credential.
    pub fn authorized_headers(&self) -> AuthHeaders {
        AuthHeaders {
            bearer_token: self.credential.read().access_token.clone(),
            api_version: self.api_version.clone(),
            client_identifier: self.client_identifier,
        }
    }

    /// Current access token, as embedded in the push channel URI.
    pub fn access_token(&self) -> String {
        self.credential.read().access_token.clone()
    }

    /// Copy of the committed credential pair.
    pub fn credential(&self) -> Credential {
        self.credential.read().clone()
    }

    /// Identifier sent in every request's client-identifier header.
    pub const fn client_identifier(&self) -> Uuid {
        self.client_identifier
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Swap in a credential obtained outside the refresh flow (e.g. a new
    /// login).
    pub fn replace_credential(&self, credential: Credential) {
        *self.credential.write() = credential;
        if self.revoked.lock().take().is_some() {
            info!("credential replaced; refreshes re-enabled");
        }
    }

    /// Whether the server has rejected the current refresh token.
    pub fn is_revoked(&self) -> bool {
        self.revoked.lock().is_some()
    }

    /// Refresh the credential pair, joining an in-flight refresh if any.
    ///
    /// Every caller that overlaps one refresh observes that refresh's
    /// outcome. On failure the observer is told the credential is invalid.
    /// After the refresh token has been rejected this returns the rejection
    /// without another network call or observer notification.
    pub async fn refresh(&self) -> SyncResult<Credential> {
        if let Some(rejection) = self.revoked.lock().clone() {
            debug!("refresh token already rejected; not retrying");
            return Err(rejection);
        }

        let waiter = {
            let mut in_flight = self.in_flight.lock();
            if let Some(waiters) = in_flight.as_mut() {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Some(rx)
            } else {
                *in_flight = Some(Vec::new());
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("joining in-flight token refresh");
            return rx.await.unwrap_or_else(|_| {
                Err(SyncError::Cancelled("token refresh was abandoned".into()))
            });
        }

        let slot = InFlightSlot { authority: self, resolved: false };
        let outcome = self.run_refresh().await;
        slot.resolve(&outcome);
        outcome
    }

    async fn run_refresh(&self) -> SyncResult<Credential> {
        let refresh_token = self.credential.read().refresh_token.clone();
        debug!(refresh_token_len = refresh_token.len(), "refreshing access token");

        match self.refresher.refresh(&refresh_token).await {
            Ok(credential) => {
                // Both halves land in one write.
                *self.credential.write() = credential.clone();
                info!("access token refreshed");
                if let Some(observer) = &self.observer {
                    observer.on_tokens_refreshed(&credential);
                }
                Ok(credential)
            }
            Err(err) => {
                error!(error = %err, "token refresh failed; credential is no longer usable");
                if matches!(err, SyncError::InvalidCredential(_)) {
                    *self.revoked.lock() = Some(err.clone());
                }
                if let Some(observer) = &self.observer {
                    observer.on_invalid_credential(&err);
                }
                Err(err)
            }
        }
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("client_identifier", &self.client_identifier)
            .field("api_version", &self.api_version)
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

/// Releases the in-flight slot when the leader finishes or is dropped.
struct InFlightSlot<'a> {
    authority: &'a TokenAuthority,
    resolved: bool,
}

impl InFlightSlot<'_> {
    fn resolve(mut self, outcome: &SyncResult<Credential>) {
        self.resolved = true;
        let waiters = self.authority.in_flight.lock().take().unwrap_or_default();
        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), "fanning out refresh outcome");
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        // Leader was cancelled; dropping the senders fails every waiter.
        if let Some(waiters) = self.authority.in_flight.lock().take() {
            warn!(waiters = waiters.len(), "token refresh abandoned before completion");
        }
    }
}
