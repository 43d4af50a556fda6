//! Authorized HTTP transport for the hosted API
//!
//! Every request passes through the shared [`ConcurrencyLimiter`] and
//! carries the current credential headers. When the server answers 401 the
//! token is refreshed; a standard request is then sent once more, a
//! single-attempt request is not.

use std::sync::Arc;

use async_trait::async_trait;
use listsync_common::resilience::ConcurrencyLimiter;
use listsync_core::{ApiRequest, ApiTransport, DeliveryPolicy, TokenAuthority};
use listsync_domain::constants::HEADER_CONTENT_TYPE;
use listsync_domain::{SyncError, SyncResult};
use tracing::{debug, info, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// [`ApiTransport`] backed by reqwest.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    authority: Arc<TokenAuthority>,
    limiter: ConcurrencyLimiter,
}

impl ApiClient {
    /// `base_url` may carry a trailing slash; endpoints are joined onto it.
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        authority: Arc<TokenAuthority>,
        limiter: ConcurrencyLimiter,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, authority, limiter }
    }

    /// Base URL without its trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Limiter shared with every other client of the session.
    pub const fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// One limited, authorized attempt with the headers current at send
    /// time.
    async fn send_limited(&self, request: &ApiRequest) -> SyncResult<Vec<u8>> {
        self.limiter
            .execute(|| self.send_authorized(request))
            .await
            .map_err(|e| SyncError::from(InfraError::from(e)))?
    }

    async fn send_authorized(&self, request: &ApiRequest) -> SyncResult<Vec<u8>> {
        let url = self.endpoint_url(request.endpoint);
        let mut builder = self
            .http
            .post(&url)
            .header(HEADER_CONTENT_TYPE, request.content_type)
            .body(request.body.clone());
        for (name, value) in self.authority.authorized_headers().pairs() {
            builder = builder.header(name, value);
        }

        let response = self.http.execute(builder).await?;
        if !response.is_success() {
            debug!(status = %response.status, endpoint = request.endpoint, "request rejected");
        }
        Ok(response.error_for_status()?.body)
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    #[instrument(skip(self, request), fields(endpoint = request.endpoint, bytes = request.body.len()))]
    async fn post(&self, request: ApiRequest) -> SyncResult<Vec<u8>> {
        let rejection = match self.send_limited(&request).await {
            Err(SyncError::AuthExpired(reason)) => reason,
            other => return other,
        };

        // The refresh call itself stays outside the limiter.
        match request.delivery {
            DeliveryPolicy::Standard => {
                info!(%rejection, "access token rejected; refreshing and retrying once");
                self.authority.refresh().await?;
                let retried = self.send_limited(&request).await;
                if let Err(error) = &retried {
                    warn!(error = %error, "request failed after token refresh");
                }
                retried
            }
            DeliveryPolicy::SingleAttempt => {
                // A resend could apply twice; the body has no operation id.
                info!(%rejection, "access token rejected on a single-attempt request");
                self.authority.refresh().await?;
                Err(SyncError::AuthExpired(rejection))
            }
        }
    }
}
