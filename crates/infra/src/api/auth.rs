//! Token refresh over HTTP
//!
//! Exchanges the refresh token at `auth/token/refresh`. This call bypasses
//! the concurrency limiter: requests waiting on a slot may themselves be
//! waiting on this refresh.

use async_trait::async_trait;
use listsync_core::TokenRefresher;
use listsync_domain::constants::{API_VERSION, ENDPOINT_TOKEN_REFRESH, HEADER_API_VERSION};
use listsync_domain::{Credential, SyncError, SyncResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// [`TokenRefresher`] that talks to the hosted auth endpoint.
#[derive(Clone)]
pub struct HttpTokenRefresher {
    http: HttpClient,
    url: String,
    api_version: String,
}

impl HttpTokenRefresher {
    /// Refresher posting to [`ENDPOINT_TOKEN_REFRESH`] under `base_url`.
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), ENDPOINT_TOKEN_REFRESH);
        Self { http, url, api_version: API_VERSION.to_string() }
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Fully resolved refresh endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> SyncResult<Credential> {
        let builder = self
            .http
            .post(&self.url)
            .header(HEADER_API_VERSION, &self.api_version)
            .json(&RefreshRequest { refresh_token });

        let response = self.http.execute(builder).await?;
        if matches!(
            response.status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            warn!(status = %response.status, "refresh token rejected");
            return Err(SyncError::InvalidCredential(format!(
                "refresh token rejected with HTTP {}",
                response.status.as_u16()
            )));
        }

        let body: RefreshResponse = response.error_for_status()?.json()?;
        if body.access_token.is_empty() || body.refresh_token.is_empty() {
            return Err(SyncError::Codec("refresh response is missing a token".into()));
        }

        debug!(access_token_len = body.access_token.len(), "received refreshed credential");
        Ok(Credential::new(body.access_token, body.refresh_token))
    }
}
