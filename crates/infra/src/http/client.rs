//! Single-shot HTTP executor
//!
//! Nothing here retries. Queued batches are retried by their queue on a
//! fixed delay and a 401 is handled by the API client, so the executor only
//! sends, reads the whole body and classifies transport failures.

use std::time::{Duration, Instant};

use listsync_domain::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use listsync_domain::{SyncError, SyncResult};
use reqwest::{Client as ReqwestClient, IntoUrl, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::conversions::status_error;
use crate::errors::InfraError;

/// Status and fully buffered body of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status line as received, never mapped to an error here.
    pub status: StatusCode,
    /// Entire body, read before the connection is released.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode a JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> SyncResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| SyncError::from(InfraError::from(e)))
    }

    /// Pass success through, otherwise map the status onto [`SyncError`].
    pub fn error_for_status(self) -> SyncResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(status_error(self.status, &self.text()))
        }
    }
}

/// reqwest client with the request timeout and user agent applied.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start from the default timeout.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with the default timeout and no user agent.
    pub fn new() -> SyncResult<Self> {
        Self::builder().build()
    }

    /// Whole-exchange timeout applied to every request.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST request builder bound to this client. Pass it to [`execute`](Self::execute).
    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.client.request(Method::POST, url)
    }

    /// Send once and buffer the body.
    ///
    /// A non-success status is not an error here; callers decide what a
    /// 401 or 5xx means for them. Connect failures, timeouts and body read
    /// failures come back as [`SyncError`].
    pub async fn execute(&self, builder: RequestBuilder) -> SyncResult<HttpResponse> {
        let request = builder.build().map_err(|e| SyncError::from(InfraError::from(e)))?;
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = self.client.execute(request).await.map_err(|e| {
            debug!(%path, error = %e, "HTTP request failed");
            SyncError::from(InfraError::from(e))
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| SyncError::from(InfraError::from(e)))?;

        debug!(
            %path,
            %status,
            bytes = body.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "HTTP exchange complete"
        );
        Ok(HttpResponse { status, body: body.to_vec() })
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS), user_agent: None }
    }
}

impl HttpClientBuilder {
    /// Whole-exchange timeout, connect included.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    ///
    /// Returns `SyncError::Config` for a zero timeout, or the mapped reqwest
    /// error if the TLS backend cannot be initialised.
    pub fn build(self) -> SyncResult<HttpClient> {
        if self.timeout.is_zero() {
            return Err(SyncError::Config("http timeout must be greater than 0".into()));
        }

        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|e| SyncError::from(InfraError::from(e)))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}
