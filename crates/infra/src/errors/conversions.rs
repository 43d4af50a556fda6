//! Conversions from external infrastructure errors into domain errors.

use listsync_common::resilience::LimiterError;
use listsync_domain::SyncError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;
use serde_json::Error as JsonError;
use tokio_tungstenite::tungstenite::Error as WsError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyncError);

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncError> for InfraError {
    fn from(value: SyncError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSyncError {
    fn into_sync(self) -> SyncError;
}

/// Map a non-success HTTP status onto the sync taxonomy.
///
/// 401 is the only status that triggers a token refresh; 429 is treated as
/// transient so queued work simply retries.
pub fn status_error(status: StatusCode, body: &str) -> SyncError {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let message = if body.is_empty() {
        format!("HTTP {code} {reason}")
    } else {
        format!("HTTP {code} {reason}: {body}")
    };

    match code {
        401 => SyncError::AuthExpired(message),
        429 => SyncError::TransientNetwork(message),
        400..=499 => SyncError::OperationRejected(message),
        _ => SyncError::Server { status: code, message },
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for HttpError {
    fn into_sync(self) -> SyncError {
        if self.is_timeout() {
            return SyncError::TransientNetwork("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return SyncError::TransientNetwork("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status, "");
        }

        if self.is_decode() {
            return SyncError::Codec(format!("failed to read response body: {self}"));
        }

        SyncError::TransientNetwork(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for JsonError {
    fn into_sync(self) -> SyncError {
        SyncError::Codec(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* tungstenite::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for WsError {
    fn into_sync(self) -> SyncError {
        match self {
            WsError::Http(response) => {
                let status = response.status().as_u16();
                if status == 401 {
                    SyncError::AuthExpired("push channel handshake rejected the access token".into())
                } else {
                    SyncError::ConnectionLost(format!("push channel handshake failed: HTTP {status}"))
                }
            }
            WsError::Url(err) => SyncError::Config(format!("invalid push channel URL: {err}")),
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                SyncError::ConnectionLost("push channel closed".into())
            }
            other => SyncError::ConnectionLost(other.to_string()),
        }
    }
}

impl From<WsError> for InfraError {
    fn from(value: WsError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* LimiterError → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for LimiterError {
    fn into_sync(self) -> SyncError {
        match self {
            LimiterError::Closed { name } => {
                SyncError::Cancelled(format!("request limiter '{name}' is shut down"))
            }
            LimiterError::InvalidConcurrency => {
                SyncError::Config("max_concurrency must be greater than 0".into())
            }
        }
    }
}

impl From<LimiterError> for InfraError {
    fn from(value: LimiterError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn status_mapping_follows_the_taxonomy() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), SyncError::AuthExpired(_)));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            SyncError::TransientNetwork(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad batch"),
            SyncError::OperationRejected(msg) if msg.contains("bad batch")
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            SyncError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn json_errors_become_codec_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mapped: SyncError = InfraError::from(err).into();
        assert!(matches!(mapped, SyncError::Codec(msg) if msg.contains("line 1")));
    }

    #[test]
    fn closed_limiter_means_cancelled() {
        let mapped: SyncError = InfraError::from(LimiterError::Closed { name: "api".into() }).into();
        assert!(matches!(mapped, SyncError::Cancelled(msg) if msg.contains("api")));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: SyncError = InfraError::from(error).into();
        assert!(matches!(mapped, SyncError::AuthExpired(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: SyncError = InfraError::from(error).into();
        assert!(mapped.is_retryable());
    }
}
