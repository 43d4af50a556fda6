//! Credential and request header types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    HEADER_API_VERSION, HEADER_AUTHORIZATION, HEADER_CLIENT_IDENTIFIER,
};

/// Access/refresh token pair.
///
/// Always replaced as a whole; nothing mutates one half on its own.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &format_args!("<{} bytes>", self.access_token.len()))
            .field("refresh_token", &format_args!("<{} bytes>", self.refresh_token.len()))
            .finish()
    }
}

/// Header set derived from the current credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    /// Access token without the `Bearer ` prefix.
    pub bearer_token: String,
    pub api_version: String,
    pub client_identifier: Uuid,
}

impl AuthHeaders {
    /// Header name/value pairs in the order they are sent.
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            (HEADER_AUTHORIZATION, format!("Bearer {}", self.bearer_token)),
            (HEADER_API_VERSION, self.api_version.clone()),
            (HEADER_CLIENT_IDENTIFIER, self.client_identifier.to_string()),
        ]
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("bearer_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("client_identifier", &self.client_identifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_tokens() {
        let credential = Credential::new("secret-access", "secret-refresh");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("13 bytes"));
    }

    #[test]
    fn header_pairs_carry_bearer_version_and_client() {
        let client = Uuid::nil();
        let headers = AuthHeaders {
            bearer_token: "abc".into(),
            api_version: "3".into(),
            client_identifier: client,
        };

        let pairs = headers.pairs();
        assert_eq!(pairs[0], ("Authorization", "Bearer abc".to_string()));
        assert_eq!(pairs[1], ("X-API-Version", "3".to_string()));
        assert_eq!(pairs[2], ("X-Client-Identifier", client.to_string()));
    }
}
