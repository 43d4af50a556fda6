//! Shared fixtures for infra integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use listsync_common::resilience::ConcurrencyLimiter;
use listsync_core::{TokenAuthority, TokenRefresher};
use listsync_domain::{Credential, SyncError, SyncResult};
use listsync_infra::{ApiClient, HttpClient};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{Request, Respond, ResponseTemplate};

/// Refresher returning `fresh-access-N` on the N-th call.
#[derive(Default)]
pub struct CountingRefresher {
    pub calls: AtomicUsize,
}

impl CountingRefresher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, _refresh_token: &str) -> SyncResult<Credential> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Credential::new(format!("fresh-access-{n}"), format!("fresh-refresh-{n}")))
    }
}

/// Refresher whose refresh token the server has revoked.
#[derive(Default)]
pub struct RevokedRefresher {
    pub calls: AtomicUsize,
}

impl RevokedRefresher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for RevokedRefresher {
    async fn refresh(&self, _refresh_token: &str) -> SyncResult<Credential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SyncError::InvalidCredential("refresh token revoked".into()))
    }
}

pub fn authority(access_token: &str, refresher: Arc<dyn TokenRefresher>) -> Arc<TokenAuthority> {
    Arc::new(TokenAuthority::new(Credential::new(access_token, "refresh"), Uuid::nil(), refresher))
}

pub fn api_client(base_url: &str, authority: Arc<TokenAuthority>) -> Arc<ApiClient> {
    let limiter = ConcurrencyLimiter::new("api", 5).expect("valid concurrency");
    let http = HttpClient::new().expect("http client");
    Arc::new(ApiClient::new(http, base_url, authority, limiter))
}

/// Operation ids in a JSON batch body, in order.
pub fn batch_ids(body: &[u8]) -> Vec<String> {
    let value: Value = serde_json::from_slice(body).expect("batch body is JSON");
    value["operations"]
        .as_array()
        .expect("operations array")
        .iter()
        .map(|op| op["metadata"]["operation_id"].as_str().expect("operation id").to_string())
        .collect()
}

/// Acknowledges the first `limit` operations of every batch it receives.
pub struct AckFirst {
    pub limit: usize,
}

impl Respond for AckFirst {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ids: Vec<String> = batch_ids(&request.body).into_iter().take(self.limit).collect();
        ResponseTemplate::new(200).set_body_json(json!({ "processed_operations": ids }))
    }
}

/// Acknowledges every operation in the batch.
pub struct AckAll;

impl Respond for AckAll {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        AckFirst { limit: usize::MAX }.respond(request)
    }
}
