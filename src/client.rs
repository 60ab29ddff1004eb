//! The transport seam between the JSON fetcher (C2) and the network.
//!
//! Isolating the raw GET behind a trait lets tests exercise the fetcher
//! and resolver against an in-process counting transport without a socket,
//! while production code and the `mockito`-backed integration tests both go
//! through the real `reqwest` adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A trait object safe to move into a spawned task, as every required page
/// fetch in C5's fan-out does.
pub type SharedHttpClient = Arc<dyn HttpClient + Send + Sync>;

/// The minimal shape C2 needs out of an HTTP response: status code and raw
/// body. Headers and streaming are deliberately not modeled — the
/// repository protocol this crate speaks is GET-only, JSON-only.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        ReqwestClient {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let response = self
            .inner
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(url, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(url, e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}
