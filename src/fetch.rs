//! JSON fetcher with session cache (C2).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::HttpClient;
use crate::error::{Error, Result};

/// A mutable `URL -> parsed JSON document` mapping, local to the lifetime
/// of one top-level resolver call (§3 "Session cache"). Readers and
/// writers may run concurrently; the map itself is never shared across
/// calls.
#[derive(Default)]
pub struct SessionCache {
    documents: RwLock<HashMap<String, Arc<Value>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        SessionCache::default()
    }

    async fn get(&self, url: &str) -> Option<Arc<Value>> {
        self.documents.read().await.get(url).cloned()
    }

    async fn insert(&self, url: String, doc: Arc<Value>) {
        self.documents.write().await.insert(url, doc);
    }
}

/// Fetch and parse the document at `url`, honouring the session cache.
///
/// - A cache hit returns without any network I/O.
/// - HTTP 404 is "absent": returns `Ok(None)` and is never cached.
/// - Any other non-2xx status is a `Transport` error.
/// - A 2xx response whose body is not valid JSON is a `BadDocument` error.
pub async fn fetch(
    client: &dyn HttpClient,
    url: &str,
    cache: &SessionCache,
) -> Result<Option<Arc<Value>>> {
    if let Some(doc) = cache.get(url).await {
        tracing::trace!(url, "session cache hit");
        return Ok(Some(doc));
    }

    tracing::trace!(url, "fetching document");
    let response = client.get(url).await?;

    if response.is_not_found() {
        tracing::debug!(url, "document absent (404)");
        return Ok(None);
    }
    if !response.is_success() {
        tracing::warn!(url, status = response.status, "non-2xx response");
        return Err(Error::transport(url, format!("HTTP {}", response.status)));
    }

    let doc: Value = serde_json::from_str(&response.body).map_err(|e| {
        tracing::warn!(url, error = %e, "response body is not valid JSON");
        Error::bad_document(url, format!("invalid JSON: {e}"))
    })?;

    let doc = Arc::new(doc);
    cache.insert(url.to_string(), doc.clone()).await;
    Ok(Some(doc))
}
