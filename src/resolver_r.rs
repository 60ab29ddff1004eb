//! Protocol-R resolver (C5): orchestrates C2-C4 for the paged registration
//! index protocol.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;

use crate::cancel::CancellationToken;
use crate::catalog::decode_entry;
use crate::client::SharedHttpClient;
use crate::error::{Error, Result};
use crate::fetch::{fetch, SessionCache};
use crate::model::{DependencyInfo, PackageIdentity};
use crate::registration::{CatalogEntryDoc, PageDoc, RegistrationIndexDoc, SelectedPage};
use crate::registration::select_pages;
use crate::version::VersionRange;

/// Resolves package metadata against a paged registration index rooted at
/// `base_url`. `base_url` is the already-discovered registration resource
/// (§4.7/§6 "Repository discovery" is out of scope here).
pub struct RegistrationResolver {
    client: SharedHttpClient,
    base_url: String,
}

impl RegistrationResolver {
    pub fn new(client: SharedHttpClient, base_url: impl Into<String>) -> Self {
        RegistrationResolver {
            client,
            base_url: base_url.into(),
        }
    }

    fn registration_url(&self, id: &str) -> String {
        format!(
            "{}/{}/index.json",
            self.base_url.trim_end_matches('/'),
            id.to_ascii_lowercase()
        )
    }

    /// Resolve every `DependencyInfo` satisfying `range` for `id`. Returns
    /// an empty set if the package is entirely absent (index 404s, I4); any
    /// other failure aborts the whole call (§4.5 "Failure semantics").
    #[tracing::instrument(skip(self, cache, cancel), fields(package = %id))]
    pub async fn resolve(
        &self,
        id: &str,
        range: &VersionRange,
        cache: Arc<SessionCache>,
        cancel: &CancellationToken,
    ) -> Result<Vec<DependencyInfo>> {
        cancel.check()?;
        let index_url = self.registration_url(id);

        let index_value = match fetch(&*self.client, &index_url, &cache).await? {
            Some(v) => v,
            None => {
                tracing::debug!(url = %index_url, "registration index absent, package unknown");
                return Ok(Vec::new());
            }
        };

        let index: RegistrationIndexDoc = serde_json::from_value((*index_value).clone())
            .map_err(|e| Error::bad_document(&index_url, format!("invalid registration index: {e}")))?;

        cancel.check()?;
        let pages = select_pages(&index_url, &index, range)?;
        tracing::trace!(selected = pages.len(), total = index.items.len(), "selected registration pages");

        let mut inline_leaves = Vec::new();
        let mut tasks = Vec::new();

        for page in pages {
            match page {
                SelectedPage::Inline(leaves) => inline_leaves.extend(leaves),
                SelectedPage::Remote(url) => {
                    let client = self.client.clone();
                    let cache = cache.clone();
                    tasks.push(tokio::spawn(async move {
                        match fetch(&*client, &url, &cache).await? {
                            Some(doc) => Ok(doc),
                            None => {
                                tracing::warn!(url = %url, "page referenced by registration index was not found");
                                Err(Error::bad_document(
                                    &url,
                                    "page referenced by registration index was not found",
                                ))
                            }
                        }
                    }));
                }
            }
        }

        let page_values = try_join_all(tasks)
            .await
            .map_err(|e| Error::bad_document(&index_url, format!("page fetch task panicked: {e}")))?
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        cancel.check()?;

        let mut results: HashMap<PackageIdentity, DependencyInfo> = HashMap::new();

        for leaf in inline_leaves {
            cancel.check()?;
            accept(leaf.catalog_entry, range, &index_url, &mut results)?;
        }
        for value in page_values {
            let page: PageDoc = serde_json::from_value((*value).clone())
                .map_err(|e| Error::bad_document(&index_url, format!("invalid registration page: {e}")))?;
            for leaf in page.items {
                cancel.check()?;
                accept(leaf.catalog_entry, range, &index_url, &mut results)?;
            }
        }

        Ok(results.into_values().collect())
    }
}

fn accept(
    entry: CatalogEntryDoc,
    range: &VersionRange,
    source_url: &str,
    out: &mut HashMap<PackageIdentity, DependencyInfo>,
) -> Result<()> {
    if let Some(info) = decode_entry(&entry, range, source_url)? {
        out.entry(info.identity.clone()).or_insert(info);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::CountingClient;
    use crate::version::Version;

    fn registration_url(id: &str) -> String {
        format!("https://example.test/reg/{}/index.json", id)
    }

    #[tokio::test]
    async fn single_inline_version_no_deps() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/a/page1.json",
                    "lower": "1.0.0",
                    "upper": "1.0.0",
                    "items": [
                        { "catalogEntry": { "id": "A", "version": "1.0.0" } }
                    ]
                }
            ]
        }"#;
        let client = Arc::new(CountingClient::new().with_json(&registration_url("a"), 200, index));
        let resolver = RegistrationResolver::new(client.clone(), "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());

        let results = resolver
            .resolve("a", &VersionRange::all(), cache, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identity.id(), "A");
        assert_eq!(client.total_calls(), 1);
    }

    #[tokio::test]
    async fn range_filter_excludes_non_overlapping_page() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/a/page1.json",
                    "lower": "1.0.0",
                    "upper": "1.5.0",
                    "items": [
                        { "catalogEntry": { "id": "A", "version": "1.0.0" } },
                        { "catalogEntry": { "id": "A", "version": "1.2.0" } },
                        { "catalogEntry": { "id": "A", "version": "1.5.0" } }
                    ]
                },
                {
                    "@id": "https://example.test/reg/a/page2.json",
                    "lower": "2.0.0",
                    "upper": "2.0.0",
                    "items": [
                        { "catalogEntry": { "id": "A", "version": "2.0.0" } }
                    ]
                }
            ]
        }"#;
        let client = Arc::new(CountingClient::new().with_json(&registration_url("a"), 200, index));
        let resolver = RegistrationResolver::new(client, "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());
        let range = VersionRange::parse("[1.1.0, 1.9.0]").unwrap();

        let results = resolver
            .resolve("a", &range, cache, &CancellationToken::new())
            .await
            .unwrap();

        let mut versions: Vec<String> = results.iter().map(|r| r.identity.version().to_string()).collect();
        versions.sort();
        assert_eq!(versions, vec!["1.2.0", "1.5.0"]);
    }

    #[tokio::test]
    async fn deferred_page_is_fetched_once_and_filtered() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/a/p1.json",
                    "lower": "0.9.0",
                    "upper": "1.0.0"
                }
            ]
        }"#;
        let page = r#"{
            "items": [
                { "catalogEntry": { "id": "A", "version": "0.9.0" } },
                { "catalogEntry": { "id": "A", "version": "1.0.0" } }
            ]
        }"#;
        let client = Arc::new(
            CountingClient::new()
                .with_json(&registration_url("a"), 200, index)
                .with_json("https://example.test/reg/a/p1.json", 200, page),
        );
        let resolver = RegistrationResolver::new(client.clone(), "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());
        let range = VersionRange::exact(Version::parse("1.0.0").unwrap());

        let results = resolver
            .resolve("a", &range, cache, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identity.version().to_string(), "1.0.0");
        assert_eq!(client.call_count("https://example.test/reg/a/p1.json"), 1);
    }

    #[tokio::test]
    async fn unlisted_entry_is_excluded() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/x/page1.json",
                    "lower": "1.0.0",
                    "upper": "1.0.0",
                    "items": [
                        { "catalogEntry": { "id": "X", "version": "1.0.0", "published": "1900-01-01T00:00:00Z" } }
                    ]
                }
            ]
        }"#;
        let client = Arc::new(CountingClient::new().with_json(&registration_url("x"), 200, index));
        let resolver = RegistrationResolver::new(client, "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());

        let results = resolver
            .resolve("x", &VersionRange::all(), cache, &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn absent_package_returns_empty_without_error() {
        let client = Arc::new(CountingClient::new().with_json(&registration_url("nope"), 404, ""));
        let resolver = RegistrationResolver::new(client, "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());

        let results = resolver
            .resolve("nope", &VersionRange::all(), cache, &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_remote_page_is_a_protocol_violation() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/a/p1.json",
                    "lower": "1.0.0",
                    "upper": "1.0.0"
                }
            ]
        }"#;
        let client = Arc::new(CountingClient::new().with_json(&registration_url("a"), 200, index));
        let resolver = RegistrationResolver::new(client, "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());

        let err = resolver
            .resolve("a", &VersionRange::all(), cache, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BadDocument { .. }));
    }

    #[tokio::test]
    async fn cached_index_is_fetched_once_across_two_calls_sharing_a_cache() {
        let index = r#"{
            "items": [
                {
                    "@id": "https://example.test/reg/a/page1.json",
                    "lower": "1.0.0",
                    "upper": "1.0.0",
                    "items": [
                        { "catalogEntry": { "id": "A", "version": "1.0.0" } }
                    ]
                }
            ]
        }"#;
        let client = Arc::new(CountingClient::new().with_json(&registration_url("a"), 200, index));
        let resolver = RegistrationResolver::new(client.clone(), "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());

        resolver
            .resolve("a", &VersionRange::all(), cache.clone(), &CancellationToken::new())
            .await
            .unwrap();
        resolver
            .resolve("a", &VersionRange::all(), cache, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.call_count(&registration_url("a")), 1);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_network_io() {
        let client = Arc::new(CountingClient::new());
        let resolver = RegistrationResolver::new(client.clone(), "https://example.test/reg");
        let cache = Arc::new(SessionCache::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver
            .resolve("a", &VersionRange::all(), cache, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(client.total_calls(), 0);
    }
}
