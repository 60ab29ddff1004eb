//! Resolver capability facade (C7): the single query surface a caller uses,
//! dispatching to the protocol-R (C5) or protocol-F (C6) back-end based on
//! which capability the repository exposes.
//!
//! Resource discovery — deciding *which* capability a repository offers —
//! is out of scope (§1); the caller has already done that and hands the
//! result in as a [`RepositoryCapability`] at construction time. Building a
//! [`PackageResolver`] performs no network I/O of its own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::client::SharedHttpClient;
use crate::error::{Error, Result};
use crate::fetch::SessionCache;
use crate::model::DependencyInfo;
use crate::resolver_f::{FlatRepository, FlatResolver};
use crate::resolver_r::RegistrationResolver;
use crate::version::{Version, VersionRange};

#[async_trait]
impl FlatRepository for Arc<dyn FlatRepository> {
    async fn list_versions(&self, id: &str) -> Result<Vec<String>> {
        (**self).list_versions(id).await
    }

    async fn dependency_sets(
        &self,
        id: &str,
        version: &str,
    ) -> Result<Vec<crate::resolver_f::FlatDependencySet>> {
        (**self).dependency_sets(id, version).await
    }
}

/// Which repository protocol the caller has already discovered for the
/// package source this resolver queries (§6 "Repository discovery" is out
/// of scope; the caller supplies the outcome).
pub enum RepositoryCapability {
    /// A paged registration index service, at `base_url`.
    Registration { base_url: String },
    /// A legacy flat-listing service, adapted through a caller-supplied
    /// [`FlatRepository`].
    FlatListing {
        base_url: String,
        repository: Arc<dyn FlatRepository>,
    },
}

enum Backend {
    Registration(RegistrationResolver),
    Flat(FlatResolver<Arc<dyn FlatRepository>>),
}

/// The uniform query surface (§4.7): `resolve_one` / `resolve_all`, backed
/// by whichever protocol the repository speaks.
pub struct PackageResolver {
    backend: Backend,
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_argument("package id must not be empty"));
    }
    Ok(())
}

impl PackageResolver {
    pub fn new(client: SharedHttpClient, capability: RepositoryCapability) -> Self {
        let backend = match capability {
            RepositoryCapability::Registration { base_url } => {
                Backend::Registration(RegistrationResolver::new(client, base_url))
            }
            RepositoryCapability::FlatListing {
                base_url,
                repository,
            } => Backend::Flat(FlatResolver::new(repository, base_url)),
        };
        PackageResolver { backend }
    }

    /// Fetch metadata for exactly one `(id, version)` pair, or `None` if
    /// that release is unknown (or present but unlisted/absent-on-index).
    ///
    /// `id` and `version` are validated before any network call: an empty
    /// `id` fails `InvalidArgument`, an unparseable `version` fails
    /// `BadVersion` (§6).
    pub async fn resolve_one(&self, id: &str, version: &str) -> Result<Option<DependencyInfo>> {
        self.resolve_one_cancellable(id, version, &CancellationToken::new())
            .await
    }

    /// As [`Self::resolve_one`], but checked against an explicit
    /// cancellation signal at every suspension point (§5).
    pub async fn resolve_one_cancellable(
        &self,
        id: &str,
        version: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DependencyInfo>> {
        validate_id(id)?;
        let parsed = Version::parse(version)?;

        match &self.backend {
            Backend::Registration(resolver) => {
                let cache = Arc::new(SessionCache::new());
                let range = VersionRange::exact(parsed);
                let mut results = resolver.resolve(id, &range, cache, cancel).await?;
                Ok(results.pop())
            }
            Backend::Flat(resolver) => resolver.resolve_one(id, &parsed).await,
        }
    }

    /// Fetch metadata for every known version of `id`, including
    /// pre-release versions.
    pub async fn resolve_all(&self, id: &str) -> Result<Vec<DependencyInfo>> {
        self.resolve_all_cancellable(id, &CancellationToken::new())
            .await
    }

    /// As [`Self::resolve_all`], but checked against an explicit
    /// cancellation signal at every suspension point (§5).
    pub async fn resolve_all_cancellable(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DependencyInfo>> {
        validate_id(id)?;

        match &self.backend {
            Backend::Registration(resolver) => {
                let cache = Arc::new(SessionCache::new());
                resolver.resolve(id, &VersionRange::all(), cache, cancel).await
            }
            Backend::Flat(resolver) => resolver.resolve_all(id).await,
        }
    }
}
