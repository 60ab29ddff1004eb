//! Protocol-F resolver (C6): adapts a caller-supplied flat listing
//! repository into the same `DependencyInfo` shape C5 produces.
//!
//! The legacy flat wire format itself is implementation-defined (§6), so
//! the caller supplies a [`FlatRepository`] that already speaks it; this
//! module only prescribes the shape the adapter must produce and the error
//! wrapping around it.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{DependencyInfo, FrameworkTag, PackageDependency, PackageDependencyGroup, PackageIdentity};
use crate::version::{Version, VersionRange};

/// One dependency edge as reported by a flat listing repository, prior to
/// range parsing.
#[derive(Debug, Clone)]
pub struct FlatDependency {
    pub id: String,
    pub range: Option<String>,
}

/// One dependency set as reported by a flat listing repository: the
/// underlying "dependency sets" grouping, keyed by an optional framework
/// moniker exactly as `dependencyGroups` is in protocol-R.
#[derive(Debug, Clone)]
pub struct FlatDependencySet {
    pub target_framework: Option<String>,
    pub dependencies: Vec<FlatDependency>,
}

/// A caller-supplied transport for the legacy flat-versioned protocol.
/// `pkgmeta` does not speak this wire format itself (§6) — it only
/// converts whatever the caller's implementation returns into
/// `DependencyInfo`.
#[async_trait]
pub trait FlatRepository: Send + Sync {
    /// Every known version string for `id`, in no particular order.
    async fn list_versions(&self, id: &str) -> Result<Vec<String>>;

    /// The declared dependency sets for one `(id, version)` pair.
    async fn dependency_sets(&self, id: &str, version: &str) -> Result<Vec<FlatDependencySet>>;
}

/// Adapts one [`FlatRepository`] into the uniform resolver surface C7
/// dispatches to.
pub struct FlatResolver<R: FlatRepository> {
    repo: R,
    source_url: String,
}

impl<R: FlatRepository> FlatResolver<R> {
    pub fn new(repo: R, source_url: impl Into<String>) -> Self {
        FlatResolver {
            repo,
            source_url: source_url.into(),
        }
    }

    #[tracing::instrument(skip(self), fields(package = %id))]
    pub async fn resolve_all(&self, id: &str) -> Result<Vec<DependencyInfo>> {
        let versions = self
            .repo
            .list_versions(id)
            .await
            .map_err(|e| self.wrap(id, e))?;

        let mut results = Vec::with_capacity(versions.len());
        for raw_version in versions {
            if let Some(info) = self.build_entry(id, &raw_version).await? {
                results.push(info);
            }
        }
        Ok(results)
    }

    #[tracing::instrument(skip(self), fields(package = %id))]
    pub async fn resolve_one(&self, id: &str, version: &Version) -> Result<Option<DependencyInfo>> {
        self.build_entry(id, &version.to_string()).await
    }

    async fn build_entry(&self, id: &str, raw_version: &str) -> Result<Option<DependencyInfo>> {
        let version = Version::parse(raw_version)
            .map_err(|e| self.wrap(id, e))?;

        let sets = self
            .repo
            .dependency_sets(id, raw_version)
            .await
            .map_err(|e| self.wrap(id, e))?;

        let mut groups = Vec::with_capacity(sets.len());
        for set in sets {
            let framework = match &set.target_framework {
                Some(tf) => FrameworkTag::parse(tf),
                None => FrameworkTag::any(),
            };
            let mut dependencies = Vec::with_capacity(set.dependencies.len());
            for dep in set.dependencies {
                let range = match &dep.range {
                    None => None,
                    Some(raw) => Some(
                        VersionRange::parse(raw).map_err(|e| self.wrap(id, e))?,
                    ),
                };
                dependencies.push(PackageDependency::new(dep.id, range));
            }
            groups.push(PackageDependencyGroup::new(framework, dependencies));
        }

        let identity = PackageIdentity::new(id.to_string(), version);
        Ok(Some(DependencyInfo::new(identity, groups)))
    }

    fn wrap(&self, id: &str, err: Error) -> Error {
        tracing::warn!(package = id, source = %self.source_url, error = %err, "flat repository adapter failed");
        Error::protocol(id, self.source_url.clone(), err.to_string())
    }
}
