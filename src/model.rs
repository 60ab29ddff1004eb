//! Shared value types (§3): package identity, dependency descriptors, and
//! the uniform result record every resolver back-end produces.

use crate::version::{Version, VersionRange};
use std::fmt;

/// `(id, version)` uniquely naming one package release.
///
/// Equality and hashing are case-insensitive on `id`; version equality
/// ignores build metadata (`Version`'s own `Eq` already does this). The
/// textual `id` casing preserved is whatever the server returned, not the
/// casing the caller queried with.
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    id: String,
    version: Version,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        PackageIdentity {
            id: id.into(),
            version,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id) && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl std::hash::Hash for PackageIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.to_ascii_lowercase().hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// One direct dependency edge. A `None` range means "any version".
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDependency {
    pub id: String,
    pub range: Option<VersionRange>,
}

impl PackageDependency {
    pub fn new(id: impl Into<String>, range: Option<VersionRange>) -> Self {
        PackageDependency {
            id: id.into(),
            range,
        }
    }
}

/// An opaque target-platform token. Equality is structural on the
/// normalized (trimmed, lower-cased) form; the sentinel [`FrameworkTag::any`]
/// represents a dependency group with no platform restriction.
#[derive(Debug, Clone, Eq)]
pub struct FrameworkTag(String);

impl FrameworkTag {
    const ANY_TOKEN: &'static str = "any";

    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            FrameworkTag::any()
        } else {
            FrameworkTag(normalized)
        }
    }

    pub fn any() -> Self {
        FrameworkTag(Self::ANY_TOKEN.to_string())
    }

    pub fn is_any(&self) -> bool {
        self.0 == Self::ANY_TOKEN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for FrameworkTag {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for FrameworkTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for FrameworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of direct dependencies scoped to one target-platform profile.
#[derive(Debug, Clone)]
pub struct PackageDependencyGroup {
    pub framework: FrameworkTag,
    pub dependencies: Vec<PackageDependency>,
}

impl PackageDependencyGroup {
    pub fn new(framework: FrameworkTag, dependencies: Vec<PackageDependency>) -> Self {
        PackageDependencyGroup {
            framework,
            dependencies,
        }
    }
}

impl PartialEq for PackageDependencyGroup {
    fn eq(&self, other: &Self) -> bool {
        self.framework == other.framework && unordered_eq(&self.dependencies, &other.dependencies)
    }
}

/// The per-version record a resolver produces: identity plus every declared
/// dependency group, unfiltered by target platform (framework selection is
/// the caller's job).
#[derive(Debug, Clone)]
pub struct DependencyInfo {
    pub identity: PackageIdentity,
    pub groups: Vec<PackageDependencyGroup>,
}

impl DependencyInfo {
    pub fn new(identity: PackageIdentity, groups: Vec<PackageDependencyGroup>) -> Self {
        DependencyInfo { identity, groups }
    }
}

impl PartialEq for DependencyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && unordered_eq(&self.groups, &other.groups)
    }
}

impl Eq for DependencyInfo {}

/// Compares two slices as unordered multisets using only `PartialEq`,
/// without requiring `Hash`/`Ord` on the element type. `O(n^2)` but `n` is
/// always small (framework groups or dependencies within one group).
fn unordered_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut matched = vec![false; b.len()];
    'outer: for item in a {
        for (i, other) in b.iter().enumerate() {
            if !matched[i] && item == other {
                matched[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// Picks the dependency group whose framework is the nearest match to
/// `target`, falling back to the catch-all group. This is the reducer
/// earlier revisions ran inside the resolver; it now lives as a plain
/// utility callers may opt into (the resolver itself stays
/// framework-agnostic).
pub fn nearest_framework<'a>(
    groups: &'a [PackageDependencyGroup],
    target: &FrameworkTag,
) -> Option<&'a PackageDependencyGroup> {
    groups
        .iter()
        .find(|g| &g.framework == target)
        .or_else(|| groups.iter().find(|g| g.framework.is_any()))
}
