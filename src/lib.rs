//! pkgmeta - package dependency metadata resolution
//!
//! `pkgmeta` talks to a remote package repository on behalf of a dependency
//! solver: given a package id (optionally narrowed to a version range), it
//! retrieves the candidate versions and their declared dependency groups.
//! It does not solve version conflicts, pick a target-platform profile, or
//! drive installation — those are the caller's job.
//!
//! Two repository protocols are supported behind one facade:
//!
//! - **protocol-R**, a paged registration index served over HTTP and
//!   partitioned into version-range pages fetched on demand
//!   ([`resolver_r::RegistrationResolver`]).
//! - **protocol-F**, a flat listing service that returns every version of a
//!   package id in one call, adapted through a caller-supplied
//!   [`resolver_f::FlatRepository`] ([`resolver_f::FlatResolver`]).
//!
//! [`facade::PackageResolver`] is the entry point most callers want: build
//! one with the repository capability your discovery layer already found,
//! then call `resolve_one`/`resolve_all`.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use pkgmeta::{PackageResolver, RepositoryCapability, ReqwestClient};
//!
//! # async fn run() -> pkgmeta::Result<()> {
//! let client = Arc::new(ReqwestClient::new());
//! let resolver = PackageResolver::new(
//!     client,
//!     RepositoryCapability::Registration {
//!         base_url: "https://api.example.test/v3/registration5-semver1".to_string(),
//!     },
//! );
//!
//! let versions = resolver.resolve_all("Newtonsoft.Json").await?;
//! println!("found {} versions", versions.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`version`] - Version model (C1): parsing, ordering, ranges.
//! - [`model`] - Shared value types: `PackageIdentity`, `DependencyInfo`, and friends.
//! - [`client`] - The `HttpClient` transport seam (C2's network edge).
//! - [`fetch`] - JSON fetcher with per-call session cache (C2).
//! - [`registration`] - Registration-index wire schema and page selector (C3).
//! - [`catalog`] - Catalog-entry decoder (C4).
//! - [`resolver_r`] - Protocol-R resolver (C5).
//! - [`resolver_f`] - Protocol-F adapter (C6).
//! - [`facade`] - Resolver capability facade (C7), the public entry point.
//! - [`cancel`] - Cooperative cancellation token.
//! - [`error`] - Crate-wide error type.

pub mod cancel;
pub mod catalog;
pub mod client;
pub mod error;
pub mod facade;
pub mod fetch;
pub mod model;
pub mod registration;
pub mod resolver_f;
pub mod resolver_r;
pub mod version;

pub use cancel::CancellationToken;
pub use client::{HttpClient, RawResponse, ReqwestClient, SharedHttpClient};
pub use error::{Error, Result};
pub use facade::{PackageResolver, RepositoryCapability};
pub use fetch::SessionCache;
pub use model::{
    nearest_framework, DependencyInfo, FrameworkTag, PackageDependency, PackageDependencyGroup,
    PackageIdentity,
};
pub use resolver_f::{FlatDependency, FlatDependencySet, FlatRepository, FlatResolver};
pub use resolver_r::RegistrationResolver;
pub use version::{Version, VersionRange};
