//! Registration-index wire schema and the page selector (C3).
//!
//! The wire shapes here mirror §6's "bit-exact" schema. `#[serde(rename =
//! "...")]` is used only where the wire field name isn't valid/idiomatic
//! Rust (`@id`) or doesn't match Rust naming conventions
//! (`targetFramework`, `dependencyGroups`).

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::{Version, VersionRange};

#[derive(Debug, Deserialize)]
pub struct RegistrationIndexDoc {
    pub items: Vec<IndexItemDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexItemDoc {
    #[serde(rename = "@id")]
    pub id: String,
    pub lower: String,
    pub upper: String,
    #[serde(default)]
    pub items: Option<Vec<LeafDoc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageDoc {
    pub items: Vec<LeafDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeafDoc {
    #[serde(rename = "catalogEntry")]
    pub catalog_entry: CatalogEntryDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryDoc {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(rename = "dependencyGroups", default)]
    pub dependency_groups: Option<Vec<DepGroupDoc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepGroupDoc {
    #[serde(rename = "targetFramework", default)]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Option<Vec<DepDoc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepDoc {
    pub id: String,
    #[serde(default)]
    pub range: Option<String>,
}

/// One page this index says must be materialized: either already embedded
/// inline, or requiring a follow-up fetch of its `@id`.
#[derive(Debug, Clone)]
pub enum SelectedPage {
    Inline(Vec<LeafDoc>),
    Remote(String),
}

fn page_contains(lower: &Version, upper: &Version, v: &Version) -> bool {
    v >= lower && v <= upper
}

/// Given the top-level index and the requested range, select the items
/// that must be materialized (§4.3). Deliberately inclusive: it may
/// over-select pages that only share a boundary version with the query,
/// leaving the per-entry filter in C4 as the source of truth.
pub fn select_pages(index_url: &str, index: &RegistrationIndexDoc, range: &VersionRange) -> Result<Vec<SelectedPage>> {
    let q = range.with_pre(true);
    let mut selected = Vec::new();

    for item in &index.items {
        let lower = Version::parse(&item.lower)
            .map_err(|e| Error::bad_document(index_url, format!("bad page lower bound: {e}")))?;
        let upper = Version::parse(&item.upper)
            .map_err(|e| Error::bad_document(index_url, format!("bad page upper bound: {e}")))?;

        let required = if q.has_both_bounds() {
            page_contains(&lower, &upper, q.lo().unwrap())
                || page_contains(&lower, &upper, q.hi().unwrap())
        } else {
            q.satisfies(&lower) || q.satisfies(&upper)
        };

        if !required {
            continue;
        }

        match &item.items {
            Some(leaves) => selected.push(SelectedPage::Inline(leaves.clone())),
            None => selected.push(SelectedPage::Remote(item.id.clone())),
        }
    }

    Ok(selected)
}
