//! Catalog-entry decoder (C4): turns one wire `CatalogEntryDoc` into a
//! `DependencyInfo`, or drops it (unlisted, out of range).

use crate::error::{Error, Result};
use crate::model::{DependencyInfo, FrameworkTag, PackageDependency, PackageDependencyGroup, PackageIdentity};
use crate::registration::CatalogEntryDoc;
use crate::version::{Version, VersionRange};

use chrono::{DateTime, NaiveDate, Utc};

/// The sentinel publish date signalling an unlisted version.
fn unlisted_sentinel() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).expect("1900-01-01 is a valid date")
}

/// `published` is accepted either as a full RFC3339 timestamp or a bare
/// `YYYY-MM-DD` date; either way only the calendar date is compared against
/// the sentinel.
fn is_unlisted(published: &str) -> bool {
    let date = DateTime::parse_from_rfc3339(published)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(published, "%Y-%m-%d"));

    match date {
        Ok(date) => date == unlisted_sentinel(),
        Err(_) => false,
    }
}

/// Decode one catalog entry against the caller's originally requested
/// range. Returns `Ok(None)` when the entry should be silently dropped
/// (unlisted, or outside the requested range) and `Err` only for malformed
/// documents (§4.4).
pub fn decode_entry(
    entry: &CatalogEntryDoc,
    range: &VersionRange,
    source_url: &str,
) -> Result<Option<DependencyInfo>> {
    let version = Version::parse(&entry.version)
        .map_err(|e| Error::bad_document(source_url, format!("bad catalog entry version: {e}")))?;

    if let Some(published) = &entry.published {
        if is_unlisted(published) {
            return Ok(None);
        }
    }

    if !range.satisfies(&version) {
        return Ok(None);
    }

    let mut groups = Vec::new();
    if let Some(doc_groups) = &entry.dependency_groups {
        for doc_group in doc_groups {
            let framework = match &doc_group.target_framework {
                Some(tf) => FrameworkTag::parse(tf),
                None => FrameworkTag::any(),
            };

            let mut dependencies = Vec::new();
            if let Some(doc_deps) = &doc_group.dependencies {
                for dep in doc_deps {
                    if dep.id.trim().is_empty() {
                        return Err(Error::bad_document(source_url, "dependency missing id"));
                    }
                    let dep_range = match &dep.range {
                        None => None,
                        Some(raw) => {
                            let parsed = VersionRange::parse(raw).map_err(|e| {
                                Error::bad_document(
                                    source_url,
                                    format!("bad dependency range '{raw}': {e}"),
                                )
                            })?;
                            Some(parsed.with_pre(range.include_pre()))
                        }
                    };
                    dependencies.push(PackageDependency::new(dep.id.clone(), dep_range));
                }
            }

            groups.push(PackageDependencyGroup::new(framework, dependencies));
        }
    }

    let identity = PackageIdentity::new(entry.id.clone(), version);
    Ok(Some(DependencyInfo::new(identity, groups)))
}
