//! Version model (C1): parsing, ordering, and version ranges.
//!
//! Parsing follows the semantic-versioning grammar with one pragmatic
//! extension carried over from the source ecosystem: a fourth numeric
//! component (`major.minor.patch.revision`) is accepted and participates in
//! ordering, the way a classic four-part assembly version does.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// A total-ordered semantic version.
///
/// Build metadata is carried for round-trip `Display` but never affects
/// ordering or equality; pre-release identifiers are compared
/// case-insensitively and sort below the same numeric tuple with no
/// pre-release.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    revision: Option<u64>,
    pre: Option<String>,
    build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            revision: None,
            pre: None,
            build: None,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Parse a version string per the accepted grammar:
    /// `major.minor.patch[.revision][-pre][+build]`.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(Error::bad_version(input, "empty version string"));
        }

        // Split off build metadata first (after '+'), then pre-release (after '-'),
        // then the numeric core.
        let (core_and_pre, build) = match raw.split_once('+') {
            Some((a, b)) => (a, Some(b.to_string())),
            None => (raw, None),
        };
        let (core, pre) = match core_and_pre.split_once('-') {
            Some((a, b)) => (a, Some(b.to_string())),
            None => (core_and_pre, None),
        };

        if let Some(build) = &build {
            if build.is_empty() || !is_valid_dotted_identifiers(build) {
                return Err(Error::bad_version(input, "invalid build metadata"));
            }
        }
        if let Some(pre) = &pre {
            if pre.is_empty() || !is_valid_dotted_identifiers(pre) {
                return Err(Error::bad_version(input, "invalid pre-release identifier"));
            }
        }

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(Error::bad_version(
                input,
                "expected major.minor.patch[.revision]",
            ));
        }

        let mut nums = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || (part.len() > 1 && part.starts_with('0')) {
                return Err(Error::bad_version(input, "numeric component malformed"));
            }
            let n: u64 = part
                .parse()
                .map_err(|_| Error::bad_version(input, "numeric component malformed"))?;
            nums.push(n);
        }

        Ok(Version {
            major: nums[0],
            minor: nums[1],
            patch: nums[2],
            revision: nums.get(3).copied(),
            pre,
            build,
        })
    }

    fn cmp_key(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision.unwrap_or(0))
    }
}

fn is_valid_dotted_identifiers(s: &str) -> bool {
    s.split('.')
        .all(|ident| !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

/// Compare dot-separated pre-release identifier lists per semver precedence
/// rules: numeric identifiers compare numerically and always sort below
/// alphanumeric identifiers; alphanumeric identifiers compare
/// case-insensitively (a deliberate relaxation of strict semver, matching
/// the case-insensitive comparison the version range design requires).
fn compare_pre(a: &str, b: &str) -> Ordering {
    let mut ai = a.split('.');
    let mut bi = b.split('.');
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(xn), Ok(yn)) => xn.cmp(&yn),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let core = self.cmp_key().cmp(&other.cmp_key());
        if core != Ordering::Equal {
            return core;
        }
        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_pre(a, b),
        }
    }
}

/// One dot-separated pre-release identifier, normalized the same way
/// `compare_pre` compares it: numeric identifiers hash on their parsed
/// value (so `"1"` and `"01"` collide, matching `compare_pre` treating them
/// as numerically equal), alphanumeric identifiers hash case-insensitively.
#[derive(Hash)]
enum PreIdent {
    Numeric(u64),
    Alpha(String),
}

fn normalized_pre_idents(pre: &str) -> Vec<PreIdent> {
    pre.split('.')
        .map(|part| match part.parse::<u64>() {
            Ok(n) => PreIdent::Numeric(n),
            Err(_) => PreIdent::Alpha(part.to_ascii_lowercase()),
        })
        .collect()
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cmp_key().hash(state);
        match &self.pre {
            None => state.write_u8(0),
            Some(pre) => {
                state.write_u8(1);
                normalized_pre_idents(pre).hash(state);
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(rev) = self.revision {
            write!(f, ".{rev}")?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

/// A bounded or half-bounded interval over versions, with optional
/// pre-release inclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRange {
    lo: Option<Version>,
    lo_inclusive: bool,
    hi: Option<Version>,
    hi_inclusive: bool,
    include_pre: bool,
}

impl VersionRange {
    pub fn lo(&self) -> Option<&Version> {
        self.lo.as_ref()
    }

    pub fn hi(&self) -> Option<&Version> {
        self.hi.as_ref()
    }

    pub fn include_pre(&self) -> bool {
        self.include_pre
    }

    pub fn has_both_bounds(&self) -> bool {
        self.lo.is_some() && self.hi.is_some()
    }

    /// Returns a copy of this range with `include_pre` overridden.
    pub fn with_pre(&self, include_pre: bool) -> Self {
        VersionRange {
            include_pre,
            ..self.clone()
        }
    }

    /// A range matching exactly one version.
    pub fn exact(v: Version) -> Self {
        let include_pre = v.is_prerelease();
        VersionRange {
            lo: Some(v.clone()),
            lo_inclusive: true,
            hi: Some(v),
            hi_inclusive: true,
            include_pre,
        }
    }

    /// A range matching every version, including pre-release.
    pub fn all() -> Self {
        VersionRange {
            lo: None,
            lo_inclusive: false,
            hi: None,
            hi_inclusive: false,
            include_pre: true,
        }
    }

    /// Does the (inclusive) half of this range contain `v`, ignoring
    /// `include_pre`? Used internally and by the page selector, which
    /// operates on plain `[lower, upper]` page bounds.
    pub fn satisfies_bounds(&self, v: &Version) -> bool {
        let lo_ok = match &self.lo {
            None => true,
            Some(lo) => match v.cmp(lo) {
                Ordering::Greater => true,
                Ordering::Equal => self.lo_inclusive,
                Ordering::Less => false,
            },
        };
        if !lo_ok {
            return false;
        }
        match &self.hi {
            None => true,
            Some(hi) => match v.cmp(hi) {
                Ordering::Less => true,
                Ordering::Equal => self.hi_inclusive,
                Ordering::Greater => false,
            },
        }
    }

    /// Full membership test, honouring `include_pre`.
    pub fn satisfies(&self, v: &Version) -> bool {
        if !self.include_pre && v.is_prerelease() {
            return false;
        }
        self.satisfies_bounds(v)
    }

    /// Parse interval notation: `[1.0, 2.0)`, bare `1.0` (meaning `>= 1.0`),
    /// or `*`/empty (meaning "all versions").
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::all());
        }

        let (lo, lo_inclusive, hi, hi_inclusive) = if raw.starts_with('[') || raw.starts_with('(') {
            let lo_inclusive = raw.starts_with('[');
            let last = raw
                .chars()
                .last()
                .ok_or_else(|| Error::bad_range(input, "empty interval"))?;
            if last != ']' && last != ')' {
                return Err(Error::bad_range(input, "interval must close with ] or )"));
            }
            let hi_inclusive = last == ']';
            let inner = &raw[1..raw.len() - 1];

            if let Some((lo_s, hi_s)) = inner.split_once(',') {
                let lo_s = lo_s.trim();
                let hi_s = hi_s.trim();
                let lo = if lo_s.is_empty() {
                    None
                } else {
                    Some(Version::parse(lo_s).map_err(|e| {
                        Error::bad_range(input, format!("invalid lower bound: {e}"))
                    })?)
                };
                let hi = if hi_s.is_empty() {
                    None
                } else {
                    Some(Version::parse(hi_s).map_err(|e| {
                        Error::bad_range(input, format!("invalid upper bound: {e}"))
                    })?)
                };
                (lo, lo_inclusive, hi, hi_inclusive)
            } else {
                // A single version inside brackets denotes an exact match,
                // e.g. "[1.0.0]".
                let v = Version::parse(inner.trim())
                    .map_err(|e| Error::bad_range(input, format!("invalid version: {e}")))?;
                (Some(v.clone()), true, Some(v), true)
            }
        } else {
            // Bare version: minimum-inclusive, unbounded above.
            let v = Version::parse(raw)
                .map_err(|e| Error::bad_range(input, format!("invalid version: {e}")))?;
            (Some(v), true, None, false)
        };

        let include_pre = lo.as_ref().map_or(false, Version::is_prerelease)
            || hi.as_ref().map_or(false, Version::is_prerelease);

        Ok(VersionRange {
            lo,
            lo_inclusive,
            hi,
            hi_inclusive,
            include_pre,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_and_four_part_versions() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));

        let v4 = Version::parse("1.2.3.4").unwrap();
        assert_eq!(v4.revision, Some(4));
        assert_eq!(v4.to_string(), "1.2.3.4");
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4.5").is_err());
        assert!(Version::parse("01.2.3").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn prerelease_sorts_below_release() {
        let stable = Version::parse("1.0.0").unwrap();
        let pre = Version::parse("1.0.0-beta").unwrap();
        assert!(pre < stable);
    }

    #[test]
    fn prerelease_comparison_is_case_insensitive() {
        let a = Version::parse("1.0.0-Beta").unwrap();
        let b = Version::parse("1.0.0-beta").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn numeric_prerelease_identifiers_sort_below_alphanumeric() {
        let numeric = Version::parse("1.0.0-1").unwrap();
        let alpha = Version::parse("1.0.0-alpha").unwrap();
        assert!(numeric < alpha);
    }

    #[test]
    fn zero_padded_numeric_prerelease_hashes_equal_to_unpadded() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = Version::parse("1.0.0-1").unwrap();
        let b = Version::parse("1.0.0-01").unwrap();
        assert_eq!(a, b);

        let hash_of = |v: &Version| {
            let mut hasher = DefaultHasher::new();
            v.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn build_metadata_is_ignored_in_ordering() {
        let a = Version::parse("1.0.0+build1").unwrap();
        let b = Version::parse("1.0.0+build2").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn range_parses_bare_version_as_minimum_inclusive() {
        let r = VersionRange::parse("1.0.0").unwrap();
        assert!(r.satisfies(&Version::parse("1.0.0").unwrap()));
        assert!(r.satisfies(&Version::parse("5.0.0").unwrap()));
        assert!(!r.satisfies(&Version::parse("0.9.0").unwrap()));
    }

    #[test]
    fn range_parses_bracket_interval() {
        let r = VersionRange::parse("[1.0.0, 2.0.0)").unwrap();
        assert!(r.satisfies(&Version::parse("1.0.0").unwrap()));
        assert!(r.satisfies(&Version::parse("1.9.9").unwrap()));
        assert!(!r.satisfies(&Version::parse("2.0.0").unwrap()));
        assert!(r.has_both_bounds());
    }

    #[test]
    fn range_parses_exact_singleton() {
        let r = VersionRange::parse("[1.0.0]").unwrap();
        assert!(r.satisfies(&Version::parse("1.0.0").unwrap()));
        assert!(!r.satisfies(&Version::parse("1.0.1").unwrap()));
    }

    #[test]
    fn range_all_matches_everything_including_prerelease() {
        let r = VersionRange::all();
        assert!(r.satisfies(&Version::parse("1.0.0-alpha").unwrap()));
        assert!(r.satisfies(&Version::parse("99.0.0").unwrap()));
    }

    #[test]
    fn with_pre_overrides_inclusion() {
        let r = VersionRange::parse("1.0.0").unwrap().with_pre(true);
        assert!(r.satisfies(&Version::parse("1.5.0-beta").unwrap()));
        let r2 = r.with_pre(false);
        assert!(!r2.satisfies(&Version::parse("1.5.0-beta").unwrap()));
    }

    #[test]
    fn exact_range_allows_its_own_prerelease_version() {
        let v = Version::parse("1.0.0-beta").unwrap();
        let r = VersionRange::exact(v.clone());
        assert!(r.satisfies(&v));
    }
}
