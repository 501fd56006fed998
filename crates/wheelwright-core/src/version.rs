//! Canonical package versions and bounded version ranges.
//!
//! The package index publishes versions as dotted decimal strings of one or
//! more components. Wheelwright canonicalizes every version to exactly three
//! numeric components: short versions are right-padded with `.0`, components
//! beyond the third are discarded. Pre-release and build qualifiers are not
//! part of this model; strings carrying them are rejected by the release
//! filter before they ever reach [`Version::parse`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

/// Matches version strings that count as published releases: one or more
/// groups of decimal digits, dot-separated. Anything else (RCs, betas,
/// post/dev tags) is filtered out before graph construction.
static RELEASE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(\d+\.?)+$").expect("valid regex"));

/// Pad or truncate a dotted version string to exactly three components.
///
/// Purely textual: `"1.2"` becomes `"1.2.0"`, `"1.2.3.4"` becomes
/// `"1.2.3"`. No validation is performed, which makes the operation
/// idempotent on any input.
#[must_use]
pub fn standardize(version: &str) -> String {
    let components: Vec<&str> = version.split('.').collect();
    (0..3)
        .map(|i| components.get(i).copied().unwrap_or("0"))
        .collect::<Vec<_>>()
        .join(".")
}

/// A canonical three-component numeric version.
///
/// Ordering is component-wise numeric, so `1.9.0 < 1.10.0`. The canonical
/// string form is cached at construction and used for display, hashing of
/// graph keys, and serialization.
#[derive(Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    canonical: Arc<str>,
}

impl Version {
    /// Create a version from explicit components.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let canonical: Arc<str> = Arc::from(format!("{major}.{minor}.{patch}"));
        Self {
            major,
            minor,
            patch,
            canonical,
        }
    }

    /// Parse a dotted decimal version string.
    ///
    /// One or two components are padded with zeros; components beyond the
    /// third are discarded. A single trailing dot is tolerated because the
    /// release filter admits it. Returns `None` for anything non-numeric.
    ///
    /// # Examples
    ///
    /// ```
    /// use wheelwright_core::Version;
    ///
    /// let v = Version::parse("1.2").unwrap();
    /// assert_eq!(v.to_string(), "1.2.0");
    /// assert!(Version::parse("1.0.0rc1").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut components: Vec<&str> = input.split('.').collect();
        // "1.2." splits into ["1", "2", ""]; the release filter admits the
        // trailing dot, so tolerate exactly one empty tail component.
        if components.len() > 1 && components.last() == Some(&"") {
            components.pop();
        }

        let mut numeric = [0_u64; 3];
        for (i, component) in components.iter().enumerate() {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if i < 3 {
                numeric[i] = component.parse().ok()?;
            }
        }

        Some(Self::new(numeric[0], numeric[1], numeric[2]))
    }

    /// Check whether a raw index key counts as a published release.
    #[must_use]
    pub fn is_release(key: &str) -> bool {
        RELEASE_REGEX.is_match(key)
    }

    /// Major component.
    #[must_use]
    #[inline]
    pub const fn major(&self) -> u64 {
        self.major
    }

    /// Minor component.
    #[must_use]
    #[inline]
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component.
    #[must_use]
    #[inline]
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    /// The canonical `major.minor.patch` form.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Version").field(&self.canonical).finish()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.major, self.minor, self.patch).hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VersionParseError(s.to_string()))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid version: {s}")))
    }
}

/// Error when parsing a version string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid version string: {0}")]
pub struct VersionParseError(pub String);

/// A bounded version range parsed from a requirement fragment.
///
/// The lower bound is always present; the upper bound may be absent. Bound
/// inclusivity derives from the operator that supplied the bound: operators
/// carrying `=` are inclusive, bare `<`/`>` are strict. The first operator
/// of a fragment always supplies the lower bound, even when it reads as an
/// upper-bound operator; that lenient interpretation matches what the
/// package index ecosystem has historically tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: Version,
    lower_inclusive: bool,
    upper: Option<Version>,
    upper_inclusive: bool,
}

impl VersionRange {
    /// Create a range with explicit bounds.
    #[must_use]
    pub const fn new(
        lower: Version,
        lower_inclusive: bool,
        upper: Option<Version>,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        }
    }

    /// An unbounded range admitting `lower` and everything above it.
    #[must_use]
    pub const fn at_least(lower: Version) -> Self {
        Self::new(lower, true, None, false)
    }

    /// Build a range from requirement operators.
    ///
    /// `op` supplies the lower bound, the optional `(op, version)` pair the
    /// upper bound. Inclusivity is derived from the presence of `=` in the
    /// operator.
    #[must_use]
    pub fn from_operators(op: &str, lower: Version, upper: Option<(&str, Version)>) -> Self {
        let lower_inclusive = op.contains('=');
        match upper {
            Some((upper_op, upper_version)) => Self::new(
                lower,
                lower_inclusive,
                Some(upper_version),
                upper_op.contains('='),
            ),
            None => Self::new(lower, lower_inclusive, None, false),
        }
    }

    /// Check whether a candidate version falls inside the range.
    #[must_use]
    pub fn contains(&self, candidate: &Version) -> bool {
        let lower_ok = if self.lower_inclusive {
            *candidate >= self.lower
        } else {
            *candidate > self.lower
        };
        let upper_ok = match &self.upper {
            None => true,
            Some(upper) => {
                if self.upper_inclusive {
                    candidate <= upper
                } else {
                    candidate < upper
                }
            }
        };
        lower_ok && upper_ok
    }

    /// The lower bound.
    #[must_use]
    pub const fn lower(&self) -> &Version {
        &self.lower
    }

    /// The upper bound, if bounded above.
    #[must_use]
    pub const fn upper(&self) -> Option<&Version> {
        self.upper.as_ref()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower_op = if self.lower_inclusive { ">=" } else { ">" };
        write!(f, "{lower_op}{}", self.lower)?;
        if let Some(ref upper) = self.upper {
            let upper_op = if self.upper_inclusive { "<=" } else { "<" };
            write!(f, ",{upper_op}{upper}")?;
        }
        Ok(())
    }
}
