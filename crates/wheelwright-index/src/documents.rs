//! Wire documents consumed from the package index.
//!
//! Only the fields the resolver actually reads are modeled; everything else
//! in the index responses is carried opaquely or dropped by serde.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The project document served at `/pypi/{name}/json`.
///
/// The resolver only enumerates the keys of `releases`; the per-release
/// metadata values are opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Map of version string to release metadata.
    #[serde(default)]
    pub releases: AHashMap<String, sonic_rs::Value>,
}

/// The release document served at `/pypi/{name}/{version}/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseDocument {
    /// Release info block.
    #[serde(default)]
    pub info: ReleaseInfo,
}

/// The `info` block of a release document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Package name, as the index spells it.
    #[serde(default)]
    pub name: Option<String>,
    /// Release version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Declared dependency fragments, when present and non-empty.
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_document_tolerates_missing_releases() {
        let doc: ProjectDocument = sonic_rs::from_str("{}").unwrap();
        assert!(doc.releases.is_empty());
    }

    #[test]
    fn release_document_reads_requires_dist() {
        let doc: ReleaseDocument = sonic_rs::from_str(
            r#"{"info": {"name": "alpha", "version": "1.0.0", "requires_dist": ["beta (>=1.0)"]}}"#,
        )
        .unwrap();
        assert_eq!(doc.info.requires_dist.unwrap().len(), 1);
    }

    #[test]
    fn release_document_tolerates_null_requires_dist() {
        let doc: ReleaseDocument =
            sonic_rs::from_str(r#"{"info": {"requires_dist": null}}"#).unwrap();
        assert!(doc.info.requires_dist.is_none());
    }
}
