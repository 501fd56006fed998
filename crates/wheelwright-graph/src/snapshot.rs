//! Graph snapshots keyed by a month-bucketed requirement fingerprint.
//!
//! A snapshot round-trips exactly four fields: the requirement list, the
//! ref arena, the per-name version index, and the explored-name set. The
//! transport handle is never persisted. Because the fingerprint embeds the
//! current year and month, every snapshot expires at the month boundary.

use crate::graph::PackageGraph;
use crate::package::PackageRef;
use ahash::{AHashMap, AHashSet};
use chrono::{Datelike, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use wheelwright_core::Version;

/// Month-granular identity of a requirement list.
///
/// Computed as `md5(year ';' month ';' sorted_requirements_joined(';'))`,
/// hex-encoded. Requirement order does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint for the current month.
    #[must_use]
    pub fn now(requirements: &[String]) -> Self {
        let today = Utc::now();
        Self::for_month(today.year(), today.month(), requirements)
    }

    /// Fingerprint for an explicit year and month.
    #[must_use]
    pub fn for_month(year: i32, month: u32, requirements: &[String]) -> Self {
        let mut sorted = requirements.to_vec();
        sorted.sort();
        let digest = Md5::digest(format!("{year};{month};{}", sorted.join(";")));
        Self(hex::encode(digest))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur reading or writing snapshots.
///
/// Callers treat read failures as cache misses; the builder never fails a
/// build because a snapshot could not be used.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot exists but cannot be restored.
    #[error("snapshot corrupt: {message}")]
    Corrupt {
        /// Why restoration failed.
        message: String,
    },
}

/// Serialized form of a graph: exactly the four persisted fields.
#[derive(Serialize, Deserialize)]
struct SnapshotDoc {
    requirements: Vec<String>,
    refs: Vec<PackageRef>,
    versions_of: AHashMap<Arc<str>, BTreeSet<Version>>,
    explored: AHashSet<String>,
}

/// Persists built graphs as `{fingerprint}.pkl` files in a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path a fingerprint maps to.
    #[must_use]
    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.pkl", fingerprint.as_str()))
    }

    /// The store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the graph stored under a fingerprint.
    ///
    /// Returns `Ok(None)` when no snapshot exists.
    ///
    /// # Errors
    /// `Io` on filesystem failure, `Corrupt` when the file cannot be
    /// restored into a coherent graph.
    pub async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<PackageGraph>, SnapshotError> {
        let path = self.path_for(fingerprint);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SnapshotError::Io(e)),
        };

        let doc: SnapshotDoc =
            serde_json::from_slice(&bytes).map_err(|e| SnapshotError::Corrupt {
                message: e.to_string(),
            })?;

        let graph = PackageGraph::from_snapshot_fields(
            doc.requirements,
            doc.refs,
            doc.versions_of,
            doc.explored,
        )
        .ok_or_else(|| SnapshotError::Corrupt {
            message: "inconsistent ref arena".into(),
        })?;

        debug!(path = %path.display(), packages = graph.len(), "snapshot restored");
        Ok(Some(graph))
    }

    /// Write a snapshot of the graph under a fingerprint.
    ///
    /// # Errors
    /// `Io` on filesystem failure.
    pub async fn store(
        &self,
        fingerprint: &Fingerprint,
        graph: &PackageGraph,
    ) -> Result<(), SnapshotError> {
        let (requirements, refs, versions_of, explored) = graph.snapshot_fields();
        let doc = SnapshotDoc {
            requirements: requirements.clone(),
            refs: refs.clone(),
            versions_of: versions_of.clone(),
            explored: explored.clone(),
        };

        let bytes = serde_json::to_vec(&doc).map_err(|e| SnapshotError::Corrupt {
            message: e.to_string(),
        })?;

        let path = self.path_for(fingerprint);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), packages = graph.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    mod fingerprints {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn order_insensitive() {
            let forward = Fingerprint::for_month(2024, 6, &["alpha".into(), "beta".into()]);
            let reverse = Fingerprint::for_month(2024, 6, &["beta".into(), "alpha".into()]);
            assert_eq!(forward, reverse);
        }

        #[test]
        fn month_bucketed() {
            let requirements = vec!["alpha".into()];
            let june = Fingerprint::for_month(2024, 6, &requirements);
            let july = Fingerprint::for_month(2024, 7, &requirements);
            assert_ne!(june, july);
        }

        #[test]
        fn requirement_sensitive() {
            let alpha = Fingerprint::for_month(2024, 6, &["alpha".into()]);
            let beta = Fingerprint::for_month(2024, 6, &["beta".into()]);
            assert_ne!(alpha, beta);
        }

        #[test]
        fn hex_encoded_md5_length() {
            let fp = Fingerprint::for_month(2024, 6, &["alpha".into()]);
            assert_eq!(fp.as_str().len(), 32);
        }
    }

    mod store {
        use super::*;
        use pretty_assertions::assert_eq;

        fn sample_graph() -> PackageGraph {
            let mut graph = PackageGraph::new(vec!["alpha".into()]);
            let beta = graph.insert("beta", v("1.0.0"), vec![]).unwrap();
            graph.insert("alpha", v("1.0.0"), vec![beta]).unwrap();
            graph.mark_explored("alpha");
            graph.mark_explored("beta");
            graph
        }

        #[tokio::test]
        async fn roundtrip_preserves_all_four_fields() {
            let dir = tempfile::tempdir().unwrap();
            let store = SnapshotStore::new(dir.path());
            let fingerprint = Fingerprint::for_month(2024, 6, &["alpha".into()]);

            let graph = sample_graph();
            store.store(&fingerprint, &graph).await.unwrap();
            let restored = store.load(&fingerprint).await.unwrap().unwrap();

            assert_eq!(restored.requirements(), graph.requirements());
            assert_eq!(restored.len(), graph.len());
            assert!(restored.is_explored("alpha"));
            assert!(restored.is_explored("beta"));

            let alpha = restored.lookup("alpha", &v("1.0.0")).unwrap();
            let deps = restored.get(alpha).dependencies();
            assert_eq!(deps.len(), 1);
            assert_eq!(restored.get(deps[0]).key(), "beta::1.0.0");

            let versions: Vec<String> =
                restored.versions_of("beta").map(Version::to_string).collect();
            assert_eq!(versions, ["1.0.0"]);
        }

        #[tokio::test]
        async fn missing_snapshot_is_a_miss() {
            let dir = tempfile::tempdir().unwrap();
            let store = SnapshotStore::new(dir.path());
            let fingerprint = Fingerprint::for_month(2024, 6, &["alpha".into()]);
            assert!(store.load(&fingerprint).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn corrupt_snapshot_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let store = SnapshotStore::new(dir.path());
            let fingerprint = Fingerprint::for_month(2024, 6, &["alpha".into()]);

            tokio::fs::write(store.path_for(&fingerprint), b"garbage")
                .await
                .unwrap();

            let err = store.load(&fingerprint).await.unwrap_err();
            assert!(matches!(err, SnapshotError::Corrupt { .. }));
        }
    }
}
