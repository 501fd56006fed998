//! Recursive discovery of the dependency graph.

use crate::error::{GraphError, Result};
use crate::graph::PackageGraph;
use crate::package::RefId;
use crate::snapshot::{Fingerprint, SnapshotStore};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wheelwright_core::{Requirement, Version};
use wheelwright_index::PackageIndex;

/// Graph builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// How many of the newest releases to explore per package. Bounds the
    /// combinatorial growth of the graph.
    pub top: usize,
    /// Whether to consult and refresh the snapshot store.
    pub use_cache: bool,
    /// Directory snapshots are written to.
    pub snapshot_dir: PathBuf,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            top: 10,
            use_cache: true,
            snapshot_dir: PathBuf::from("."),
        }
    }
}

/// Walks the package index from a list of bare requirement names and
/// produces a [`PackageGraph`].
///
/// Discovery is permissive: an unreachable package or release is dropped
/// with a warning and the walk continues. Cycles terminate because a name
/// is marked explored before its first index request is issued; along a
/// cycle boundary the later-completed node only sees the versions inserted
/// up to that point.
pub struct GraphBuilder<I> {
    index: Arc<I>,
    config: BuilderConfig,
    snapshots: SnapshotStore,
}

impl<I> std::fmt::Debug for GraphBuilder<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<I: PackageIndex> GraphBuilder<I> {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new(index: Arc<I>) -> Self {
        Self::with_config(index, BuilderConfig::default())
    }

    /// Create a builder with custom configuration.
    #[must_use]
    pub fn with_config(index: Arc<I>, config: BuilderConfig) -> Self {
        let snapshots = SnapshotStore::new(config.snapshot_dir.clone());
        Self {
            index,
            config,
            snapshots,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build the dependency graph for a list of bare package names.
    ///
    /// Consults the snapshot store first when caching is enabled; on a miss
    /// the index is walked to fixpoint and a fresh snapshot is written.
    ///
    /// # Errors
    /// Only caller mistakes fail a build: an empty requirement list or a
    /// blank name. Index failures degrade the graph instead.
    pub async fn build(&self, requirements: &[String]) -> Result<PackageGraph> {
        if requirements.is_empty() {
            return Err(GraphError::InvalidRequirements {
                message: "requirement list is empty".into(),
            });
        }
        if requirements.iter().any(|name| name.trim().is_empty()) {
            return Err(GraphError::InvalidRequirements {
                message: "requirement names must be non-empty".into(),
            });
        }

        let fingerprint = Fingerprint::now(requirements);
        if self.config.use_cache {
            match self.snapshots.load(&fingerprint).await {
                Ok(Some(graph)) => {
                    info!(
                        fingerprint = %fingerprint,
                        packages = graph.len(),
                        "graph restored from snapshot"
                    );
                    return Ok(graph);
                }
                Ok(None) => debug!(fingerprint = %fingerprint, "no snapshot for this month"),
                Err(e) => {
                    warn!(fingerprint = %fingerprint, error = %e, "snapshot unusable; rebuilding");
                }
            }
        }

        let mut graph = PackageGraph::new(requirements.to_vec());
        for name in requirements {
            self.explore(&mut graph, name).await;
        }
        info!(packages = graph.len(), "graph discovery complete");

        if let Err(e) = self.snapshots.store(&fingerprint, &graph).await {
            warn!(fingerprint = %fingerprint, error = %e, "failed to write snapshot");
        }

        Ok(graph)
    }

    /// Discover one package: enumerate its newest releases, recurse into
    /// their requirements, and seal one ref per release.
    ///
    /// Boxed because the recursion depth follows the dependency chains.
    fn explore<'a>(
        &'a self,
        graph: &'a mut PackageGraph,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            // Mark before the first request so cycles cut off here.
            if graph.is_explored(name) {
                return;
            }
            graph.mark_explored(name);
            debug!(package = %name, "exploring package");

            let project = match self.index.latest_info(name).await {
                Ok(document) => document,
                Err(e) => {
                    warn!(package = %name, error = %e, "project fetch failed; skipping package");
                    return;
                }
            };

            let mut releases: Vec<(Version, String)> = project
                .releases
                .keys()
                .filter(|key| Version::is_release(key))
                .filter_map(|key| Version::parse(key).map(|version| (version, key.clone())))
                .collect();
            releases.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            let skip = releases.len().saturating_sub(self.config.top);

            for (version, raw_key) in releases.into_iter().skip(skip) {
                let release = match self.index.release_info(name, &raw_key).await {
                    Ok(document) => document,
                    Err(e) => {
                        warn!(
                            package = %name,
                            version = %raw_key,
                            error = %e,
                            "release fetch failed; dropping version"
                        );
                        continue;
                    }
                };

                let mut parsed: Vec<Requirement> = Vec::new();
                for fragment in release.info.requires_dist.as_deref().unwrap_or_default() {
                    match Requirement::parse(fragment) {
                        Some(requirement) => parsed.push(requirement),
                        None => {
                            warn!(
                                package = %name,
                                fragment = %fragment,
                                "skipping unparseable requirement fragment"
                            );
                        }
                    }
                }

                let mut dependencies: Vec<RefId> = Vec::new();
                for requirement in &parsed {
                    // Discover the sub-requirement before resolving its
                    // range, so candidate refs exist when versions are
                    // filtered. Along a cycle this sees only what has been
                    // inserted so far.
                    self.explore(graph, &requirement.name).await;

                    let candidates: Vec<Version> =
                        graph.versions_of(&requirement.name).cloned().collect();
                    for candidate in candidates {
                        if requirement.range.contains(&candidate)
                            && let Some(id) = graph.lookup(&requirement.name, &candidate)
                        {
                            dependencies.push(id);
                        }
                    }
                }

                // Raw keys like "1.2" and "1.2.0" canonicalize to one node.
                if graph.contains(name, &version) {
                    continue;
                }
                if let Err(e) = graph.insert(name, version, dependencies) {
                    warn!(package = %name, error = %e, "failed to seal package ref");
                }
            }
        })
    }
}
