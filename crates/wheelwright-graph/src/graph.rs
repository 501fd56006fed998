//! The package graph arena.

use crate::error::{GraphError, Result};
use crate::package::{PackageRef, RefId, package_key};
use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use wheelwright_core::Version;

/// The resolved dependency graph.
///
/// Owns every [`PackageRef`] in an arena; all cross-references are
/// [`RefId`] handles into that arena. After the builder returns, the graph
/// is immutable and freely shareable with readers.
///
/// Invariants maintained by [`PackageGraph::insert`]:
/// - keys (`"{name}::{version}"`) are unique;
/// - every dependency handle of an inserted ref already points into the
///   arena (no dangling nodes);
/// - `versions_of[name]` is exactly the set of versions of the refs named
///   `name`.
#[derive(Debug, Default)]
pub struct PackageGraph {
    requirements: Vec<String>,
    refs: Vec<PackageRef>,
    by_key: AHashMap<Arc<str>, RefId>,
    versions_of: AHashMap<Arc<str>, BTreeSet<Version>>,
    explored: AHashSet<String>,
}

impl PackageGraph {
    /// Create an empty graph seeded with the initial requirement names.
    #[must_use]
    pub fn new(requirements: Vec<String>) -> Self {
        Self {
            requirements,
            ..Default::default()
        }
    }

    /// Seal a new ref into the arena.
    ///
    /// The dependency list is sorted by target `(name, version)` and
    /// deduplicated before sealing.
    ///
    /// # Errors
    /// `DuplicateKey` if a ref with the same `(name, version)` already
    /// exists; `DanglingDependency` if any handle does not point into the
    /// arena.
    pub fn insert(
        &mut self,
        name: &str,
        version: Version,
        dependencies: Vec<RefId>,
    ) -> Result<RefId> {
        let key = package_key(name, &version);
        if self.by_key.contains_key(key.as_str()) {
            return Err(GraphError::DuplicateKey { key });
        }
        if let Some(dangling) = dependencies.iter().find(|d| d.index() >= self.refs.len()) {
            return Err(GraphError::DanglingDependency {
                key,
                index: dangling.0,
            });
        }

        let mut dependencies: SmallVec<[RefId; 8]> = dependencies.into();
        dependencies.sort_by(|a, b| {
            let (left, right) = (&self.refs[a.index()], &self.refs[b.index()]);
            left.name()
                .cmp(right.name())
                .then_with(|| left.version().cmp(right.version()))
        });
        dependencies.dedup();

        // Reuse the interned name when other versions of the package exist.
        let name: Arc<str> = self
            .versions_of
            .get_key_value(name)
            .map_or_else(|| Arc::from(name), |(interned, _)| Arc::clone(interned));

        let id = RefId(self.refs.len() as u32);
        let sealed = PackageRef::new(Arc::clone(&name), version.clone(), dependencies);
        let key: Arc<str> = Arc::from(sealed.key());

        self.refs.push(sealed);
        self.by_key.insert(Arc::clone(&key), id);
        self.versions_of.entry(name).or_default().insert(version);

        debug!("Added {key}");
        Ok(id)
    }

    /// Resolve a handle to its ref.
    ///
    /// # Panics
    /// Panics if the handle was not issued by this graph.
    #[must_use]
    pub fn get(&self, id: RefId) -> &PackageRef {
        &self.refs[id.index()]
    }

    /// Whether a handle points into this graph's arena.
    #[must_use]
    pub fn contains_id(&self, id: RefId) -> bool {
        id.index() < self.refs.len()
    }

    /// Look up a ref by its identity key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<RefId> {
        self.by_key.get(key).copied()
    }

    /// Look up a ref by name and version.
    #[must_use]
    pub fn lookup(&self, name: &str, version: &Version) -> Option<RefId> {
        self.by_key(&package_key(name, version))
    }

    /// Whether a ref with this name and version exists.
    #[must_use]
    pub fn contains(&self, name: &str, version: &Version) -> bool {
        self.lookup(name, version).is_some()
    }

    /// The versions seen for a name, ascending.
    pub fn versions_of(&self, name: &str) -> impl Iterator<Item = &Version> {
        self.versions_of.get(name).into_iter().flatten()
    }

    /// Handles of every ref with the given name, ascending by version.
    #[must_use]
    pub fn ids_of_name(&self, name: &str) -> Vec<RefId> {
        self.versions_of(name)
            .filter_map(|version| self.lookup(name, version))
            .collect()
    }

    /// Iterate over all refs with their handles, in arena order.
    pub fn refs(&self) -> impl Iterator<Item = (RefId, &PackageRef)> {
        self.refs
            .iter()
            .enumerate()
            .map(|(i, r)| (RefId(i as u32), r))
    }

    /// All distinct package names in the graph.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.versions_of.keys().map(AsRef::as_ref)
    }

    /// Number of refs in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether the graph holds no refs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The requirement names the graph was built from.
    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    /// Whether index discovery has been initiated for a name.
    #[must_use]
    pub fn is_explored(&self, name: &str) -> bool {
        self.explored.contains(name)
    }

    pub(crate) fn mark_explored(&mut self, name: &str) {
        self.explored.insert(name.to_string());
    }

    pub(crate) fn snapshot_fields(
        &self,
    ) -> (
        &Vec<String>,
        &Vec<PackageRef>,
        &AHashMap<Arc<str>, BTreeSet<Version>>,
        &AHashSet<String>,
    ) {
        (
            &self.requirements,
            &self.refs,
            &self.versions_of,
            &self.explored,
        )
    }

    pub(crate) fn from_snapshot_fields(
        requirements: Vec<String>,
        refs: Vec<PackageRef>,
        versions_of: AHashMap<Arc<str>, BTreeSet<Version>>,
        explored: AHashSet<String>,
    ) -> Option<Self> {
        let mut by_key: AHashMap<Arc<str>, RefId> = AHashMap::with_capacity(refs.len());
        for (i, r) in refs.iter().enumerate() {
            if r.dependencies().iter().any(|d| d.index() >= refs.len()) {
                return None;
            }
            let previous = by_key.insert(Arc::from(r.key()), RefId(i as u32));
            if previous.is_some() {
                return None;
            }
        }
        Some(Self {
            requirements,
            refs,
            by_key,
            versions_of,
            explored,
        })
    }
}
