//! Solver result and error types.

use thiserror::Error;
use wheelwright_graph::{PackageGraph, PackageRef, RefId};

/// A name-unique, dependency-closed set of refs.
///
/// Produced by the solver, immutable afterwards. Members are handles into
/// the graph the solver ran against, sorted by key; the set is only
/// meaningful together with that graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilitySet {
    members: Vec<RefId>,
}

impl CompatibilitySet {
    pub(crate) fn new(members: Vec<RefId>) -> Self {
        Self { members }
    }

    /// Member handles, sorted by key.
    #[must_use]
    pub fn members(&self) -> &[RefId] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Resolve the members against their graph.
    pub fn resolve<'g>(&self, graph: &'g PackageGraph) -> impl Iterator<Item = &'g PackageRef> {
        self.members.iter().map(|&id| graph.get(id))
    }

    /// The member carrying a given package name, if any.
    #[must_use]
    pub fn get<'g>(&self, graph: &'g PackageGraph, name: &str) -> Option<&'g PackageRef> {
        self.resolve(graph).find(|r| r.name() == name)
    }

    /// Member keys, sorted.
    #[must_use]
    pub fn keys(&self, graph: &PackageGraph) -> Vec<String> {
        self.resolve(graph).map(|r| r.key().to_string()).collect()
    }
}

/// Errors that can occur setting up a solve.
///
/// These are caller mistakes; the enumeration itself cannot fail, it can
/// only come back empty.
#[derive(Debug, Error)]
pub enum SolveError {
    /// No required refs were given.
    #[error("no required packages were given")]
    NoRequirements,

    /// A required handle does not belong to the graph.
    #[error("required ref {handle} is not part of the graph")]
    UnknownRef {
        /// The foreign handle.
        handle: RefId,
    },
}
