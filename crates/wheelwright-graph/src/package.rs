//! Package nodes and their arena handles.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use wheelwright_core::Version;

/// Canonical string identity of a package at a version.
#[must_use]
pub fn package_key(name: &str, version: &Version) -> String {
    format!("{name}::{version}")
}

/// Handle to a [`PackageRef`] inside its owning graph's arena.
///
/// Handles are only meaningful for the graph that issued them. Dependency
/// lists hold handles instead of references, which keeps graph-level cycles
/// representable without ownership cycles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RefId(pub(crate) u32);

impl RefId {
    /// Arena slot index.
    #[must_use]
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A package at a specific version, with its resolved direct dependencies.
///
/// Refs are immutable once sealed into a graph. Two refs are equal iff
/// their `(name, version)` pair matches; the dependency list does not take
/// part in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRef {
    name: Arc<str>,
    version: Version,
    key: Arc<str>,
    dependencies: SmallVec<[RefId; 8]>,
}

impl PackageRef {
    /// Seal a ref. Only the owning graph constructs these, after the
    /// dependency list has been sorted and deduplicated.
    pub(crate) fn new(
        name: Arc<str>,
        version: Version,
        dependencies: SmallVec<[RefId; 8]>,
    ) -> Self {
        let key: Arc<str> = Arc::from(package_key(&name, &version));
        Self {
            name,
            version,
            key,
            dependencies,
        }
    }

    /// Package name, case-preserved as received from the index.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical version.
    #[must_use]
    #[inline]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// The `"{name}::{version}"` identity string.
    #[must_use]
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Direct dependency handles, sorted by target `(name, version)` and
    /// deduplicated.
    #[must_use]
    #[inline]
    pub fn dependencies(&self) -> &[RefId] {
        &self.dependencies
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl PartialEq for PackageRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PackageRef {}

impl Hash for PackageRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        let version = Version::parse("1.2").unwrap();
        assert_eq!(package_key("alpha", &version), "alpha::1.2.0");
    }

    #[test]
    fn identity_ignores_dependencies() {
        let version = Version::parse("1.0.0").unwrap();
        let bare = PackageRef::new(Arc::from("alpha"), version.clone(), SmallVec::new());
        let mut deps = SmallVec::new();
        deps.push(RefId(0));
        let with_deps = PackageRef::new(Arc::from("alpha"), version, deps);
        assert_eq!(bare, with_deps);
    }
}
