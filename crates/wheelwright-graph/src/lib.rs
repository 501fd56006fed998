//! Dependency graph discovery for the Wheelwright resolver.
//!
//! The [`GraphBuilder`] walks a package index from a list of bare
//! requirement names, parses each release's declared dependency fragments,
//! and produces an immutable [`PackageGraph`]: an arena of
//! (name, version) nodes whose dependency lists reference other nodes by
//! handle. Graph-level cycles are permitted; ownership-level cycles are
//! impossible because a node is sealed only after its dependency list is
//! final.
//!
//! Built graphs can be persisted through [`SnapshotStore`] under a
//! month-bucketed [`Fingerprint`] of the requirement list.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod builder;
mod error;
mod graph;
mod package;
mod snapshot;

pub use builder::{BuilderConfig, GraphBuilder};
pub use error::{GraphError, Result};
pub use graph::PackageGraph;
pub use package::{PackageRef, RefId, package_key};
pub use snapshot::{Fingerprint, SnapshotError, SnapshotStore};
