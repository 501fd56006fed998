//! Compatibility set enumeration over a resolved package graph.
//!
//! Given the refs the caller requires and the graph they live in, the
//! [`CombinationSolver`] enumerates every internally consistent assignment
//! of one version per package name, by depth-first backtracking over choice
//! points. The solver is strict where the graph builder is permissive: it
//! emits only well-formed [`CompatibilitySet`]s, never partial assignments.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod solver;
mod types;

pub use solver::CombinationSolver;
pub use types::{CompatibilitySet, SolveError};
