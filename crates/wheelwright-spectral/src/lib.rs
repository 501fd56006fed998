//! Structural analysis of resolved dependency graphs.
//!
//! [`AdjacencyView`] projects a [`wheelwright_graph::PackageGraph`] onto a
//! dense `{0,1}` adjacency matrix at a stable lexicographic vertex
//! ordering. [`SpectralView`] derives the degree matrix, Laplacian,
//! eigendecomposition, and accumulated n-hop connectivity matrices from it.
//!
//! This is a diagnostic facility: the numerics stay behind a thin seam so
//! the rest of the workspace depends only on sorted eigenpairs and matrix
//! multiplication.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod adjacency;
mod error;
mod spectral;

pub use adjacency::AdjacencyView;
pub use error::SpectralError;
pub use spectral::{Eigendecomposition, HopConnectivity, SpectralView};
