//! Error types for graph construction.

use thiserror::Error;

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur during graph construction.
///
/// Discovery itself is permissive (a partial graph is preferred over
/// failure); these errors cover caller mistakes and arena invariant
/// violations only.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The requirement list cannot seed a build.
    #[error("invalid requirements: {message}")]
    InvalidRequirements {
        /// What was wrong with the input.
        message: String,
    },

    /// A node with this key is already in the graph.
    #[error("duplicate package key: {key}")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// A dependency handle does not point into the graph arena.
    #[error("dangling dependency handle {index} while inserting {key}")]
    DanglingDependency {
        /// The key being inserted.
        key: String,
        /// The out-of-range handle.
        index: u32,
    },
}
