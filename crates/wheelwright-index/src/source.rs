//! The abstract package index contract.

use crate::documents::{ProjectDocument, ReleaseDocument};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for package index backends.
///
/// Implement this trait to provide release metadata from different sources
/// (the live index, a recorded fixture, an in-memory mock). Both operations
/// are suspension points; implementations must be shareable across tasks.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Fetch the project document for a package, enumerating its releases.
    ///
    /// # Errors
    /// `NotFound` when the index has no such package; `Network`/`Decode`
    /// on transport or body failures.
    async fn latest_info(&self, name: &str) -> Result<ProjectDocument>;

    /// Fetch the release document for one version of a package.
    ///
    /// # Errors
    /// `NotFound` when the release is gone; `Network`/`Decode` on transport
    /// or body failures.
    async fn release_info(&self, name: &str, version: &str) -> Result<ReleaseDocument>;
}
