//! In-memory package index with failure injection.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use wheelwright_index::{
    IndexError, PackageIndex, ProjectDocument, ReleaseDocument, ReleaseInfo, Result,
};

/// An in-memory [`PackageIndex`] for builder tests.
///
/// Register projects and releases up front, then hand the index to a
/// builder. Unregistered names answer not-found, like the real index;
/// names marked broken fail with a transport error. Every fetch is
/// counted so tests can assert on exploration behavior.
#[derive(Debug, Default)]
pub struct MockIndex {
    projects: DashMap<String, Vec<String>>,
    requires: DashMap<(String, String), Vec<String>>,
    broken: DashSet<String>,
    latest_calls: DashMap<String, u64>,
    release_calls: DashMap<(String, String), u64>,
}

impl MockIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project with dependency-free releases.
    pub fn add_project(&self, name: &str, releases: &[&str]) {
        self.projects
            .entry(name.to_string())
            .or_default()
            .extend(releases.iter().map(ToString::to_string));
    }

    /// Register one release with its requirement fragments, adding it to
    /// the project document as needed.
    pub fn add_release(&self, name: &str, version: &str, requires_dist: &[&str]) {
        let mut releases = self.projects.entry(name.to_string()).or_default();
        if !releases.iter().any(|key| key == version) {
            releases.push(version.to_string());
        }
        drop(releases);

        self.requires.insert(
            (name.to_string(), version.to_string()),
            requires_dist.iter().map(ToString::to_string).collect(),
        );
    }

    /// Make every fetch of this name fail with a transport error.
    pub fn set_broken(&self, name: &str) {
        self.broken.insert(name.to_string());
    }

    /// How many times the project document of `name` was fetched.
    #[must_use]
    pub fn latest_calls(&self, name: &str) -> u64 {
        self.latest_calls.get(name).map_or(0, |count| *count)
    }

    /// How many times a release document was fetched.
    #[must_use]
    pub fn release_calls(&self, name: &str, version: &str) -> u64 {
        self.release_calls
            .get(&(name.to_string(), version.to_string()))
            .map_or(0, |count| *count)
    }

    fn check_broken(&self, name: &str) -> Result<()> {
        if self.broken.contains(name) {
            return Err(IndexError::Network {
                url: format!("mock://{name}"),
                message: "injected transport failure".into(),
                status: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PackageIndex for MockIndex {
    async fn latest_info(&self, name: &str) -> Result<ProjectDocument> {
        *self.latest_calls.entry(name.to_string()).or_default() += 1;
        self.check_broken(name)?;

        let releases = self
            .projects
            .get(name)
            .ok_or_else(|| IndexError::NotFound {
                name: name.to_string(),
                version: None,
            })?;

        Ok(ProjectDocument {
            releases: releases
                .iter()
                .map(|key| (key.clone(), sonic_rs::Value::default()))
                .collect(),
        })
    }

    async fn release_info(&self, name: &str, version: &str) -> Result<ReleaseDocument> {
        *self
            .release_calls
            .entry((name.to_string(), version.to_string()))
            .or_default() += 1;
        self.check_broken(name)?;

        let known = self
            .projects
            .get(name)
            .is_some_and(|releases| releases.iter().any(|key| key == version));
        if !known {
            return Err(IndexError::NotFound {
                name: name.to_string(),
                version: Some(version.to_string()),
            });
        }

        let requires_dist = self
            .requires
            .get(&(name.to_string(), version.to_string()))
            .map(|fragments| fragments.value().clone());

        Ok(ReleaseDocument {
            info: ReleaseInfo {
                name: Some(name.to_string()),
                version: Some(version.to_string()),
                requires_dist,
            },
        })
    }
}
