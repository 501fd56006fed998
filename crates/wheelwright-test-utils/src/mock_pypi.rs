//! HTTP mock server speaking the package index wire format.

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock PyPI server for end-to-end client and builder tests.
#[derive(Debug)]
pub struct MockPyPi {
    server: MockServer,
}

impl MockPyPi {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock server, without a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Register a project document listing the given release keys.
    pub async fn project(&self, name: &str, releases: &[&str]) {
        let release_map: serde_json::Map<String, Value> = releases
            .iter()
            .map(|key| ((*key).to_string(), json!([])))
            .collect();

        self.project_raw(name, json!({ "releases": release_map }))
            .await;
    }

    /// Register a project document with an explicit JSON body.
    pub async fn project_raw(&self, name: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/pypi/{name}/json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Register a release document with its requirement fragments.
    pub async fn release(&self, name: &str, version: &str, requires_dist: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("/pypi/{name}/{version}/json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "info": {
                    "name": name,
                    "version": version,
                    "requires_dist": requires_dist,
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Register a package whose releases declare no dependencies.
    pub async fn package(&self, name: &str, versions: &[&str]) {
        self.project(name, versions).await;
        for version in versions {
            self.release(name, version, &[]).await;
        }
    }
}
