//! Package index access for the Wheelwright resolver.
//!
//! This crate talks to a PyPI-style package index over HTTPS and exposes it
//! behind the [`PackageIndex`] trait so the graph builder never depends on a
//! concrete transport. Two documents are consumed:
//!
//! - the project document (`/pypi/{name}/json`), of which only the
//!   `releases` keys are enumerated;
//! - the release document (`/pypi/{name}/{version}/json`), of which only
//!   `info.requires_dist` is read.
//!
//! The HTTP layer carries timeouts, exponential-backoff retry for transient
//! failures, and request statistics.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod documents;
mod error;
mod pypi;
mod source;

pub use client::{HttpClient, HttpClientConfig, HttpClientStats, HttpResponse};
pub use documents::{ProjectDocument, ReleaseDocument, ReleaseInfo};
pub use error::{IndexError, Result};
pub use pypi::{PYPI_URL, PyPiClient, PyPiConfig, PyPiStats};
pub use source::PackageIndex;
