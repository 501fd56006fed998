//! Testing utilities for Wheelwright.
//!
//! - [`MockIndex`]: an in-memory [`wheelwright_index::PackageIndex`] with
//!   failure injection and call counting, for builder tests that need full
//!   control over index behavior.
//! - [`MockPyPi`]: a wiremock-backed index speaking the real HTTP wire
//!   format, for end-to-end client tests.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod mock_index;
mod mock_pypi;

pub use mock_index::MockIndex;
pub use mock_pypi::MockPyPi;

/// Install an env-filtered subscriber so test runs can surface tracing
/// output via `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
