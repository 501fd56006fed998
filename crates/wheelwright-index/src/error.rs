//! Error types for package index access.

use thiserror::Error;

/// Result alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while talking to the package index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index has no such package, or no such release of it.
    #[error("package not found: {name}{}", .version.as_deref().map(|v| format!(" ({v})")).unwrap_or_default())]
    NotFound {
        /// Package name.
        name: String,
        /// Release version, when the miss was version-specific.
        version: Option<String>,
    },

    /// Transport-level failure (connection, timeout, non-success status).
    #[error("network error for {url}: {message}")]
    Network {
        /// The request URL.
        url: String,
        /// Error message.
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// The index answered with a body that could not be decoded.
    #[error("decode error for {url}: {message}")]
    Decode {
        /// The request URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// A request URL could not be constructed.
    #[error("invalid url {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Client construction or configuration failure.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl IndexError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Connection failures and server errors are transient; not-found,
    /// decode failures, and client errors are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }
}
