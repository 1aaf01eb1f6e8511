//! Error types for docmirror-core operations.
//!
//! Only run-level failures are represented here: a sitemap that cannot be
//! fetched, a sitemap that cannot be parsed, or a configuration that does not
//! validate. Per-document download failures are not errors; they are recorded
//! as [`FailureReason`](crate::download::FailureReason) values in the
//! [`DownloadReport`](crate::download::DownloadReport) so a run can continue
//! past them.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading configuration files, creating output directories
//! - **Network Errors**: transport failures talking to the documentation host
//! - **Fetch Errors**: the host answered with a non-success status
//! - **Parse Errors**: the sitemap is not well-formed sitemap XML
//! - **Configuration Errors**: invalid site definitions or settings

use thiserror::Error;

/// The main error type for docmirror-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure (DNS, connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("Fetch error: {url} returned HTTP {status}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// HTTP status code of the response.
        status: u16,
    },

    /// The sitemap body is not well-formed or lacks the expected elements.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is missing required values or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether a later attempt might succeed without any local change.
    ///
    /// Nothing in docmirror retries automatically; callers use this to decide
    /// how to word their report.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Fetch { status, .. } => *status >= 500 || *status == 429,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Short, stable category name for logs and exit-code mapping.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Fetch { .. } => "fetch",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience alias for results produced by docmirror-core.
pub type Result<T> = std::result::Result<T, Error>;
