//! Error types for docmodules.
//!
//! Library crates use [`DocModulesError`] via `thiserror`. The public pipeline
//! contracts (crawl, process, extract, validate) absorb these errors locally
//! and degrade; they surface only from configuration and internal helpers.

use std::path::PathBuf;

/// Top-level error type for all docmodules operations.
#[derive(Debug, thiserror::Error)]
pub enum DocModulesError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during crawl or a service call.
    #[error("network error: {0}")]
    Network(String),

    /// HTML, JSON, or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The text-generation service reported a rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The text-generation service returned a non-rate-limit failure.
    #[error("service error: {0}")]
    Service(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocModulesError>;

impl DocModulesError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a retry should use exponential backoff rather than a fixed delay.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Whether the failure is worth retrying at all.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Service(_) | Self::Network(_)
        )
    }
}
