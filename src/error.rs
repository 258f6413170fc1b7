//! Error types for configuration loading and contribution aggregation.

use crate::types::{Category, CommentStream};
use thiserror::Error;

/// Problems detected while loading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `GITHUB_TOKEN` is absent or blank.
    #[error("missing GITHUB_TOKEN in environment")]
    MissingCredential,

    /// The environment could not be deserialized.
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),

    /// `MAX_COMMENT_PAGES` must allow at least one page.
    #[error("MAX_COMMENT_PAGES must be at least 1")]
    ZeroMaxCommentPages,

    /// `GITHUB_API_BASE` is not a valid URI.
    #[error("invalid GITHUB_API_BASE {value:?}: {reason}")]
    InvalidApiBase { value: String, reason: String },
}

/// Failures raised while assembling a contribution report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContributionError {
    /// A search-backed category could not be fetched. Aborts the report.
    #[error("{message}")]
    SearchFailed {
        category: Category,
        /// Upstream HTTP status, when the failure came from a response.
        status: Option<u16>,
        message: String,
    },

    /// A comment page could not be fetched. Ends that stream early.
    #[error("{stream} page {page} failed: {message}")]
    CommentPageFailed {
        stream: CommentStream,
        page: u32,
        message: String,
    },

    /// A fetch task panicked or was cancelled by the runtime.
    #[error("contribution task aborted: {0}")]
    TaskAborted(String),

    /// The upstream client could not be constructed.
    #[error("GitHub client error: {0}")]
    Client(String),
}
