//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a `.env` file by the
//! binary). The GitHub credential is mandatory: a process without it refuses to start.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// Output format for the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Personal access token sent as a bearer credential on every upstream call.
    #[serde(default)]
    pub github_token: String,

    /// Root of the GitHub REST API.
    #[serde(default = "default_api_base")]
    pub github_api_base: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the issue comment collection. `{username}` is substituted per request.
    #[serde(default = "default_issue_comments_path")]
    pub issue_comments_path: String,

    /// Path of the review comment collection. `{username}` is substituted per request.
    #[serde(default = "default_review_comments_path")]
    pub review_comments_path: String,

    /// Upper bound on pages read from a single comment stream.
    #[serde(default = "default_max_comment_pages")]
    pub max_comment_pages: u32,

    /// Directory that saved markdown reports are appended to.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_issue_comments_path() -> String {
    "/users/{username}/issues/comments".to_string()
}

fn default_review_comments_path() -> String {
    "/users/{username}/pulls/comments".to_string()
}

fn default_max_comment_pages() -> u32 {
    50
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: AppConfig = envy::from_env()?;
        config.validate()
    }

    /// Builds a configuration with defaults for everything but the token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            github_token: token.into(),
            github_api_base: default_api_base(),
            port: default_port(),
            issue_comments_path: default_issue_comments_path(),
            review_comments_path: default_review_comments_path(),
            max_comment_pages: default_max_comment_pages(),
            downloads_dir: default_downloads_dir(),
            log_format: LogFormat::default(),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.github_token.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if self.max_comment_pages == 0 {
            return Err(ConfigError::ZeroMaxCommentPages);
        }
        if let Err(e) = self.github_api_base.parse::<http::Uri>() {
            return Err(ConfigError::InvalidApiBase {
                value: self.github_api_base,
                reason: e.to_string(),
            });
        }
        Ok(self)
    }
}
