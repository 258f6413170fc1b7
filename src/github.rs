//! GitHub access: raw response shapes, the source trait the aggregator calls
//! through, and its Octocrab-backed implementation.

use crate::config::AppConfig;
use crate::error::ContributionError;
use crate::types::{Category, CommentStream};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::header::{HeaderName, ACCEPT};
use http::Uri;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

/// Largest page the search and comment endpoints will return.
pub const PAGE_SIZE: u8 = 100;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// The `pull_request` stub attached to PR results of an issue search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// An issue or pull request as returned by `/search/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

impl SearchItem {
    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.login.as_str())
    }
}

/// Envelope of a single `/search/issues` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// An issue or review comment from one of the comment collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// Upstream operations the aggregator depends on.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Runs one issue search and returns its first page.
    async fn search_issues(
        &self,
        category: Category,
        query: &str,
    ) -> Result<SearchPage, ContributionError>;

    /// Fetches page `page` (1-based) of a user's comment stream.
    async fn comment_page(
        &self,
        stream: CommentStream,
        username: &str,
        page: u32,
    ) -> Result<Vec<RawComment>, ContributionError>;
}

#[derive(Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    per_page: u8,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

pub struct GitHubClient {
    octocrab: Octocrab,
    issue_comments_path: String,
    review_comments_path: String,
}

impl GitHubClient {
    pub fn new(config: &AppConfig) -> Result<Self, ContributionError> {
        let base_uri: Uri = config
            .github_api_base
            .parse()
            .map_err(|e: http::uri::InvalidUri| ContributionError::Client(e.to_string()))?;

        let octocrab = Octocrab::builder()
            .personal_token(config.github_token.clone())
            .base_uri(base_uri)
            .map_err(|e| ContributionError::Client(e.to_string()))?
            .add_header(ACCEPT, GITHUB_MEDIA_TYPE.to_string())
            .add_header(
                HeaderName::from_static("x-github-api-version"),
                GITHUB_API_VERSION.to_string(),
            )
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| ContributionError::Client(e.to_string()))?;

        Ok(Self {
            octocrab,
            issue_comments_path: config.issue_comments_path.clone(),
            review_comments_path: config.review_comments_path.clone(),
        })
    }

    fn comments_path(&self, stream: CommentStream, username: &str) -> String {
        let template = match stream {
            CommentStream::IssueComments => &self.issue_comments_path,
            CommentStream::ReviewComments => &self.review_comments_path,
        };
        template.replace("{username}", username)
    }
}

#[async_trait]
impl ContributionSource for GitHubClient {
    async fn search_issues(
        &self,
        category: Category,
        query: &str,
    ) -> Result<SearchPage, ContributionError> {
        let params = SearchParams {
            q: query,
            per_page: PAGE_SIZE,
        };

        self.octocrab
            .get::<SearchPage, _, _>("/search/issues", Some(&params))
            .await
            .map_err(|e| map_search_error(category, &e))
    }

    async fn comment_page(
        &self,
        stream: CommentStream,
        username: &str,
        page: u32,
    ) -> Result<Vec<RawComment>, ContributionError> {
        let params = PageParams {
            per_page: PAGE_SIZE,
            page,
        };

        self.octocrab
            .get::<Vec<RawComment>, _, _>(self.comments_path(stream, username), Some(&params))
            .await
            .map_err(|e| ContributionError::CommentPageFailed {
                stream,
                page,
                message: upstream_message(&e).unwrap_or_else(|| e.to_string()),
            })
    }
}

/// Pulls the `message` field out of a GitHub error response, if there was one.
fn upstream_message(error: &octocrab::Error) -> Option<String> {
    match error {
        octocrab::Error::GitHub { source, .. } if !source.message.is_empty() => {
            Some(source.message.clone())
        }
        _ => None,
    }
}

fn map_search_error(category: Category, error: &octocrab::Error) -> ContributionError {
    tracing::error!(%category, "Search request failed: {}", error);

    let status = match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    };

    ContributionError::SearchFailed {
        category,
        status,
        message: upstream_message(error)
            .unwrap_or_else(|| category.default_error_message().to_string()),
    }
}
