//! Conversion of raw GitHub records into [`ContributionItem`]s.

use crate::github::{RawComment, SearchItem};
use crate::types::{Category, ContributionItem, DateRange, UNKNOWN_REPO};
use regex::Regex;
use std::sync::LazyLock;

const COMMENT_TITLE_CHARS: usize = 80;
const COMMENT_TITLE_SUFFIX: &str = "...";

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)/").expect("repository pattern is valid")
});

/// Extracts `owner/name` from a GitHub web URL.
pub fn repo_from_url(url: &str) -> String {
    REPO_PATTERN
        .captures(url)
        .map(|caps| format!("{}/{}", &caps[1], &caps[2]))
        .unwrap_or_else(|| UNKNOWN_REPO.to_string())
}

/// Builds a title from a comment body: first 80 characters, newlines flattened,
/// always followed by `...`.
pub fn comment_title(body: &str) -> String {
    let flattened = body.replace("\r\n", "\n").replace('\n', " ");
    let mut title: String = flattened.chars().take(COMMENT_TITLE_CHARS).collect();
    title.push_str(COMMENT_TITLE_SUFFIX);
    title
}

pub fn normalize_search_item(category: Category, item: &SearchItem) -> ContributionItem {
    // Search results report the merge time under `pull_request`; older payloads only
    // carry `closed_at`, which is the merge time for merged PRs.
    let merged_at = item
        .pull_request
        .as_ref()
        .and_then(|pr| pr.merged_at)
        .or(match category {
            Category::Merged => item.closed_at,
            _ => None,
        });

    ContributionItem {
        title: item.title.clone(),
        url: item.html_url.clone(),
        created_at: item.created_at,
        merged_at,
        closed_at: item.closed_at,
        repo: Some(repo_from_url(&item.html_url)),
    }
}

pub fn normalize_comment(comment: &RawComment) -> ContributionItem {
    ContributionItem {
        title: comment_title(comment.body.as_deref().unwrap_or_default()),
        url: comment.html_url.clone(),
        created_at: Some(comment.created_at),
        merged_at: None,
        closed_at: None,
        repo: Some(repo_from_url(&comment.html_url)),
    }
}

/// Keeps comments created inside `range` and normalizes them, preserving order.
pub fn comments_in_range(comments: &[RawComment], range: &DateRange) -> Vec<ContributionItem> {
    comments
        .iter()
        .filter(|comment| range.contains(comment.created_at))
        .map(normalize_comment)
        .collect()
}
