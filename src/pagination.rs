//! Page-number pagination over the comment collections.

use crate::error::ContributionError;
use crate::github::{ContributionSource, RawComment, PAGE_SIZE};
use crate::types::CommentStream;

/// Everything read from one comment stream.
#[derive(Debug, Default)]
pub struct CommentPages {
    pub comments: Vec<RawComment>,
    /// Number of page requests issued, including a failed final one.
    pub pages_requested: u32,
    /// The failure that ended the stream early, if any.
    pub interrupted_by: Option<ContributionError>,
}

/// Reads pages 1, 2, ... of `stream` until a short page, a failed page, or `max_pages`.
///
/// Pages are requested one at a time since each request depends on whether the
/// previous page was full. A failed page is not fatal: the comments gathered so
/// far are returned along with the error.
pub async fn collect_comment_pages<S>(
    source: &S,
    stream: CommentStream,
    username: &str,
    max_pages: u32,
) -> CommentPages
where
    S: ContributionSource + ?Sized,
{
    let mut pages = CommentPages::default();
    let mut hit_page_limit = true;

    for page in 1..=max_pages {
        pages.pages_requested = page;

        match source.comment_page(stream, username, page).await {
            Ok(batch) => {
                let short = batch.len() < usize::from(PAGE_SIZE);
                pages.comments.extend(batch);
                if short {
                    hit_page_limit = false;
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(%stream, page, "Comment stream ended early: {}", e);
                pages.interrupted_by = Some(e);
                hit_page_limit = false;
                break;
            }
        }
    }

    if hit_page_limit {
        tracing::warn!(
            "Hit max_comment_pages ({}) for {} of {} before reaching a short page. Data may be incomplete.",
            max_pages,
            stream,
            username
        );
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::SearchPage;
    use crate::types::Category;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves comment pages of the given sizes, failing once sizes run out if asked to.
    struct PagedComments {
        sizes: Vec<usize>,
        fail_after: bool,
        requests: AtomicU32,
    }

    impl PagedComments {
        fn new(sizes: Vec<usize>) -> Self {
            Self {
                sizes,
                fail_after: false,
                requests: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ContributionSource for PagedComments {
        async fn search_issues(
            &self,
            _category: Category,
            _query: &str,
        ) -> Result<SearchPage, ContributionError> {
            Ok(SearchPage::default())
        }

        async fn comment_page(
            &self,
            stream: CommentStream,
            _username: &str,
            page: u32,
        ) -> Result<Vec<RawComment>, ContributionError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let Some(&size) = self.sizes.get(page as usize - 1) else {
                if self.fail_after {
                    return Err(ContributionError::CommentPageFailed {
                        stream,
                        page,
                        message: "Server Error".to_string(),
                    });
                }
                return Ok(Vec::new());
            };
            Ok((0..size)
                .map(|i| RawComment {
                    body: Some(format!("page {page} comment {i}")),
                    html_url: format!("https://github.com/acme/widgets/issues/{page}#issuecomment-{i}"),
                    created_at: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_stops_after_short_page() {
        let source = PagedComments::new(vec![100, 100, 50]);
        let pages = collect_comment_pages(&source, CommentStream::IssueComments, "alice", 50).await;

        assert_eq!(pages.comments.len(), 250);
        assert_eq!(pages.pages_requested, 3);
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
        assert!(pages.interrupted_by.is_none());
    }

    #[tokio::test]
    async fn test_stops_after_empty_page() {
        let source = PagedComments::new(vec![100, 100, 100, 0]);
        let pages = collect_comment_pages(&source, CommentStream::IssueComments, "alice", 50).await;

        assert_eq!(pages.comments.len(), 300);
        assert_eq!(pages.pages_requested, 4);
        assert_eq!(source.requests.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_partial_results() {
        let mut source = PagedComments::new(vec![100, 100]);
        source.fail_after = true;
        let pages =
            collect_comment_pages(&source, CommentStream::ReviewComments, "alice", 50).await;

        assert_eq!(pages.comments.len(), 200);
        assert_eq!(pages.pages_requested, 3);
        assert!(matches!(
            pages.interrupted_by,
            Some(ContributionError::CommentPageFailed { page: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_page_limit_bounds_requests() {
        let source = PagedComments::new(vec![100; 10]);
        let pages = collect_comment_pages(&source, CommentStream::IssueComments, "alice", 2).await;

        assert_eq!(pages.comments.len(), 200);
        assert_eq!(source.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_comments_preserve_page_order() {
        let source = PagedComments::new(vec![100, 1]);
        let pages = collect_comment_pages(&source, CommentStream::IssueComments, "alice", 50).await;

        assert_eq!(pages.comments[0].body.as_deref(), Some("page 1 comment 0"));
        assert_eq!(pages.comments[100].body.as_deref(), Some("page 2 comment 0"));
    }
}
