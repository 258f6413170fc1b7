//! Service layer that assembles contribution reports.
//!
//! `ContributionQuerier` is the entry point for building a report. For each request it:
//! 1. Spawns one task per search-backed category and one per comment stream.
//! 2. Fails the whole report on the first search failure.
//! 3. Keeps whatever each comment stream managed to read.
//! 4. Projects the finished sections into the summary.

use crate::error::ContributionError;
use crate::github::{ContributionSource, PAGE_SIZE};
use crate::metrics;
use crate::normalize::{comments_in_range, normalize_search_item};
use crate::pagination::collect_comment_pages;
use crate::query::build_query;
use crate::telemetry::ReportObserver;
use crate::types::{
    Category, CommentStream, ContributionItem, ContributionReport, DateRange, Sections,
};
use futures::future::{join_all, try_join_all};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

#[derive(Clone)]
pub struct ContributionQuerier {
    source: Arc<dyn ContributionSource>,
    observer: Arc<dyn ReportObserver>,
    max_comment_pages: u32,
}

impl ContributionQuerier {
    pub fn new(
        source: Arc<dyn ContributionSource>,
        observer: Arc<dyn ReportObserver>,
        max_comment_pages: u32,
    ) -> Self {
        Self {
            source,
            observer,
            max_comment_pages,
        }
    }

    /// Builds the report for `username` over `range`.
    ///
    /// Sub-fetches run as independent tasks; a failing search does not cancel its
    /// siblings, it only decides the result.
    pub async fn fetch_contributions(
        &self,
        username: &str,
        range: DateRange,
    ) -> Result<ContributionReport, ContributionError> {
        tracing::info!(username, %range, "Fetching contributions");

        let search_tasks: Vec<_> = Category::SEARCHED
            .into_iter()
            .map(|category| self.spawn_search(category, username, range))
            .collect();
        let comment_tasks: Vec<_> = CommentStream::ALL
            .into_iter()
            .map(|stream| self.spawn_comments(stream, username, range))
            .collect();

        let searched = try_join_all(search_tasks.into_iter().map(|task| async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(task_aborted(e)),
            }
        }))
        .await;

        let searched = match searched {
            Ok(searched) => searched,
            Err(e) => {
                self.observer.report_failed(username, &e);
                return Err(e);
            }
        };

        let mut sections = Sections::default();
        for (category, items) in searched {
            *sections.slot_mut(category) = items;
        }

        for (stream, task) in CommentStream::ALL.into_iter().zip(join_all(comment_tasks).await) {
            match task {
                Ok(items) => sections.comments.extend(items),
                Err(e) => {
                    let e = task_aborted(e);
                    self.observer.comment_stream_interrupted(username, stream, &e);
                }
            }
        }
        self.observer
            .category_fetched(username, Category::Comments, sections.comments.len());

        let summary = metrics::summarize(&sections);
        self.observer.report_completed(username, &summary);

        Ok(ContributionReport { summary, sections })
    }

    fn spawn_search(
        &self,
        category: Category,
        username: &str,
        range: DateRange,
    ) -> JoinHandle<Result<(Category, Vec<ContributionItem>), ContributionError>> {
        let source = Arc::clone(&self.source);
        let observer = Arc::clone(&self.observer);
        let username = username.to_string();

        tokio::spawn(async move {
            let items = fetch_search_category(source.as_ref(), category, &username, &range).await?;
            observer.category_fetched(&username, category, items.len());
            Ok((category, items))
        })
    }

    fn spawn_comments(
        &self,
        stream: CommentStream,
        username: &str,
        range: DateRange,
    ) -> JoinHandle<Vec<ContributionItem>> {
        let source = Arc::clone(&self.source);
        let observer = Arc::clone(&self.observer);
        let username = username.to_string();
        let max_pages = self.max_comment_pages;

        tokio::spawn(async move {
            let pages = collect_comment_pages(source.as_ref(), stream, &username, max_pages).await;
            tracing::debug!(
                %stream,
                pages = pages.pages_requested,
                comments = pages.comments.len(),
                "Read comment stream"
            );
            if let Some(e) = &pages.interrupted_by {
                observer.comment_stream_interrupted(&username, stream, e);
            }
            comments_in_range(&pages.comments, &range)
        })
    }
}

/// Runs one search category: query, fetch, post-filter, normalize.
///
/// Only the first page of results is read, so a category with more than
/// 100 matches in the window is under-reported.
pub async fn fetch_search_category<S>(
    source: &S,
    category: Category,
    username: &str,
    range: &DateRange,
) -> Result<Vec<ContributionItem>, ContributionError>
where
    S: ContributionSource + ?Sized,
{
    let Some(query) = build_query(category, username, range) else {
        return Ok(Vec::new());
    };
    tracing::debug!(%category, query = %query, "Searching issues");

    let page = source.search_issues(category, &query).await?;

    let mut records = page.items;
    records.truncate(usize::from(PAGE_SIZE));
    if page.total_count > records.len() as u64 {
        tracing::warn!(
            %category,
            total = page.total_count,
            returned = records.len(),
            "Search matched more items than a single page holds. Data may be incomplete."
        );
    }

    // `commenter:` also matches the user's own PRs.
    if category == Category::Reviewed {
        records.retain(|record| {
            !record
                .author_login()
                .is_some_and(|login| login.eq_ignore_ascii_case(username))
        });
    }

    Ok(records
        .iter()
        .map(|record| normalize_search_item(category, record))
        .collect())
}

fn task_aborted(error: JoinError) -> ContributionError {
    ContributionError::TaskAborted(error.to_string())
}
