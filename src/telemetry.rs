//! Log subscriber setup and the observer port the aggregator reports through.

use crate::config::LogFormat;
use crate::error::ContributionError;
use crate::types::{Category, CommentStream, Summary};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "contrib_report=debug,tower_http=debug";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs the global tracing subscriber. Later calls are no-ops.
pub fn init(format: LogFormat) {
    INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match format {
            LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init(),
        };

        if let Err(e) = installed {
            eprintln!("tracing subscriber already installed: {e}");
        }
    });
}

pub fn is_initialized() -> bool {
    INITIALIZED.get().is_some()
}

/// Receives progress events while a report is assembled.
pub trait ReportObserver: Send + Sync {
    fn category_fetched(&self, username: &str, category: Category, count: usize);

    fn comment_stream_interrupted(
        &self,
        username: &str,
        stream: CommentStream,
        error: &ContributionError,
    );

    fn report_completed(&self, username: &str, summary: &Summary);

    fn report_failed(&self, username: &str, error: &ContributionError);
}

/// Forwards observer events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ReportObserver for TracingObserver {
    fn category_fetched(&self, username: &str, category: Category, count: usize) {
        tracing::debug!(username, %category, count, "Fetched category");
    }

    fn comment_stream_interrupted(
        &self,
        username: &str,
        stream: CommentStream,
        error: &ContributionError,
    ) {
        tracing::warn!(username, %stream, error = %error, "Comment stream interrupted; returning partial comments");
    }

    fn report_completed(&self, username: &str, summary: &Summary) {
        tracing::info!(
            username,
            merged = summary.total_merged_prs,
            reviewed = summary.total_reviewed_prs,
            draft = summary.total_draft_prs,
            closed = summary.total_closed_prs,
            issues = summary.total_issues_opened,
            comments = summary.total_comments,
            avg_time_to_merge = summary.avg_time_to_merge.as_deref().unwrap_or("n/a"),
            "Contribution report assembled"
        );
    }

    fn report_failed(&self, username: &str, error: &ContributionError) {
        tracing::error!(username, error = %error, "Contribution report failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(LogFormat::Pretty);
        assert!(is_initialized());
        init(LogFormat::Json);
        assert!(is_initialized());
    }
}
