//! Markdown rendering of reports and persistence of saved copies.

use crate::types::{ContributionItem, ContributionReport, DateRange, UNKNOWN_REPO};
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Renders one section as a bulleted link list, grouped by repository.
pub fn section_links(items: &[ContributionItem]) -> String {
    let mut sorted: Vec<&ContributionItem> = items.iter().collect();
    sorted.sort_by_cached_key(|item| item.repo.as_deref().unwrap_or_default().to_lowercase());

    sorted
        .into_iter()
        .map(|item| {
            format!(
                "* [{}]({}) ({})",
                item.title,
                item.url,
                item.repo.as_deref().unwrap_or(UNKNOWN_REPO)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the whole report: summary first, then every section in display order.
pub fn render_report(username: &str, range: &DateRange, report: &ContributionReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "# Contributions for {username} ({range})\n");
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "- Merged PRs: {}", summary.total_merged_prs);
    let _ = writeln!(out, "- PRs Reviewed: {}", summary.total_reviewed_prs);
    let _ = writeln!(out, "- Draft PRs: {}", summary.total_draft_prs);
    let _ = writeln!(out, "- Closed PRs: {}", summary.total_closed_prs);
    let _ = writeln!(out, "- Issues Opened: {}", summary.total_issues_opened);
    let _ = writeln!(out, "- Comments Made: {}", summary.total_comments);
    let _ = writeln!(
        out,
        "- Avg Time to Merge: {}",
        summary.avg_time_to_merge.as_deref().unwrap_or("—")
    );

    for (category, items) in report.sections.iter() {
        let _ = writeln!(out, "\n## {} ({})\n", category.label(), items.len());
        if items.is_empty() {
            let _ = writeln!(out, "_None_");
        } else {
            let _ = writeln!(out, "{}", section_links(items));
        }
    }

    out
}

/// Rejects names that could escape the downloads directory.
pub fn is_safe_file_stem(username: &str) -> bool {
    !username.is_empty()
        && !username.contains("..")
        && !username.contains(['/', '\\'])
        && !username.starts_with('.')
}

/// Appends `content` to `<dir>/<username>.md`, creating both as needed.
/// Returns the file name written to.
pub async fn append_report(dir: &Path, username: &str, content: &str) -> io::Result<String> {
    if !is_safe_file_stem(username) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to write report for {username:?}"),
        ));
    }

    tokio::fs::create_dir_all(dir).await?;

    let filename = format!("{username}.md");
    let path: PathBuf = dir.join(&filename);
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Saved markdown report");
    Ok(filename)
}
