//! Report data model shared by the aggregator and the HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository label used when an item URL does not look like a GitHub path.
pub const UNKNOWN_REPO: &str = "Unknown Repo";

/// One of the six fixed buckets a contribution is sorted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Merged,
    Reviewed,
    Draft,
    Closed,
    IssuesOpened,
    Comments,
}

impl Category {
    /// Categories answered by the issue search endpoint.
    pub const SEARCHED: [Category; 5] = [
        Category::Merged,
        Category::Reviewed,
        Category::Draft,
        Category::Closed,
        Category::IssuesOpened,
    ];

    /// Section label as it appears in the report.
    pub fn label(self) -> &'static str {
        match self {
            Category::Merged => "Merged PRs",
            Category::Reviewed => "Reviewed PRs",
            Category::Draft => "Draft PRs",
            Category::Closed => "Closed PRs",
            Category::IssuesOpened => "Issues Opened",
            Category::Comments => "Comments Made",
        }
    }

    /// Message reported when the upstream error carries none.
    pub fn default_error_message(self) -> &'static str {
        match self {
            Category::Merged => "Failed to fetch merged PRs",
            Category::Reviewed => "Failed to fetch reviewed PRs",
            Category::Draft => "Failed to fetch draft PRs",
            Category::Closed => "Failed to fetch closed PRs",
            Category::IssuesOpened => "Failed to fetch opened issues",
            Category::Comments => "Failed to fetch comments",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two comment collections merged into the "Comments Made" section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentStream {
    IssueComments,
    ReviewComments,
}

impl CommentStream {
    pub const ALL: [CommentStream; 2] = [CommentStream::IssueComments, CommentStream::ReviewComments];
}

impl fmt::Display for CommentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentStream::IssueComments => f.write_str("issue comments"),
            CommentStream::ReviewComments => f.write_str("review comments"),
        }
    }
}

/// Inclusive calendar-date window a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true when the timestamp's UTC date falls inside the window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        self.start <= date && date <= self.end
    }

    /// Renders the window in search-qualifier form, e.g. `2024-01-01..2024-01-31`.
    pub fn qualifier(&self) -> String {
        format!(
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A normalized pull request, issue or comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionItem {
    pub title: String,
    /// Canonical web link.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// `owner/name` derived from `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

/// Per-category item lists, serialized as a map keyed by section label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(rename = "Merged PRs")]
    pub merged: Vec<ContributionItem>,
    #[serde(rename = "Reviewed PRs")]
    pub reviewed: Vec<ContributionItem>,
    #[serde(rename = "Draft PRs")]
    pub draft: Vec<ContributionItem>,
    #[serde(rename = "Closed PRs")]
    pub closed: Vec<ContributionItem>,
    #[serde(rename = "Issues Opened")]
    pub issues_opened: Vec<ContributionItem>,
    #[serde(rename = "Comments Made")]
    pub comments: Vec<ContributionItem>,
}

impl Sections {
    pub fn get(&self, category: Category) -> &[ContributionItem] {
        match category {
            Category::Merged => &self.merged,
            Category::Reviewed => &self.reviewed,
            Category::Draft => &self.draft,
            Category::Closed => &self.closed,
            Category::IssuesOpened => &self.issues_opened,
            Category::Comments => &self.comments,
        }
    }

    pub(crate) fn slot_mut(&mut self, category: Category) -> &mut Vec<ContributionItem> {
        match category {
            Category::Merged => &mut self.merged,
            Category::Reviewed => &mut self.reviewed,
            Category::Draft => &mut self.draft,
            Category::Closed => &mut self.closed,
            Category::IssuesOpened => &mut self.issues_opened,
            Category::Comments => &mut self.comments,
        }
    }

    /// Sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[ContributionItem])> {
        [
            Category::Merged,
            Category::Reviewed,
            Category::Draft,
            Category::Closed,
            Category::IssuesOpened,
            Category::Comments,
        ]
        .into_iter()
        .map(move |category| (category, self.get(category)))
    }
}

/// Headline counts for a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "totalMergedPRs")]
    pub total_merged_prs: usize,
    #[serde(rename = "totalReviewedPRs")]
    pub total_reviewed_prs: usize,
    #[serde(rename = "totalDraftPRs")]
    pub total_draft_prs: usize,
    #[serde(rename = "totalClosedPRs")]
    pub total_closed_prs: usize,
    #[serde(rename = "totalIssuesOpened")]
    pub total_issues_opened: usize,
    #[serde(rename = "totalComments")]
    pub total_comments: usize,
    /// Formatted as `"<N.N> days"`; absent when nothing was merged.
    #[serde(rename = "avgTimeToMerge")]
    pub avg_time_to_merge: Option<String>,
}

/// The full response returned by the aggregator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionReport {
    pub summary: Summary,
    pub sections: Sections,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_range_includes_both_bounds() {
        let range = january();
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_range_excludes_adjacent_days() {
        let range = january();
        assert!(!range.contains(Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn test_range_compares_offset_timestamps_as_instants() {
        let range = january();
        // 2024-02-01T01:00:00+02:00 is still January 31st in UTC.
        let late = DateTime::parse_from_rfc3339("2024-02-01T01:00:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert!(range.contains(late));
    }

    #[test]
    fn test_qualifier_format() {
        assert_eq!(january().qualifier(), "2024-01-01..2024-01-31");
    }

    #[test]
    fn test_sections_serialize_with_fixed_labels_in_order() {
        let json = serde_json::to_string(&Sections::default()).unwrap();
        assert_eq!(
            json,
            r#"{"Merged PRs":[],"Reviewed PRs":[],"Draft PRs":[],"Closed PRs":[],"Issues Opened":[],"Comments Made":[]}"#
        );
    }

    #[test]
    fn test_item_omits_missing_fields() {
        let item = ContributionItem {
            title: "Fix".to_string(),
            url: "https://github.com/acme/widgets/pull/1".to_string(),
            created_at: None,
            merged_at: None,
            closed_at: None,
            repo: Some("acme/widgets".to_string()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["repo"], "acme/widgets");
        assert!(json.get("createdAt").is_none());
        assert!(json.get("mergedAt").is_none());
    }
}
