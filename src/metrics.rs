//! Summary statistics derived from the report sections.

use crate::types::{Category, ContributionItem, Sections, Summary};

const MILLIS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Projects the section lists into headline counts.
pub fn summarize(sections: &Sections) -> Summary {
    Summary {
        total_merged_prs: sections.get(Category::Merged).len(),
        total_reviewed_prs: sections.get(Category::Reviewed).len(),
        total_draft_prs: sections.get(Category::Draft).len(),
        total_closed_prs: sections.get(Category::Closed).len(),
        total_issues_opened: sections.get(Category::IssuesOpened).len(),
        total_comments: sections.get(Category::Comments).len(),
        avg_time_to_merge: average_time_to_merge(sections.get(Category::Merged)),
    }
}

/// Mean of `merged_at - created_at` across merged PRs, formatted as `"<N.N> days"`.
///
/// Every merged item counts toward the mean. An item missing either timestamp,
/// or merged before it was created, contributes a latency of zero. Returns
/// `None` only when `merged` is empty.
pub fn average_time_to_merge(merged: &[ContributionItem]) -> Option<String> {
    if merged.is_empty() {
        return None;
    }

    let total: f64 = merged.iter().map(|item| latency_millis(item) as f64).sum();
    let days = total / merged.len() as f64 / MILLIS_PER_DAY;

    Some(format!("{days:.1} days"))
}

fn latency_millis(item: &ContributionItem) -> i64 {
    match (item.created_at, item.merged_at) {
        (Some(created_at), Some(merged_at)) => (merged_at - created_at).num_milliseconds().max(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn merged_pr(created_day: u32, latency: Duration) -> ContributionItem {
        let created_at = Utc.with_ymd_and_hms(2024, 1, created_day, 9, 0, 0).unwrap();
        ContributionItem {
            title: format!("PR opened on day {created_day}"),
            url: "https://github.com/acme/widgets/pull/1".to_string(),
            created_at: Some(created_at),
            merged_at: Some(created_at + latency),
            closed_at: Some(created_at + latency),
            repo: Some("acme/widgets".to_string()),
        }
    }

    #[test]
    fn test_average_is_none_without_merges() {
        assert_eq!(average_time_to_merge(&[]), None);
    }

    #[test]
    fn test_average_of_one_and_three_days() {
        let prs = vec![
            merged_pr(2, Duration::days(1)),
            merged_pr(10, Duration::days(3)),
        ];
        assert_eq!(average_time_to_merge(&prs).as_deref(), Some("2.0 days"));
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let prs = vec![merged_pr(5, Duration::hours(34))];
        assert_eq!(average_time_to_merge(&prs).as_deref(), Some("1.4 days"));
    }

    #[test]
    fn test_average_present_when_timestamps_missing() {
        let mut missing_created = merged_pr(4, Duration::days(2));
        missing_created.created_at = None;
        let mut sections = Sections::default();
        sections.merged = vec![missing_created];

        let summary = summarize(&sections);

        assert_eq!(summary.total_merged_prs, 1);
        assert_eq!(summary.avg_time_to_merge.as_deref(), Some("0.0 days"));
    }

    #[test]
    fn test_items_without_timestamps_count_toward_mean() {
        let mut missing_merged = merged_pr(6, Duration::days(1));
        missing_merged.merged_at = None;
        let prs = vec![merged_pr(2, Duration::days(4)), missing_merged];

        assert_eq!(average_time_to_merge(&prs).as_deref(), Some("2.0 days"));
    }

    #[test]
    fn test_same_instant_merge_is_zero() {
        let prs = vec![merged_pr(5, Duration::zero())];
        assert_eq!(average_time_to_merge(&prs).as_deref(), Some("0.0 days"));
    }

    #[test]
    fn test_summary_counts_match_sections() {
        let mut sections = Sections::default();
        sections.merged = vec![merged_pr(1, Duration::days(2))];
        sections.reviewed = vec![merged_pr(2, Duration::days(1)); 3];
        sections.comments = vec![merged_pr(3, Duration::days(1)); 7];

        let summary = summarize(&sections);

        for (category, items) in sections.iter() {
            let count = match category {
                Category::Merged => summary.total_merged_prs,
                Category::Reviewed => summary.total_reviewed_prs,
                Category::Draft => summary.total_draft_prs,
                Category::Closed => summary.total_closed_prs,
                Category::IssuesOpened => summary.total_issues_opened,
                Category::Comments => summary.total_comments,
            };
            assert_eq!(count, items.len(), "{category} count mismatch");
        }
        assert_eq!(summary.avg_time_to_merge.as_deref(), Some("2.0 days"));
    }
}
