//! Search-qualifier strings for each search-backed category.

use crate::types::{Category, DateRange};

/// Builds the issue-search query for `category`.
///
/// `username` is passed through as-is; callers supply a bare GitHub handle.
/// Returns `None` for categories that are not answered by search.
pub fn build_query(category: Category, username: &str, range: &DateRange) -> Option<String> {
    let window = range.qualifier();
    let tokens = match category {
        Category::Merged => vec![
            "type:pr".to_string(),
            format!("author:{username}"),
            "is:merged".to_string(),
            format!("merged:{window}"),
        ],
        Category::Reviewed => vec![
            "type:pr".to_string(),
            format!("commenter:{username}"),
            format!("updated:{window}"),
        ],
        Category::Draft => vec![
            "type:pr".to_string(),
            "is:open".to_string(),
            "is:draft".to_string(),
            format!("author:{username}"),
            format!("created:{window}"),
        ],
        Category::Closed => vec![
            "type:pr".to_string(),
            "is:closed".to_string(),
            format!("author:{username}"),
            format!("closed:{window}"),
            "-is:merged".to_string(),
        ],
        Category::IssuesOpened => vec![
            "type:issue".to_string(),
            format!("author:{username}"),
            format!("created:{window}"),
        ],
        Category::Comments => return None,
    };
    Some(tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[rstest]
    #[case(Category::Merged, "type:pr author:alice is:merged merged:2024-01-01..2024-01-31")]
    #[case(Category::Reviewed, "type:pr commenter:alice updated:2024-01-01..2024-01-31")]
    #[case(
        Category::Draft,
        "type:pr is:open is:draft author:alice created:2024-01-01..2024-01-31"
    )]
    #[case(
        Category::Closed,
        "type:pr is:closed author:alice closed:2024-01-01..2024-01-31 -is:merged"
    )]
    #[case(Category::IssuesOpened, "type:issue author:alice created:2024-01-01..2024-01-31")]
    fn test_build_query(#[case] category: Category, #[case] expected: &str) {
        assert_eq!(
            build_query(category, "alice", &january()).as_deref(),
            Some(expected)
        );
    }

    #[test]
    fn test_comments_have_no_search_query() {
        assert!(build_query(Category::Comments, "alice", &january()).is_none());
    }
}
