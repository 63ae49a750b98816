use std::cmp::Ordering;

use crate::task::Task;

/// The two selections the list ever asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    /// `checked` is not `true`: absent or `false`.
    Incomplete,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Incomplete => !task.is_checked(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    CreatedAt(SortDirection),
}

impl Sort {
    /// Stable: records with equal keys keep collection order.
    pub fn apply(self, tasks: &mut [Task]) {
        match self {
            Sort::CreatedAt(direction) => tasks.sort_by(|a, b| {
                let ordering: Ordering = a.created_at.cmp(&b.created_at);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }),
        }
    }
}

/// `None` keeps collection (insertion) order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
}

impl FindOptions {
    pub fn newest_first() -> Self {
        Self {
            sort: Some(Sort::CreatedAt(SortDirection::Descending)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn task(text: &str, minute: i64, checked: Option<bool>) -> Task {
        Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            owner: "u1".to_string(),
            username: "alice".to_string(),
            checked,
        }
    }

    #[test]
    fn incomplete_filter_treats_absent_and_false_alike() {
        assert!(TaskFilter::Incomplete.matches(&task("a", 0, None)));
        assert!(TaskFilter::Incomplete.matches(&task("b", 0, Some(false))));
        assert!(!TaskFilter::Incomplete.matches(&task("c", 0, Some(true))));
        assert!(TaskFilter::All.matches(&task("c", 0, Some(true))));
    }

    #[test]
    fn newest_first_orders_by_created_at_descending() {
        let mut tasks = vec![task("old", 1, None), task("new", 3, None), task("mid", 2, None)];
        if let Some(sort) = FindOptions::newest_first().sort {
            sort.apply(&mut tasks);
        }
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["new", "mid", "old"]);
    }

    #[test]
    fn equal_timestamps_keep_collection_order() {
        let mut tasks = vec![task("first", 5, None), task("second", 5, None)];
        Sort::CreatedAt(SortDirection::Descending).apply(&mut tasks);
        assert_eq!(tasks[0].text, "first");
        assert_eq!(tasks[1].text, "second");
    }
}
