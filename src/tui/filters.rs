//! Client-side filtering and ordering of the fetched task set.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::fields::{normalize_priority, DueFilter, SortMode};
use crate::task::{title_matches, Task};

/// Window used by the "Due Soon" bucket.
pub const DUE_SOON_DAYS: i64 = 7;

/// Active filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub column_id: Option<String>,
    pub priority: Option<i32>,
    pub due: DueFilter,
    pub search: String,
}

impl TaskFilters {
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if let Some(column_id) = &self.column_id {
            if task.column_id.as_ref() != Some(column_id) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if normalize_priority(task.priority) != priority {
                return false;
            }
        }
        if !due_matches(self.due, task.due_at, now) {
            return false;
        }
        title_matches(&task.title, &self.search)
    }
}

fn due_matches(bucket: DueFilter, due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match (bucket, due) {
        (DueFilter::Any, _) => true,
        (DueFilter::NoDate, due) => due.is_none(),
        (DueFilter::Overdue, Some(due)) => due < now,
        (DueFilter::Soon, Some(due)) => due >= now && due <= now + Duration::days(DUE_SOON_DAYS),
        (_, None) => false,
    }
}

/// Filter, then sort.
pub fn visible_tasks(tasks: &[Task], filters: &TaskFilters, sort: SortMode, now: DateTime<Utc>) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| filters.matches(t, now)).cloned().collect();
    sort_tasks(&mut out, sort);
    out
}

/// Stable sort in place.
pub fn sort_tasks(tasks: &mut [Task], mode: SortMode) {
    match mode {
        SortMode::Priority => tasks.sort_by(|a, b| {
            normalize_priority(a.priority)
                .cmp(&normalize_priority(b.priority))
                .then_with(|| b.due_at.is_some().cmp(&a.due_at.is_some()))
                .then_with(|| a.due_at.cmp(&b.due_at))
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        }),
        SortMode::Due => tasks.sort_by(|a, b| {
            due_ascending(a.due_at, b.due_at).then_with(|| b.updated_at.cmp(&a.updated_at))
        }),
        SortMode::Title => tasks.sort_by(|a, b| {
            let ta = a.title.trim().to_lowercase();
            let tb = b.title.trim().to_lowercase();
            ta.cmp(&tb).then_with(|| b.updated_at.cmp(&a.updated_at))
        }),
        SortMode::Updated => tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortMode::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

fn due_ascending(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Tasks in one kanban column: by position, then most recently updated.
pub fn tasks_for_column<'a>(tasks: &'a [Task], column_id: &str) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.column_id.as_deref() == Some(column_id))
        .collect();
    out.sort_by(|a, b| {
        a.position
            .partial_cmp(&b.position)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    out
}

/// Clamp an index into `[0, len)`, or 0 when empty.
pub fn clamp_index(idx: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        idx.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn prioritized(id: &str, priority: i32, due_days: Option<i64>) -> Task {
        let mut t = task(id, id);
        t.priority = priority;
        t.due_at = due_days.map(|d| now() + Duration::days(d));
        t
    }

    #[test]
    fn test_priority_sort_prefers_due_dates() {
        let mut tasks = vec![
            prioritized("a", 2, Some(3)),
            prioritized("b", 0, None),
            prioritized("c", 0, Some(1)),
        ];
        sort_tasks(&mut tasks, SortMode::Priority);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_overdue_excludes_due_now() {
        let mut yesterday = task("y", "Yesterday");
        yesterday.due_at = Some(Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap());
        let mut today = task("t", "Today");
        today.due_at = Some(now());
        let filters = TaskFilters {
            due: DueFilter::Overdue,
            ..TaskFilters::default()
        };
        let out = visible_tasks(&[yesterday, today], &filters, SortMode::Priority, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "y");
    }

    #[test]
    fn test_due_soon_window_and_no_date() {
        let tasks = vec![
            prioritized("soon", 3, Some(7)),
            prioritized("later", 3, Some(8)),
            prioritized("none", 3, None),
        ];
        let soon = TaskFilters {
            due: DueFilter::Soon,
            ..TaskFilters::default()
        };
        let ids: Vec<_> = visible_tasks(&tasks, &soon, SortMode::Title, now())
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["soon"]);

        let no_date = TaskFilters {
            due: DueFilter::NoDate,
            ..TaskFilters::default()
        };
        assert_eq!(visible_tasks(&tasks, &no_date, SortMode::Title, now())[0].id, "none");
    }

    #[test]
    fn test_due_sort_puts_missing_last() {
        let mut tasks = vec![
            prioritized("none", 1, None),
            prioritized("late", 1, Some(5)),
            prioritized("early", 1, Some(1)),
        ];
        sort_tasks(&mut tasks, SortMode::Due);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "none"]);
    }

    #[test]
    fn test_title_sort_trims_and_ignores_case() {
        let mut tasks = vec![task("1", "  beta"), task("2", "Alpha"), task("3", "gamma")];
        sort_tasks(&mut tasks, SortMode::Title);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filters_compose_and_are_idempotent() {
        let mut a = prioritized("a", 1, Some(-2));
        a.column_id = Some("c1".to_string());
        a.title = "Fix login".to_string();
        let mut b = prioritized("b", 1, Some(-1));
        b.column_id = Some("c2".to_string());
        b.title = "Fix logout".to_string();
        let mut c = prioritized("c", 9, Some(-1));
        c.column_id = Some("c1".to_string());
        c.title = "Fix layout".to_string();
        let tasks = vec![a, b, c];

        let filters = TaskFilters {
            column_id: Some("c1".to_string()),
            priority: Some(1),
            due: DueFilter::Overdue,
            search: "FIX".to_string(),
        };
        for mode in SortMode::ALL {
            let once = visible_tasks(&tasks, &filters, mode, now());
            let twice = visible_tasks(&once, &filters, mode, now());
            assert_eq!(once, twice);
            assert_eq!(once.len(), 1);
            assert_eq!(once[0].id, "a");
        }
    }

    #[test]
    fn test_out_of_range_priority_filters_as_unknown() {
        let tasks = vec![prioritized("x", 42, None)];
        let filters = TaskFilters {
            priority: Some(5),
            ..TaskFilters::default()
        };
        assert!(visible_tasks(&tasks, &filters, SortMode::Priority, now()).is_empty());
    }

    #[test]
    fn test_column_tasks_order_by_position_then_updated() {
        let mut a = task("a", "A");
        a.column_id = Some("c".to_string());
        a.position = 2.0;
        let mut b = task("b", "B");
        b.column_id = Some("c".to_string());
        b.position = 1.0;
        let mut c = task("c", "C");
        c.column_id = Some("c".to_string());
        c.position = 2.0;
        c.updated_at = a.updated_at + Duration::hours(1);
        let loose = task("d", "D");
        let tasks = vec![a, b, c, loose];
        let ids: Vec<_> = tasks_for_column(&tasks, "c").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(5, 0), 0);
        assert_eq!(clamp_index(5, 3), 2);
        assert_eq!(clamp_index(1, 3), 1);
    }
}
