//! Task and comment data structures.
//!
//! This module defines the `Task` and `Comment` records stored per workspace,
//! plus the input and patch shapes the task and comment services accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work on a board.
///
/// `column_id` links the task to a board column; tasks created before a board
/// had columns (or imported from elsewhere) may carry only a free-text `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub provider_id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub column_id: Option<String>,
    #[serde(default)]
    pub remote_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description_md: String,
    #[serde(default)]
    pub status: Option<String>,
    pub priority: i32,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimate_minutes: Option<u32>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A markdown comment attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub provider_id: String,
    #[serde(default)]
    pub remote_id: Option<String>,
    pub body_md: String,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTaskInput {
    pub provider_id: String,
    pub workspace_id: String,
    pub board_id: Option<String>,
    pub column_id: Option<String>,
    pub title: String,
    pub description_md: String,
    pub status: Option<String>,
    pub priority: i32,
    pub due_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

/// Partial update for a task. `None` leaves a field untouched.
///
/// For the nullable fields, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description_md: Option<String>,
    pub status: Option<Option<String>>,
    pub priority: Option<i32>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub column_id: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
}

impl TaskPatch {
    /// Patch that only replaces the description.
    pub fn description(description_md: impl Into<String>) -> Self {
        Self {
            description_md: Some(description_md.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Move a task to another column (or bare status) at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTaskInput {
    pub task_id: String,
    pub column_id: Option<String>,
    pub status: Option<String>,
    /// 0.0 means "now", which places the task at the end of its column.
    pub position: f64,
}

/// Store-side listing filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub workspace_id: String,
    pub board_id: Option<String>,
    pub title_query: String,
    pub column_id: Option<String>,
    pub status: Option<String>,
    pub due_soon_by: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Whether a stored task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        if task.workspace_id != self.workspace_id {
            return false;
        }
        if let Some(board_id) = &self.board_id {
            if task.board_id.as_ref() != Some(board_id) {
                return false;
            }
        }
        if let Some(column_id) = &self.column_id {
            if task.column_id.as_ref() != Some(column_id) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            let matches_status = task
                .status
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case(status))
                .unwrap_or(false);
            if !matches_status {
                return false;
            }
        }
        if let Some(limit) = self.due_soon_by {
            match task.due_at {
                Some(due) if due <= limit => {}
                _ => return false,
            }
        }
        title_matches(&task.title, &self.title_query)
    }
}

/// Case-insensitive substring match; an empty query matches everything.
pub fn title_matches(title: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&query.to_lowercase())
}

/// Input for adding a comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddCommentInput {
    pub task_id: String,
    pub provider_id: String,
    pub body_md: String,
    pub author: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::task;
    use super::*;

    #[test]
    fn test_title_matches_is_case_insensitive() {
        assert!(title_matches("Fix Login Bug", "login"));
        assert!(title_matches("anything", "  "));
        assert!(!title_matches("Fix Login Bug", "logout"));
    }

    #[test]
    fn test_filter_scopes_by_board_and_column() {
        let mut t = task("t1", "Write docs");
        t.column_id = Some("c1".to_string());
        let mut filter = TaskFilter {
            workspace_id: "w1".to_string(),
            board_id: Some("b1".to_string()),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&t));

        filter.column_id = Some("c2".to_string());
        assert!(!filter.matches(&t));

        filter.column_id = None;
        filter.board_id = Some("b2".to_string());
        assert!(!filter.matches(&t));
    }

    #[test]
    fn test_filter_status_ignores_case() {
        let mut t = task("t1", "Legacy");
        t.status = Some("Doing".to_string());
        let filter = TaskFilter {
            workspace_id: "w1".to_string(),
            status: Some("doing".to_string()),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&t));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::description("x").is_empty());
    }
}
