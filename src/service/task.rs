//! Task creation, update, move and listing.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::fields::normalize_labels;
use crate::repository::TaskRepository;
use crate::task::{CreateTaskInput, MoveTaskInput, Task, TaskFilter, TaskPatch};

/// Validates and normalizes task input before handing it to the repository.
#[derive(Debug, Clone)]
pub struct TaskService<R> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a task. The title is trimmed and labels normalized; the task is
    /// positioned at the end of its column by creation time.
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        require(&input.provider_id, "provider id is required")?;
        require(&input.workspace_id, "workspace id is required")?;
        require(&input.title, "title is required")?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            provider_id: input.provider_id,
            workspace_id: input.workspace_id,
            board_id: input.board_id,
            column_id: input.column_id,
            remote_id: None,
            title: input.title.trim().to_string(),
            description_md: input.description_md,
            status: input.status,
            priority: input.priority,
            due_at: input.due_at,
            estimate_minutes: None,
            assignee: None,
            labels: normalize_labels(&input.labels),
            position: now_position(),
            created_at: now,
            updated_at: now,
        };
        let task = self.repo.create_task(task)?;
        debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// Apply a partial update. String fields are trimmed; an empty title is rejected.
    pub fn update_task(&self, task_id: &str, mut patch: TaskPatch) -> Result<()> {
        require(task_id, "task id is required")?;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
            if title.is_empty() {
                return Err(Error::validation("title cannot be empty"));
            }
        }
        patch.status = patch.status.map(trim_optional);
        patch.column_id = patch.column_id.map(trim_optional);
        patch.labels = patch.labels.map(|l| normalize_labels(&l));
        self.repo.update_task(task_id, &patch, Utc::now())
    }

    /// Move a task. A zero position means "append by current time".
    pub fn move_task(&self, mut input: MoveTaskInput) -> Result<()> {
        require(&input.task_id, "task id is required")?;
        if input.position == 0.0 {
            input.position = now_position();
        }
        input.column_id = trim_optional(input.column_id);
        input.status = trim_optional(input.status);
        self.repo.move_task(&input, Utc::now())
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        require(&filter.workspace_id, "workspace id is required")?;
        let mut filter = filter.clone();
        filter.title_query = filter.title_query.trim().to_string();
        self.repo.list_tasks(&filter)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        require(task_id, "task id is required")?;
        self.repo.get_task(task_id)
    }
}

pub(crate) fn require(value: &str, msg: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(msg))
    } else {
        Ok(())
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn now_position() -> f64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as f64
}
