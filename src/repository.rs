//! Persistence contracts consumed by the application services.
//!
//! Every method takes `&self`; implementations own their synchronisation.

use chrono::{DateTime, Utc};

use crate::board::{Board, Column, Provider, Workspace};
use crate::error::Result;
use crate::task::{Comment, MoveTaskInput, Task, TaskFilter, TaskPatch};

pub trait TaskRepository {
    fn create_task(&self, task: Task) -> Result<Task>;
    fn update_task(&self, id: &str, patch: &TaskPatch, updated_at: DateTime<Utc>) -> Result<()>;
    fn move_task(&self, input: &MoveTaskInput, updated_at: DateTime<Utc>) -> Result<()>;
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
    fn get_task(&self, id: &str) -> Result<Task>;
}

pub trait CommentRepository {
    fn create_comment(&self, comment: Comment) -> Result<Comment>;
    /// Comments for a task, oldest first.
    fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>>;
}

pub trait SetupRepository {
    fn list_providers(&self) -> Result<Vec<Provider>>;
    fn create_provider(&self, provider: Provider) -> Result<Provider>;

    fn list_workspaces(&self) -> Result<Vec<Workspace>>;
    fn create_workspace(&self, workspace: Workspace) -> Result<Workspace>;
    fn rename_workspace(&self, id: &str, name: &str) -> Result<()>;

    fn list_boards(&self, workspace_id: &str) -> Result<Vec<Board>>;
    fn rename_board(&self, id: &str, name: &str) -> Result<()>;
    /// Insert a board and its columns in one write; nothing is stored on error.
    fn create_board_with_columns(&self, board: Board, columns: Vec<Column>) -> Result<(Board, Vec<Column>)>;

    fn list_columns(&self, board_id: &str) -> Result<Vec<Column>>;
    /// Append columns to an existing board in one write.
    fn add_columns(&self, columns: Vec<Column>) -> Result<Vec<Column>>;
    /// Renumber the board's columns 1..N in the given order in one write.
    fn reorder_columns(&self, board_id: &str, column_ids: &[String]) -> Result<()>;
}
