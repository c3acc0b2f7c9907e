//! JSON file storage for workspaces, boards, columns, tasks and comments.
//!
//! `Database` is the serialized document. `Store` wraps it behind a mutex and
//! implements the repository traits; every write is applied to a copy, saved
//! with an atomic temp + rename, and only then becomes visible.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{sort_columns, Board, Column, Provider, Workspace};
use crate::error::{Error, Result};
use crate::repository::{CommentRepository, SetupRepository, TaskRepository};
use crate::task::{Comment, MoveTaskInput, Task, TaskFilter, TaskPatch};

/// On-disk document holding every record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Database {
    /// Load from a JSON file. A missing file is an empty database.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        if buf.trim().is_empty() {
            return Ok(Database::default());
        }
        Ok(serde_json::from_str(&buf)?)
    }

    /// Save to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("task", id))
    }
}

/// Shared handle to the database. Cloning shares the same document.
#[derive(Debug, Clone)]
pub struct Store {
    path: Option<PathBuf>,
    db: Arc<Mutex<Database>>,
}

impl Store {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::load(path)?;
        debug!(path = %path.display(), tasks = db.tasks.len(), "store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            db: Arc::new(Mutex::new(Database::default())),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> Result<T> {
        let guard = self.db.lock().map_err(|_| Error::StorePoisoned)?;
        Ok(f(&guard))
    }

    /// Apply `f` to a copy of the document, persist it, then publish it.
    fn write<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut guard = self.db.lock().map_err(|_| Error::StorePoisoned)?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if let Some(path) = &self.path {
            next.save(path)?;
        }
        *guard = next;
        Ok(out)
    }
}

impl TaskRepository for Store {
    fn create_task(&self, task: Task) -> Result<Task> {
        self.write(|db| {
            db.tasks.push(task.clone());
            Ok(task)
        })
    }

    fn update_task(&self, id: &str, patch: &TaskPatch, updated_at: DateTime<Utc>) -> Result<()> {
        self.write(|db| {
            let task = db.task_mut(id)?;
            if let Some(title) = &patch.title {
                task.title = title.clone();
            }
            if let Some(desc) = &patch.description_md {
                task.description_md = desc.clone();
            }
            if let Some(status) = &patch.status {
                task.status = status.clone();
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due) = patch.due_at {
                task.due_at = due;
            }
            if let Some(column_id) = &patch.column_id {
                task.column_id = column_id.clone();
            }
            if let Some(labels) = &patch.labels {
                task.labels = labels.clone();
            }
            task.updated_at = updated_at;
            Ok(())
        })
    }

    fn move_task(&self, input: &MoveTaskInput, updated_at: DateTime<Utc>) -> Result<()> {
        self.write(|db| {
            let task = db.task_mut(&input.task_id)?;
            task.column_id = input.column_id.clone();
            task.status = input.status.clone();
            task.position = input.position;
            task.updated_at = updated_at;
            Ok(())
        })
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.read(|db| {
            db.tasks
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect()
        })
    }

    fn get_task(&self, id: &str) -> Result<Task> {
        self.read(|db| db.tasks.iter().find(|t| t.id == id).cloned())?
            .ok_or_else(|| Error::not_found("task", id))
    }
}

impl CommentRepository for Store {
    fn create_comment(&self, comment: Comment) -> Result<Comment> {
        self.write(|db| {
            if !db.tasks.iter().any(|t| t.id == comment.task_id) {
                return Err(Error::not_found("task", comment.task_id.clone()));
            }
            db.comments.push(comment.clone());
            Ok(comment)
        })
    }

    fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>> {
        self.read(|db| {
            let mut comments: Vec<Comment> = db
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .cloned()
                .collect();
            comments.sort_by_key(|c| c.created_at);
            comments
        })
    }
}

impl SetupRepository for Store {
    fn list_providers(&self) -> Result<Vec<Provider>> {
        self.read(|db| db.providers.clone())
    }

    fn create_provider(&self, provider: Provider) -> Result<Provider> {
        self.write(|db| {
            db.providers.push(provider.clone());
            Ok(provider)
        })
    }

    fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        self.read(|db| db.workspaces.clone())
    }

    fn create_workspace(&self, workspace: Workspace) -> Result<Workspace> {
        self.write(|db| {
            db.workspaces.push(workspace.clone());
            Ok(workspace)
        })
    }

    fn rename_workspace(&self, id: &str, name: &str) -> Result<()> {
        self.write(|db| {
            let ws = db
                .workspaces
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or_else(|| Error::not_found("workspace", id))?;
            ws.name = name.to_string();
            Ok(())
        })
    }

    fn list_boards(&self, workspace_id: &str) -> Result<Vec<Board>> {
        self.read(|db| {
            db.boards
                .iter()
                .filter(|b| b.workspace_id == workspace_id)
                .cloned()
                .collect()
        })
    }

    fn rename_board(&self, id: &str, name: &str) -> Result<()> {
        self.write(|db| {
            let board = db
                .boards
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| Error::not_found("board", id))?;
            board.name = name.to_string();
            Ok(())
        })
    }

    fn create_board_with_columns(&self, board: Board, columns: Vec<Column>) -> Result<(Board, Vec<Column>)> {
        self.write(|db| {
            if !db.workspaces.iter().any(|w| w.id == board.workspace_id) {
                return Err(Error::not_found("workspace", board.workspace_id.clone()));
            }
            if columns.iter().any(|c| c.board_id != board.id) {
                return Err(Error::validation("column belongs to another board"));
            }
            db.boards.push(board.clone());
            db.columns.extend(columns.iter().cloned());
            Ok((board, columns))
        })
    }

    fn list_columns(&self, board_id: &str) -> Result<Vec<Column>> {
        self.read(|db| {
            let mut columns: Vec<Column> = db
                .columns
                .iter()
                .filter(|c| c.board_id == board_id)
                .cloned()
                .collect();
            sort_columns(&mut columns);
            columns
        })
    }

    fn add_columns(&self, columns: Vec<Column>) -> Result<Vec<Column>> {
        self.write(|db| {
            for column in &columns {
                if !db.boards.iter().any(|b| b.id == column.board_id) {
                    return Err(Error::not_found("board", column.board_id.clone()));
                }
            }
            db.columns.extend(columns.iter().cloned());
            Ok(columns)
        })
    }

    fn reorder_columns(&self, board_id: &str, column_ids: &[String]) -> Result<()> {
        self.write(|db| {
            let owned = db.columns.iter().filter(|c| c.board_id == board_id).count();
            if owned != column_ids.len() {
                return Err(Error::validation("column order must list every column of the board"));
            }
            for (idx, id) in column_ids.iter().enumerate() {
                let column = db
                    .columns
                    .iter_mut()
                    .find(|c| c.id == *id && c.board_id == board_id)
                    .ok_or_else(|| Error::not_found("column", id.clone()))?;
                column.position = idx as i32 + 1;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;

    fn workspace(id: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            provider_id: "p1".to_string(),
            remote_id: None,
            name: "Work".to_string(),
        }
    }

    fn board(id: &str, ws: &str) -> Board {
        Board {
            id: id.to_string(),
            workspace_id: ws.to_string(),
            remote_id: None,
            name: "Main".to_string(),
            view_default: "list".to_string(),
        }
    }

    fn column(id: &str, board_id: &str, position: i32) -> Column {
        Column {
            id: id.to_string(),
            board_id: board_id.to_string(),
            remote_id: None,
            name: id.to_uppercase(),
            color: "#60A5FA".to_string(),
            position,
            wip_limit: None,
        }
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kanji.json");
        let store = Store::open(&path).unwrap();
        store.create_workspace(workspace("w1")).unwrap();
        store.create_task(task("t1", "Persist me")).unwrap();

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.list_workspaces().unwrap().len(), 1);
        assert_eq!(reopened.get_task("t1").unwrap().title, "Persist me");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let store = Store::in_memory();
        store.create_workspace(workspace("w1")).unwrap();
        let cols = vec![column("a", "other", 1)];
        let err = store.create_board_with_columns(board("b1", "w1"), cols).unwrap_err();
        assert!(err.is_validation());
        assert!(store.list_boards("w1").unwrap().is_empty());
        assert!(store.list_columns("other").unwrap().is_empty());
    }

    #[test]
    fn test_reorder_columns_renumbers() {
        let store = Store::in_memory();
        store.create_workspace(workspace("w1")).unwrap();
        let cols = vec![column("a", "b1", 1), column("b", "b1", 2), column("c", "b1", 3)];
        store.create_board_with_columns(board("b1", "w1"), cols).unwrap();

        let order = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        store.reorder_columns("b1", &order).unwrap();
        let listed: Vec<(String, i32)> = store
            .list_columns("b1")
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.position))
            .collect();
        assert_eq!(
            listed,
            vec![("c".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 3)]
        );
    }

    #[test]
    fn test_reorder_rejects_foreign_column() {
        let store = Store::in_memory();
        store.create_workspace(workspace("w1")).unwrap();
        store
            .create_board_with_columns(board("b1", "w1"), vec![column("a", "b1", 1)])
            .unwrap();
        let err = store.reorder_columns("b1", &["zzz".to_string()]).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(store.list_columns("b1").unwrap()[0].position, 1);
    }

    #[test]
    fn test_update_task_applies_patch() {
        let store = Store::in_memory();
        store.create_task(task("t1", "Old")).unwrap();
        let patch = TaskPatch {
            title: Some("New".to_string()),
            column_id: Some(Some("c1".to_string())),
            due_at: Some(None),
            ..TaskPatch::default()
        };
        store.update_task("t1", &patch, Utc::now()).unwrap();
        let t = store.get_task("t1").unwrap();
        assert_eq!(t.title, "New");
        assert_eq!(t.column_id.as_deref(), Some("c1"));
        assert!(t.due_at.is_none());
    }

    #[test]
    fn test_comment_requires_existing_task() {
        let store = Store::in_memory();
        let comment = Comment {
            id: "c1".to_string(),
            task_id: "missing".to_string(),
            provider_id: "p1".to_string(),
            remote_id: None,
            body_md: "hi".to_string(),
            author: None,
            created_at: Utc::now(),
        };
        assert!(store.create_comment(comment).is_err());
    }
}
