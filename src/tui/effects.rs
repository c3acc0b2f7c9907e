//! Events fed into the reducer, effects it asks for, and the worker-side
//! executor that turns store-bound effects back into events.

use crossterm::event::KeyEvent;
use tracing::{debug, info, warn};

use crate::board::{Column, ColumnSpec};
use crate::error;
use crate::prefs::{PrefsStore, UiPrefs};
use crate::service::context::{ContextRequest, ContextSnapshot};
use crate::service::Services;
use crate::task::{AddCommentInput, Comment, CreateTaskInput, MoveTaskInput, Task, TaskFilter, TaskPatch};
use crate::tui::enums::EditorTarget;
use crate::tui::keybinds::Action;

/// Everything the reducer reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    TasksLoaded(Result<Vec<Task>, String>),
    CommentsLoaded {
        task_id: String,
        result: Result<Vec<Comment>, String>,
    },
    ColumnsLoaded {
        board_id: String,
        result: Result<Vec<Column>, String>,
    },
    ContextLoaded {
        result: Result<ContextSnapshot, String>,
        note: Option<String>,
    },
    /// Outcome of a create/update/move/comment; `Ok` carries the note to show.
    OpDone(Result<String, String>),
    DescriptionEdited {
        target: EditorTarget,
        result: Result<String, String>,
    },
    ExecuteAction(Action),
}

/// Changes to workspaces, boards and columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextOp {
    CreateWorkspace { provider_id: String, name: String },
    CreateBoard { workspace_id: String, name: String, columns: Vec<ColumnSpec> },
    RenameWorkspace { id: String, name: String },
    RenameBoard { id: String, name: String },
    ReorderColumns { board_id: String, ids: Vec<String> },
}

impl ContextOp {
    fn note(&self) -> &'static str {
        match self {
            ContextOp::CreateWorkspace { .. } => "workspace created",
            ContextOp::CreateBoard { .. } => "board created",
            ContextOp::RenameWorkspace { .. } => "workspace renamed",
            ContextOp::RenameBoard { .. } => "board renamed",
            ContextOp::ReorderColumns { .. } => "columns reordered",
        }
    }
}

/// Work the reducer hands back to the runtime.
#[derive(Debug, Clone)]
pub enum Effect {
    LoadTasks(TaskFilter),
    LoadComments { task_id: String },
    LoadColumns { board_id: String },
    CreateTask(CreateTaskInput),
    UpdateTask { task_id: String, patch: TaskPatch, note: String },
    MoveTask { input: MoveTaskInput, note: String },
    AddComment(AddCommentInput),
    LoadContext(ContextRequest),
    /// Apply `op`, then resolve `then` (with any newly created id preferred).
    ContextOp { op: ContextOp, then: ContextRequest },
    SavePrefs(UiPrefs),
    /// Runs on the UI thread with the terminal suspended.
    OpenEditor { target: EditorTarget, text: String },
    /// Re-enters the reducer as `Event::ExecuteAction`.
    Dispatch(Action),
}

impl Effect {
    /// True for effects the worker thread can run.
    pub fn is_store_bound(&self) -> bool {
        !matches!(self, Effect::OpenEditor { .. } | Effect::Dispatch(_))
    }
}

/// Owns the services on the worker thread.
pub struct EffectRunner {
    services: Services,
    prefs: PrefsStore,
}

impl EffectRunner {
    pub fn new(services: Services, prefs: PrefsStore) -> Self {
        Self { services, prefs }
    }

    /// Run a store-bound effect and return the event carrying its result.
    ///
    /// Editor and dispatch effects belong to the UI thread and yield `None`
    /// here, as does saving preferences.
    pub fn execute(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::LoadTasks(filter) => {
                debug!(workspace_id = %filter.workspace_id, "loading tasks");
                Some(Event::TasksLoaded(
                    self.services.tasks.list_tasks(&filter).map_err(|e| e.to_string()),
                ))
            }
            Effect::LoadComments { task_id } => {
                let result = self.services.comments.list_comments(&task_id).map_err(|e| e.to_string());
                Some(Event::CommentsLoaded { task_id, result })
            }
            Effect::LoadColumns { board_id } => {
                let result = self.services.context.list_columns(&board_id).map_err(|e| e.to_string());
                Some(Event::ColumnsLoaded { board_id, result })
            }
            Effect::CreateTask(input) => Some(op_done(
                self.services.tasks.create_task(input).map(|_| "task created".to_string()),
            )),
            Effect::UpdateTask { task_id, patch, note } => {
                Some(op_done(self.services.tasks.update_task(&task_id, patch).map(|_| note)))
            }
            Effect::MoveTask { input, note } => Some(op_done(self.services.tasks.move_task(input).map(|_| note))),
            Effect::AddComment(input) => Some(op_done(
                self.services.comments.add_comment(input).map(|_| "comment added".to_string()),
            )),
            Effect::LoadContext(request) => Some(Event::ContextLoaded {
                result: self.services.context.resolve(&request).map_err(|e| e.to_string()),
                note: None,
            }),
            Effect::ContextOp { op, then } => {
                let note = op.note();
                match self.apply_context_op(op, then) {
                    Ok(snapshot) => {
                        info!(note, "context updated");
                        Some(Event::ContextLoaded {
                            result: Ok(snapshot),
                            note: Some(note.to_string()),
                        })
                    }
                    Err(e) => Some(Event::ContextLoaded {
                        result: Err(e.to_string()),
                        note: None,
                    }),
                }
            }
            Effect::SavePrefs(prefs) => {
                if let Err(e) = self.prefs.save(&prefs) {
                    warn!(path = %self.prefs.path().display(), error = %e, "failed to save ui state");
                }
                None
            }
            Effect::OpenEditor { .. } | Effect::Dispatch(_) => None,
        }
    }

    fn apply_context_op(&self, op: ContextOp, mut then: ContextRequest) -> error::Result<ContextSnapshot> {
        let context = &self.services.context;
        match op {
            ContextOp::CreateWorkspace { provider_id, name } => {
                let (workspace, board) = context.create_workspace(&provider_id, &name)?;
                then.workspace_ids.insert(0, workspace.id);
                then.board_ids.insert(0, board.id);
            }
            ContextOp::CreateBoard { workspace_id, name, columns } => {
                let (board, _) = context.create_board_with_columns(&workspace_id, &name, &columns)?;
                then.workspace_ids.insert(0, workspace_id);
                then.board_ids.insert(0, board.id);
            }
            ContextOp::RenameWorkspace { id, name } => context.rename_workspace(&id, &name)?,
            ContextOp::RenameBoard { id, name } => context.rename_board(&id, &name)?,
            ContextOp::ReorderColumns { board_id, ids } => context.reorder_columns(&board_id, &ids)?,
        }
        context.resolve(&then)
    }
}

fn op_done(result: error::Result<String>) -> Event {
    Event::OpDone(result.map_err(|e| e.to_string()))
}
