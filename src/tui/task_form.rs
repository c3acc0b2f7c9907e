//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` used to create and edit tasks: field
//! focus order, the priority and status selectors, and turning the form into
//! a create or update request.

use chrono::{DateTime, Utc};

use crate::board::Column;
use crate::dates::DateLocale;
use crate::fields::{normalize_priority, PRIORITY_LABELS, PRIORITY_NONE};
use crate::task::{CreateTaskInput, Task, TaskPatch};
use crate::tui::enums::TaskFormMode;
use crate::tui::input::InputField;
use crate::tui::utils::summarize_description;

/// Focus order of the form fields.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const DUE_FIELD: usize = 2;
pub const PRIORITY_FIELD: usize = 3;
pub const STATUS_FIELD: usize = 4;
pub const FIELD_COUNT: usize = 5;

/// One choice in the status selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusOption {
    pub column_id: Option<String>,
    pub status: Option<String>,
    pub label: String,
    pub color: Option<String>,
}

impl StatusOption {
    fn none() -> Self {
        Self {
            column_id: None,
            status: None,
            label: "(none)".to_string(),
            color: None,
        }
    }
}

/// What a submitted form asks the services to do.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskSubmission {
    Create(CreateTaskInput),
    Update { task_id: String, patch: TaskPatch },
}

/// Task form for creating or editing a task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskForm {
    pub mode: TaskFormMode,
    pub title: InputField,
    /// Shows the first line of the description.
    pub description: InputField,
    /// The full markdown body that gets saved.
    pub description_full: String,
    pub due: InputField,
    pub priority: usize,
    pub status_options: Vec<StatusOption>,
    pub status: usize,
    pub current_field: usize,
    pub error: Option<String>,
}

impl TaskForm {
    /// Empty form for a new task on a board with the given columns.
    pub fn new(columns: &[Column]) -> Self {
        let (status_options, status) = build_status_options(columns, None);
        Self {
            mode: TaskFormMode::Create,
            title: InputField::new(),
            description: InputField::new(),
            description_full: String::new(),
            due: InputField::new(),
            priority: 0,
            status_options,
            status,
            current_field: TITLE_FIELD,
            error: None,
        }
    }

    /// Form populated from an existing task.
    pub fn from_task(task: &Task, columns: &[Column], locale: &DateLocale) -> Self {
        let (status_options, status) = build_status_options(columns, Some(task));
        let due = task.due_at.map(|d| locale.format_date(d)).unwrap_or_default();
        Self {
            mode: TaskFormMode::Edit {
                task_id: task.id.clone(),
            },
            title: InputField::with_value(&task.title),
            description: InputField::with_value(&summarize_description(&task.description_md)),
            description_full: task.description_md.clone(),
            due: InputField::with_value(&due),
            priority: normalize_priority(task.priority).min(PRIORITY_NONE) as usize,
            status_options,
            status,
            current_field: TITLE_FIELD,
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, TaskFormMode::Edit { .. })
    }

    pub fn title_label(&self) -> &'static str {
        if self.is_edit() {
            "Edit Task"
        } else {
            "Create Task"
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    pub fn is_last_field(&self) -> bool {
        self.current_field == FIELD_COUNT - 1
    }

    /// Text field under focus, if the focus is on one.
    pub fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            _ => None,
        }
    }

    /// Type into the focused text field. Typing into the description
    /// replaces the full body with what is shown.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.current_input() {
            field.handle_char(c);
        }
        self.sync_description();
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_backspace();
        }
        self.sync_description();
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_delete();
        }
        self.sync_description();
    }

    fn sync_description(&mut self) {
        if self.current_field == DESCRIPTION_FIELD {
            self.description_full = self.description.value.clone();
        }
    }

    /// Left/right: cycle a selector, or move the cursor in a text field.
    pub fn handle_left_right(&mut self, right: bool) {
        let delta = if right { 1 } else { -1 };
        match self.current_field {
            PRIORITY_FIELD => self.cycle_priority(delta),
            STATUS_FIELD => self.cycle_status(delta),
            _ => {
                if let Some(field) = self.current_input() {
                    if right {
                        field.move_cursor_right()
                    } else {
                        field.move_cursor_left()
                    }
                }
            }
        }
    }

    pub fn cycle_priority(&mut self, delta: i32) {
        let len = PRIORITY_LABELS.len() as i32;
        self.priority = (self.priority as i32 + delta).rem_euclid(len) as usize;
    }

    pub fn set_priority(&mut self, priority: usize) {
        if priority < PRIORITY_LABELS.len() {
            self.priority = priority;
        }
    }

    pub fn cycle_status(&mut self, delta: i32) {
        if self.status_options.is_empty() {
            return;
        }
        let len = self.status_options.len() as i32;
        self.status = (self.status as i32 + delta).rem_euclid(len) as usize;
    }

    pub fn priority_label(&self) -> String {
        format!("{} - {}", self.priority, PRIORITY_LABELS[self.priority.min(PRIORITY_LABELS.len() - 1)])
    }

    pub fn selected_status(&self) -> Option<&StatusOption> {
        self.status_options.get(self.status)
    }

    pub fn status_label(&self) -> &str {
        self.selected_status().map(|o| o.label.as_str()).unwrap_or("(none)")
    }

    /// Swap in text returned by the external editor.
    pub fn set_description(&mut self, text: &str) {
        self.description_full = text.to_string();
        self.description.set_value(&summarize_description(text));
    }

    /// Validate and build the request. Errors are shown inline on the form.
    pub fn submit(
        &self,
        provider_id: &str,
        workspace_id: &str,
        board_id: &str,
        columns: &[Column],
        locale: &DateLocale,
    ) -> Result<TaskSubmission, String> {
        let title = self.title.value.trim().to_string();
        if title.is_empty() {
            return Err("title is required".to_string());
        }
        let due_at: Option<DateTime<Utc>> = locale.parse_due(&self.due.value)?;
        let priority = self.priority as i32;
        let mut description = self.description_full.trim().to_string();
        if description.is_empty() {
            description = self.description.value.trim().to_string();
        }
        let (column_id, status) = match self.selected_status() {
            Some(option) => (option.column_id.clone(), option.status.clone()),
            None => (None, None),
        };

        match &self.mode {
            TaskFormMode::Create => {
                let (column_id, status) = match (column_id, status) {
                    (None, None) => first_column_status(columns),
                    other => other,
                };
                Ok(TaskSubmission::Create(CreateTaskInput {
                    provider_id: provider_id.to_string(),
                    workspace_id: workspace_id.to_string(),
                    board_id: Some(board_id.to_string()),
                    column_id,
                    title,
                    description_md: description,
                    status,
                    priority,
                    due_at,
                    labels: Vec::new(),
                }))
            }
            TaskFormMode::Edit { task_id } => Ok(TaskSubmission::Update {
                task_id: task_id.clone(),
                patch: TaskPatch {
                    title: Some(title),
                    description_md: Some(description),
                    status: Some(status),
                    priority: Some(priority),
                    due_at: Some(due_at),
                    column_id: Some(column_id),
                    labels: None,
                },
            }),
        }
    }
}

/// New tasks with no status chosen land in the first column.
fn first_column_status(columns: &[Column]) -> (Option<String>, Option<String>) {
    match columns.first() {
        Some(col) => (Some(col.id.clone()), Some(col.status_key())),
        None => (None, None),
    }
}

/// Selector options for a board, and the index to preselect.
///
/// Editing adds a leading "(none)". A task without a column but with a
/// free-text status keeps that status, matched by label or status key when
/// possible, appended otherwise.
pub fn build_status_options(columns: &[Column], task: Option<&Task>) -> (Vec<StatusOption>, usize) {
    let mut options = Vec::with_capacity(columns.len() + 1);
    let mut selected = 0;
    if task.is_some() {
        options.push(StatusOption::none());
    }

    for col in columns {
        options.push(StatusOption {
            column_id: Some(col.id.clone()),
            status: Some(col.status_key()),
            label: col.name.clone(),
            color: Some(col.color.clone()),
        });
        if task.and_then(|t| t.column_id.as_deref()) == Some(col.id.as_str()) {
            selected = options.len() - 1;
        }
    }

    if let Some(task) = task.filter(|t| t.column_id.is_none()) {
        let raw = task.status.as_deref().map(str::trim).unwrap_or("");
        if !raw.is_empty() {
            let matched = options.iter().position(|o| {
                o.label.eq_ignore_ascii_case(raw)
                    || o.status.as_deref().map(|s| s.eq_ignore_ascii_case(raw)).unwrap_or(false)
            });
            selected = match matched {
                Some(idx) => idx,
                None => {
                    options.push(StatusOption {
                        column_id: None,
                        status: Some(raw.to_string()),
                        label: raw.to_string(),
                        color: None,
                    });
                    options.len() - 1
                }
            };
        }
    }

    if options.is_empty() {
        options.push(StatusOption::none());
        selected = 0;
    }
    (options, selected)
}
