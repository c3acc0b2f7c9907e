//! Enumerations for TUI state management.

/// Which list the context panel shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContextMode {
    Workspace,
    Board,
}

impl ContextMode {
    pub fn title(self) -> &'static str {
        match self {
            ContextMode::Workspace => "Workspaces",
            ContextMode::Board => "Boards",
        }
    }
}

/// What the context panel's name prompt is for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContextEditMode {
    Create,
    Rename,
}

/// Whether the task form creates a new task or edits an existing one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TaskFormMode {
    Create,
    Edit { task_id: String },
}

/// Rows of the filter panel, in focus order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FilterRow {
    Workspace,
    Board,
    Status,
    Due,
    Priority,
    Sort,
}

impl FilterRow {
    pub const ALL: [FilterRow; 6] = [
        FilterRow::Workspace,
        FilterRow::Board,
        FilterRow::Status,
        FilterRow::Due,
        FilterRow::Priority,
        FilterRow::Sort,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterRow::Workspace => "Workspace",
            FilterRow::Board => "Board",
            FilterRow::Status => "Status",
            FilterRow::Due => "Due",
            FilterRow::Priority => "Priority",
            FilterRow::Sort => "Sort",
        }
    }
}

/// Where an external editor result should land.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EditorTarget {
    /// The open task form's description.
    Form,
    /// A stored task's description, saved directly.
    Task(String),
}
