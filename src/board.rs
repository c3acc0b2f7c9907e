//! Workspace, board and column records.
//!
//! A provider owns workspaces, a workspace owns boards, and a board owns an
//! ordered set of columns. Column positions are dense from 1 after every
//! create or reorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of tasks. Only the local provider exists today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Top-level grouping of boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub provider_id: String,
    #[serde(default)]
    pub remote_id: Option<String>,
    pub name: String,
}

/// A named kanban surface containing ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub remote_id: Option<String>,
    pub name: String,
    #[serde(default = "default_view")]
    pub view_default: String,
}

fn default_view() -> String {
    "list".to_string()
}

/// An ordered stage within a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub board_id: String,
    #[serde(default)]
    pub remote_id: Option<String>,
    pub name: String,
    pub color: String,
    pub position: i32,
    #[serde(default)]
    pub wip_limit: Option<u32>,
}

impl Column {
    /// Status string stored on tasks placed in this column.
    pub fn status_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Name and color for a column that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub color: String,
}

impl ColumnSpec {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Columns every new board starts with unless the caller supplies its own.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("Todo", "#60A5FA"),
        ColumnSpec::new("Doing", "#F59E0B"),
        ColumnSpec::new("Done", "#22C55E"),
    ]
}

/// Sort columns by position in place.
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by_key(|c| c.position);
}
