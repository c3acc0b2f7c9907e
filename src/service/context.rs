//! Workspaces, boards and columns: listing, creation, renames, reorder, and
//! resolving which workspace and board should be active.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};
use uuid::Uuid;

use crate::board::{default_columns, sort_columns, Board, Column, ColumnSpec, Workspace};
use crate::error::{Error, Result};
use crate::fields::{is_hex_color, normalize_hex_color};
use crate::repository::SetupRepository;
use crate::service::task::require;

/// Name given to the board created alongside a new workspace.
pub const MAIN_BOARD_NAME: &str = "Main";

/// Which workspace and board to activate, in preference order.
///
/// Workspace: the first of `workspace_ids` that exists, else the first
/// workspace. Board: the first of `board_ids` that belongs to it, then the
/// remembered board for that workspace, then `fallback_board_id`, then the
/// first board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextRequest {
    pub workspace_ids: Vec<String>,
    pub board_ids: Vec<String>,
    pub last_board_by_workspace: BTreeMap<String, String>,
    pub fallback_board_id: Option<String>,
}

/// Everything the UI needs after a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub workspaces: Vec<Workspace>,
    pub boards: Vec<Board>,
    pub columns: Vec<Column>,
    pub workspace_id: String,
    pub board_id: String,
}

#[derive(Debug, Clone)]
pub struct ContextService<R> {
    repo: R,
}

impl<R: SetupRepository> ContextService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        self.repo.list_workspaces()
    }

    pub fn list_boards(&self, workspace_id: &str) -> Result<Vec<Board>> {
        require(workspace_id, "workspace id is required")?;
        self.repo.list_boards(workspace_id)
    }

    /// Columns of a board ordered by position.
    pub fn list_columns(&self, board_id: &str) -> Result<Vec<Column>> {
        require(board_id, "board id is required")?;
        let mut columns = self.repo.list_columns(board_id)?;
        sort_columns(&mut columns);
        Ok(columns)
    }

    /// Create a workspace together with a "Main" board using the default columns.
    pub fn create_workspace(&self, provider_id: &str, name: &str) -> Result<(Workspace, Board)> {
        require(provider_id, "provider id is required")?;
        require(name, "workspace name is required")?;
        let workspace = self.repo.create_workspace(Workspace {
            id: Uuid::new_v4().to_string(),
            provider_id: provider_id.trim().to_string(),
            remote_id: None,
            name: name.trim().to_string(),
        })?;
        let board = self.create_board(&workspace.id, MAIN_BOARD_NAME)?;
        info!(workspace_id = %workspace.id, "workspace created");
        Ok((workspace, board))
    }

    pub fn rename_workspace(&self, workspace_id: &str, name: &str) -> Result<()> {
        require(workspace_id, "workspace id is required")?;
        require(name, "name is required")?;
        self.repo.rename_workspace(workspace_id, name.trim())
    }

    /// Create a board with the default Todo/Doing/Done columns.
    pub fn create_board(&self, workspace_id: &str, name: &str) -> Result<Board> {
        self.create_board_with_columns(workspace_id, name, &default_columns())
            .map(|(board, _)| board)
    }

    /// Create a board and its columns in a single write.
    ///
    /// Rows with a blank name are skipped. Every kept row must carry a
    /// `#RRGGBB` color; positions are assigned 1..N in the given order.
    /// Nothing is written if any row is invalid.
    pub fn create_board_with_columns(
        &self,
        workspace_id: &str,
        name: &str,
        specs: &[ColumnSpec],
    ) -> Result<(Board, Vec<Column>)> {
        require(workspace_id, "workspace id is required")?;
        require(name, "board name is required")?;
        if specs.is_empty() {
            return Err(Error::validation("at least one column is required"));
        }

        let board = Board {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.trim().to_string(),
            remote_id: None,
            name: name.trim().to_string(),
            view_default: "list".to_string(),
        };

        let mut columns = Vec::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            let column_name = spec.name.trim();
            if column_name.is_empty() {
                continue;
            }
            let color = normalize_hex_color(&spec.color);
            if !is_hex_color(&color) {
                return Err(Error::validation(format!(
                    "column {} color must be HEX (#RRGGBB)",
                    idx + 1
                )));
            }
            columns.push(Column {
                id: Uuid::new_v4().to_string(),
                board_id: board.id.clone(),
                remote_id: None,
                name: column_name.to_string(),
                color,
                position: columns.len() as i32 + 1,
                wip_limit: None,
            });
        }
        if columns.is_empty() {
            return Err(Error::validation("at least one column name is required"));
        }

        let created = self.repo.create_board_with_columns(board, columns)?;
        debug!(board_id = %created.0.id, columns = created.1.len(), "board created");
        Ok(created)
    }

    pub fn rename_board(&self, board_id: &str, name: &str) -> Result<()> {
        require(board_id, "board id is required")?;
        require(name, "name is required")?;
        self.repo.rename_board(board_id, name.trim())
    }

    /// Persist a new column order; positions become 1..N in list order.
    pub fn reorder_columns(&self, board_id: &str, ordered_ids: &[String]) -> Result<()> {
        require(board_id, "board id is required")?;
        if ordered_ids.is_empty() {
            return Err(Error::validation("at least one column id is required"));
        }
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(ordered_ids.len());
        for (idx, id) in ordered_ids.iter().enumerate() {
            let id = id.trim();
            if id.is_empty() {
                return Err(Error::validation(format!("column id at position {} is required", idx + 1)));
            }
            if !seen.insert(id.to_string()) {
                return Err(Error::validation(format!("duplicate column id at position {}", idx + 1)));
            }
            ids.push(id.to_string());
        }
        self.repo.reorder_columns(board_id.trim(), &ids)
    }

    /// First board of every workspace, used to seed board memory.
    pub fn build_last_board_by_workspace(&self) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        for ws in self.repo.list_workspaces()? {
            if let Some(board) = self.repo.list_boards(&ws.id)?.into_iter().next() {
                out.insert(ws.id, board.id);
            }
        }
        Ok(out)
    }

    /// Resolve the active workspace and board, creating a "Main" board when
    /// the chosen workspace has none.
    pub fn resolve(&self, request: &ContextRequest) -> Result<ContextSnapshot> {
        let workspaces = self.repo.list_workspaces()?;
        let workspace_id = request
            .workspace_ids
            .iter()
            .find(|id| workspaces.iter().any(|w| &w.id == *id))
            .or_else(|| workspaces.first().map(|w| &w.id))
            .cloned()
            .ok_or_else(|| Error::validation("no workspaces available"))?;

        let mut boards = self.repo.list_boards(&workspace_id)?;
        if boards.is_empty() {
            boards.push(self.create_board(&workspace_id, MAIN_BOARD_NAME)?);
        }

        let has_board = |id: &String| boards.iter().any(|b| &b.id == id);
        let board_id = request
            .board_ids
            .iter()
            .find(|id| has_board(*id))
            .or_else(|| request.last_board_by_workspace.get(&workspace_id).filter(|id| has_board(*id)))
            .or_else(|| request.fallback_board_id.as_ref().filter(|id| has_board(*id)))
            .or_else(|| boards.first().map(|b| &b.id))
            .cloned()
            .ok_or_else(|| Error::validation("no boards available"))?;

        let columns = self.list_columns(&board_id)?;
        debug!(%workspace_id, %board_id, "context resolved");
        Ok(ContextSnapshot {
            workspaces,
            boards,
            columns,
            workspace_id,
            board_id,
        })
    }
}
