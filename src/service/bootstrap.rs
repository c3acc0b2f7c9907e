//! First-run defaults: a local provider, a workspace, a board and its columns.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::board::{default_columns, Board, Column, Provider, Workspace};
use crate::error::Result;
use crate::repository::SetupRepository;

pub const DEFAULT_WORKSPACE_NAME: &str = "Default Workspace";
pub const DEFAULT_BOARD_NAME: &str = "Default Board";

/// Records guaranteed to exist after bootstrap.
#[derive(Debug, Clone)]
pub struct Setup {
    pub provider: Provider,
    pub workspace: Workspace,
    pub board: Board,
    pub columns: Vec<Column>,
}

/// Make sure there is at least one provider, workspace, board and column set.
/// Existing records are reused; only what is missing gets created.
pub fn ensure_default_setup<R: SetupRepository>(repo: &R) -> Result<Setup> {
    let provider = match repo.list_providers()?.into_iter().next() {
        Some(p) => p,
        None => {
            info!("creating local provider");
            repo.create_provider(Provider {
                id: Uuid::new_v4().to_string(),
                provider_type: "local".to_string(),
                name: "Local".to_string(),
                created_at: Utc::now(),
            })?
        }
    };

    let workspace = match repo.list_workspaces()?.into_iter().next() {
        Some(w) => w,
        None => {
            info!("creating default workspace");
            repo.create_workspace(Workspace {
                id: Uuid::new_v4().to_string(),
                provider_id: provider.id.clone(),
                remote_id: None,
                name: DEFAULT_WORKSPACE_NAME.to_string(),
            })?
        }
    };

    let board = match repo.list_boards(&workspace.id)?.into_iter().next() {
        Some(b) => b,
        None => {
            let board = Board {
                id: Uuid::new_v4().to_string(),
                workspace_id: workspace.id.clone(),
                remote_id: None,
                name: DEFAULT_BOARD_NAME.to_string(),
                view_default: "list".to_string(),
            };
            let columns = build_columns(&board.id);
            repo.create_board_with_columns(board, columns)?.0
        }
    };

    let mut columns = repo.list_columns(&board.id)?;
    if columns.is_empty() {
        columns = repo.add_columns(build_columns(&board.id))?;
    }

    Ok(Setup {
        provider,
        workspace,
        board,
        columns,
    })
}

fn build_columns(board_id: &str) -> Vec<Column> {
    default_columns()
        .into_iter()
        .enumerate()
        .map(|(idx, spec)| Column {
            id: Uuid::new_v4().to_string(),
            board_id: board_id.to_string(),
            remote_id: None,
            name: spec.name,
            color: spec.color,
            position: idx as i32 + 1,
            wip_limit: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    #[test]
    fn test_bootstrap_creates_defaults_once() {
        let store = Store::in_memory();
        let first = ensure_default_setup(&store).unwrap();
        assert_eq!(first.provider.provider_type, "local");
        assert_eq!(first.workspace.name, DEFAULT_WORKSPACE_NAME);
        assert_eq!(first.board.name, DEFAULT_BOARD_NAME);
        let positions: Vec<_> = first.columns.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);

        let second = ensure_default_setup(&store).unwrap();
        assert_eq!(second.provider.id, first.provider.id);
        assert_eq!(second.board.id, first.board.id);
        assert_eq!(store.list_workspaces().unwrap().len(), 1);
    }
}
