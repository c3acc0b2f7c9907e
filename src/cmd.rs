//! Command implementations for the CLI interface.
//!
//! `ui` opens the board, `init` prints the bootstrapped defaults, and
//! `completions` writes a shell completion script.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::dates::DateLocale;
use crate::db::Store;
use crate::error::Result;
use crate::fields::{SortMode, ViewMode};
use crate::prefs::PrefsStore;
use crate::service::bootstrap::{ensure_default_setup, Setup};
use crate::service::Services;
use crate::tui::app::App;
use crate::tui::run::run_tui;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Open the interactive board (the default).
    Ui {
        /// Initial view.
        #[arg(long, value_enum, default_value_t = ViewMode::List)]
        view: ViewMode,
        /// Initial sort order.
        #[arg(long, value_enum, default_value_t = SortMode::Priority)]
        sort: SortMode,
    },

    /// Create the default provider, workspace, board and columns if missing.
    Init,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Ui {
            view: ViewMode::List,
            sort: SortMode::Priority,
        }
    }
}

/// Resolved file locations.
#[derive(Debug, Clone)]
pub struct Paths {
    pub db: PathBuf,
    pub state: PathBuf,
}

/// Launch the board against the store at `paths.db`.
pub fn cmd_ui(paths: &Paths, view: ViewMode, sort: SortMode) -> Result<()> {
    let store = Store::open(&paths.db)?;
    let setup = ensure_default_setup(&store)?;
    let services = Services::new(store);

    let prefs_store = PrefsStore::new(&paths.state);
    let mut prefs = prefs_store.load();
    prefs.merge_defaults(services.context.build_last_board_by_workspace()?);

    let locale = DateLocale::from_env();
    info!(db = %paths.db.display(), order = ?locale.order, "starting ui");
    let app = App::new(setup.provider.id, locale, prefs, view, sort);
    run_tui(app, services, prefs_store)?;
    Ok(())
}

/// Bootstrap the store and describe what exists.
pub fn cmd_init(db_path: &Path, out: &mut impl Write) -> Result<()> {
    let store = Store::open(db_path)?;
    let setup = ensure_default_setup(&store)?;
    write_setup(&setup, db_path, out)?;
    Ok(())
}

fn write_setup(setup: &Setup, db_path: &Path, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "store:     {}", db_path.display())?;
    writeln!(out, "provider:  {} ({})", setup.provider.name, setup.provider.provider_type)?;
    writeln!(out, "workspace: {}", setup.workspace.name)?;
    writeln!(out, "board:     {}", setup.board.name)?;
    let columns: Vec<String> = setup
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.color))
        .collect();
    writeln!(out, "columns:   {}", columns.join(", "))
}

/// Write a completion script for `shell` to stdout.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("kanji.json");

        let mut out = Vec::new();
        cmd_init(&db, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("workspace: Default Workspace"));
        assert!(text.contains("board:     Default Board"));
        assert!(text.contains("Todo #60A5FA, Doing #F59E0B, Done #22C55E"));
        assert!(db.exists());

        let mut again = Vec::new();
        cmd_init(&db, &mut again).unwrap();
        assert_eq!(text, String::from_utf8(again).unwrap());
    }
}
