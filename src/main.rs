//! # kanji - terminal task board
//!
//! A keyboard-driven board for tasks grouped into workspaces, boards and
//! columns, with list and kanban views, filters, comments and an external
//! editor for descriptions.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board (creates a default workspace on first run)
//! kanji
//!
//! # Start in kanban view sorted by due date
//! kanji ui --view kanban --sort due
//!
//! # Create the defaults without opening the UI
//! kanji init
//! ```
//!
//! Data is stored as one JSON file in the platform data directory
//! (`--db` to override). The last workspace and board per workspace are
//! remembered in a separate state file (`--state`). Set `KANJI_LOG=debug` to
//! get detailed logs in the log file.

use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod prefs;
pub mod repository;
pub mod service;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod board_form;
    pub mod colors;
    pub mod editor;
    pub mod effects;
    pub mod enums;
    pub mod filters;
    pub mod input;
    pub mod input_mode;
    pub mod keybinds;
    pub mod panels;
    pub mod render;
    pub mod run;
    pub mod task_form;
    pub mod utils;
    pub mod viewer;
}

use cli::Cli;
use cmd::*;

/// Send tracing output to `path`, filtered by `KANJI_LOG` (default `warn`).
fn configure_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env("KANJI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let command = cli.command.clone().unwrap_or_default();
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return ExitCode::SUCCESS;
    }

    let log_path = cli.log_path();
    if let Err(e) = configure_logging(&log_path) {
        eprintln!("warning: cannot write log file {}: {e}", log_path.display());
    }

    let paths = cli.paths();
    let result = match command {
        Commands::Ui { view, sort } => cmd_ui(&paths, view, sort),
        Commands::Init => cmd_init(&paths.db, &mut std::io::stdout()),
        Commands::Completions { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
