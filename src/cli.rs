use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{Commands, Paths};

/// Keyboard-driven task board for the terminal.
/// Storage defaults to the platform data directory or a path passed via --db.
#[derive(Parser, Debug)]
#[command(name = "kanji", version, about = "Terminal kanban and task board")]
pub struct Cli {
    /// Path to the JSON store.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the UI state file (last workspace and boards).
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Where log output goes; filter it with KANJI_LOG.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// `<data dir>/kanji`, or the current directory when there is none.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("kanji"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Cli {
    pub fn paths(&self) -> Paths {
        Paths {
            db: self.db.clone().unwrap_or_else(|| data_dir().join("kanji.json")),
            state: self.state.clone().unwrap_or_else(crate::prefs::PrefsStore::default_path),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| data_dir().join("kanji.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{SortMode, ViewMode};

    #[test]
    fn test_defaults_to_ui() {
        let cli = Cli::try_parse_from(["kanji"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(cli.paths().db.ends_with("kanji.json"));
    }

    #[test]
    fn test_ui_flags() {
        let cli = Cli::try_parse_from(["kanji", "ui", "--view", "kanban", "--sort", "due", "--db", "/tmp/x.json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Ui {
                view: ViewMode::Kanban,
                sort: SortMode::Due
            })
        );
        assert_eq!(cli.paths().db, PathBuf::from("/tmp/x.json"));
        assert!(Cli::try_parse_from(["kanji", "ui", "--sort", "size"]).is_err());
    }
}
