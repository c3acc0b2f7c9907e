//! External editor hand-off for task descriptions.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

/// Editors tried in order when `$EDITOR` is not set.
const FALLBACK_EDITORS: [&str; 3] = ["nvim", "vim", "vi"];

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no editor found (set $EDITOR or install nvim/vim/vi)")]
    NotFound,
    #[error("editor failed: {0}")]
    Process(String),
    #[error("editor io error: {0}")]
    Io(#[from] io::Error),
}

/// `$EDITOR` when set, otherwise the first fallback found on `PATH`.
pub fn choose_editor() -> Option<String> {
    if let Ok(editor) = env::var("EDITOR") {
        let editor = editor.trim();
        if !editor.is_empty() {
            return Some(editor.to_string());
        }
    }
    let path = env::var_os("PATH")?;
    FALLBACK_EDITORS
        .iter()
        .find(|name| env::split_paths(&path).any(|dir| is_executable(&dir.join(name))))
        .map(|name| name.to_string())
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Edit `initial` with the preferred editor.
pub fn edit_text(initial: &str) -> Result<String, EditorError> {
    let editor = choose_editor().ok_or(EditorError::NotFound)?;
    edit_with(&editor, initial)
}

/// Write `initial` to a temp file, run `editor` on it, and read it back.
///
/// The editor string may carry arguments (`code --wait`). Trailing newlines
/// are dropped from the result. The temp file is removed on return.
pub fn edit_with(editor: &str, initial: &str) -> Result<String, EditorError> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or(EditorError::NotFound)?;
    let args: Vec<&str> = parts.collect();

    let mut file = tempfile::Builder::new()
        .prefix("kanji-description-")
        .suffix(".md")
        .tempfile()?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;
    let path: PathBuf = file.path().to_path_buf();

    info!(%program, "launching editor");
    let status = Command::new(program)
        .args(&args)
        .arg(&path)
        .status()
        .map_err(|e| EditorError::Process(format!("{program}: {e}")))?;
    if !status.success() {
        return Err(EditorError::Process(format!("{program} exited with {status}")));
    }

    let content = fs::read_to_string(&path)?;
    debug!(bytes = content.len(), "editor returned");
    Ok(content.trim_end_matches('\n').to_string())
}
