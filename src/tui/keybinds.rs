//! Named actions and the filterable keybinding help panel.

use crate::tui::filters::clamp_index;
use crate::tui::input::InputField;

/// Every behavior reachable from the base view. The keybinding panel
/// dispatches these by name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    NewTask,
    EditTask,
    EditDescription,
    AddComment,
    Search,
    ClearSearch,
    OpenFilters,
    OpenWorkspaces,
    OpenBoards,
    PrevBoard,
    NextBoard,
    ToggleDetails,
    OpenViewer,
    MoveTask,
    ToggleView,
    CycleStatus,
    CycleDue,
    CycleSort,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

/// One row of the help panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeybindEntry {
    pub action: Action,
    pub key: &'static str,
    pub label: &'static str,
}

const fn entry(action: Action, key: &'static str, label: &'static str) -> KeybindEntry {
    KeybindEntry { action, key, label }
}

const ENTRIES: [KeybindEntry; 22] = [
    entry(Action::NewTask, "n", "Create task"),
    entry(Action::EditTask, "e", "Edit selected task"),
    entry(Action::EditDescription, "E", "Edit description"),
    entry(Action::AddComment, "c", "Add comment"),
    entry(Action::Search, "/", "Search"),
    entry(Action::OpenFilters, "f", "Open filter/sort panel"),
    entry(Action::OpenWorkspaces, "w", "Open workspace switcher"),
    entry(Action::OpenBoards, "b", "Open board manager"),
    entry(Action::PrevBoard, "[", "Previous board"),
    entry(Action::NextBoard, "]", "Next board"),
    entry(Action::ToggleDetails, "d", "Toggle details pane"),
    entry(Action::OpenViewer, "Enter", "Open task viewer"),
    entry(Action::MoveTask, "m", "Move task to next status"),
    entry(Action::ToggleView, "Tab", "Switch list/kanban"),
    entry(Action::CycleStatus, "s", "Cycle status filter"),
    entry(Action::CycleDue, "z", "Cycle due filter"),
    entry(Action::CycleSort, "o", "Cycle sort mode"),
    entry(Action::MoveUp, "↑", "Move selection up"),
    entry(Action::MoveDown, "↓", "Move selection down"),
    entry(Action::MoveLeft, "←", "Move left (kanban)"),
    entry(Action::MoveRight, "→", "Move right (kanban)"),
    entry(Action::Quit, "q", "Quit"),
];

const CLEAR_SEARCH: KeybindEntry = entry(Action::ClearSearch, "x", "Clear search");

/// Entries for the current state; "clear search" only shows while a search is active.
pub fn keybind_entries(search_active: bool) -> Vec<KeybindEntry> {
    let mut entries = ENTRIES.to_vec();
    if search_active {
        entries.push(CLEAR_SEARCH);
    }
    entries
}

/// State of the open help panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeybindPanel {
    pub filter: InputField,
    pub selected: usize,
}

impl KeybindPanel {
    /// Entries whose key or label contains the filter, ignoring case.
    pub fn visible(&self, search_active: bool) -> Vec<KeybindEntry> {
        let query = self.filter.value.trim().to_lowercase();
        keybind_entries(search_active)
            .into_iter()
            .filter(|e| {
                query.is_empty()
                    || e.key.to_lowercase().contains(&query)
                    || e.label.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn clamp(&mut self, search_active: bool) {
        self.selected = clamp_index(self.selected, self.visible(search_active).len());
    }

    pub fn selected_action(&self, search_active: bool) -> Option<Action> {
        self.visible(search_active).get(self.selected).map(|e| e.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_search_only_when_searching() {
        assert!(!keybind_entries(false).iter().any(|e| e.action == Action::ClearSearch));
        assert!(keybind_entries(true).iter().any(|e| e.action == Action::ClearSearch));
    }

    #[test]
    fn test_filter_matches_key_or_label() {
        let mut panel = KeybindPanel::default();
        panel.filter.set_value("BOARD");
        let actions: Vec<_> = panel.visible(false).iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::OpenBoards, Action::PrevBoard, Action::NextBoard]);

        panel.filter.set_value("tab");
        assert_eq!(panel.selected_action(false), Some(Action::ToggleView));
    }

    #[test]
    fn test_clamp_after_narrowing() {
        let mut panel = KeybindPanel {
            selected: 10,
            ..KeybindPanel::default()
        };
        panel.filter.set_value("quit");
        panel.clamp(false);
        assert_eq!(panel.selected, 0);
        assert_eq!(panel.selected_action(false), Some(Action::Quit));
    }
}
