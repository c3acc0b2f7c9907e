//! Overlay panels: keybinding help, filter/sort, and the workspace/board
//! context switcher with its name prompt, board wizard and column reorder.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::board::Column;
use crate::tui::app::{cycle_id, App, Surface};
use crate::tui::board_form::{BoardCreateForm, ColumnOrderForm};
use crate::tui::effects::{ContextOp, Effect};
use crate::tui::enums::{ContextEditMode, ContextMode, FilterRow};
use crate::tui::filters::clamp_index;
use crate::tui::input::InputField;
use crate::tui::keybinds::KeybindPanel;

/// Focus within the filter panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPanel {
    pub focus: usize,
}

impl FilterPanel {
    pub fn row(&self) -> FilterRow {
        FilterRow::ALL[self.focus % FilterRow::ALL.len()]
    }

    fn move_focus(&mut self, delta: i32) {
        let len = FilterRow::ALL.len() as i32;
        self.focus = (self.focus as i32 + delta).rem_euclid(len) as usize;
    }
}

/// What the context panel is doing.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextStep {
    List,
    Prompt {
        mode: ContextEditMode,
        target_id: Option<String>,
        input: InputField,
    },
    Wizard(BoardCreateForm),
    Reorder(ColumnOrderForm),
}

/// The workspace/board switcher.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextPanel {
    pub mode: ContextMode,
    pub filter: InputField,
    pub selected: usize,
    pub step: ContextStep,
    /// Board whose columns are being fetched for the reorder tool.
    pub pending_reorder: Option<String>,
    pub error: Option<String>,
}

impl ContextPanel {
    pub fn new(mode: ContextMode) -> Self {
        Self {
            mode,
            filter: InputField::new(),
            selected: 0,
            step: ContextStep::List,
            pending_reorder: None,
            error: None,
        }
    }
}

enum ListOutcome {
    Stay(Vec<Effect>),
    Close,
    Select,
}

/// One row of the context list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextItem {
    pub id: String,
    pub name: String,
}

impl App {
    /// Workspaces or boards whose name contains the panel filter.
    pub(crate) fn context_items(&self, panel: &ContextPanel) -> Vec<ContextItem> {
        let query = panel.filter.value.trim().to_lowercase();
        let all: Vec<ContextItem> = match panel.mode {
            ContextMode::Workspace => self
                .workspaces
                .iter()
                .map(|w| ContextItem {
                    id: w.id.clone(),
                    name: w.name.clone(),
                })
                .collect(),
            ContextMode::Board => self
                .boards
                .iter()
                .map(|b| ContextItem {
                    id: b.id.clone(),
                    name: b.name.clone(),
                })
                .collect(),
        };
        all.into_iter()
            .filter(|item| query.is_empty() || item.name.to_lowercase().contains(&query))
            .collect()
    }

    pub(crate) fn open_context(&mut self, mode: ContextMode) {
        let mut panel = ContextPanel::new(mode);
        self.select_active_item(&mut panel);
        self.surface = Surface::Context(Box::new(panel));
    }

    fn select_active_item(&self, panel: &mut ContextPanel) {
        let active = match panel.mode {
            ContextMode::Workspace => &self.workspace_id,
            ContextMode::Board => &self.board_id,
        };
        panel.selected = self
            .context_items(panel)
            .iter()
            .position(|item| &item.id == active)
            .unwrap_or(0);
    }

    /// Keep the context list selection valid after the lists change.
    pub(crate) fn clamp_context_panel(&mut self) {
        let len = match &self.surface {
            Surface::Context(panel) => self.context_items(panel).len(),
            _ => return,
        };
        if let Surface::Context(panel) = &mut self.surface {
            panel.selected = clamp_index(panel.selected, len);
        }
    }

    // ----- keybinding help -----

    pub(crate) fn handle_keybinds_key(&mut self, mut panel: KeybindPanel, key: KeyEvent) -> Vec<Effect> {
        let search_active = !self.filters.search.is_empty();
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => return Vec::new(),
            KeyCode::Up => panel.selected = panel.selected.saturating_sub(1),
            KeyCode::Down => panel.selected += 1,
            KeyCode::Enter => {
                if let Some(action) = panel.selected_action(search_active) {
                    return vec![Effect::Dispatch(action)];
                }
            }
            _ => {
                let before = panel.filter.value.clone();
                if panel.filter.handle_key(key) && panel.filter.value != before {
                    panel.selected = 0;
                }
            }
        }
        panel.clamp(search_active);
        self.surface = Surface::Keybinds(panel);
        Vec::new()
    }

    // ----- filters -----

    pub(crate) fn handle_filters_key(&mut self, mut panel: FilterPanel, key: KeyEvent) -> Vec<Effect> {
        let effects = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => return Vec::new(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                panel.move_focus(-1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                panel.move_focus(1);
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') => self.adjust_filter(panel.row(), -1),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_filter(panel.row(), 1),
            _ => Vec::new(),
        };
        self.surface = Surface::Filters(panel);
        effects
    }

    /// Cycle one filter row. Workspace and board changes go through a
    /// context reload; the rest reload tasks.
    fn adjust_filter(&mut self, row: FilterRow, delta: i32) -> Vec<Effect> {
        match row {
            FilterRow::Workspace => {
                match cycle_id(self.workspaces.iter().map(|w| w.id.as_str()), &self.workspace_id, delta) {
                    Some(id) => vec![Effect::LoadContext(self.workspace_request(&id))],
                    None => Vec::new(),
                }
            }
            FilterRow::Board => match cycle_id(self.boards.iter().map(|b| b.id.as_str()), &self.board_id, delta) {
                Some(id) => vec![Effect::LoadContext(self.board_request(&id))],
                None => Vec::new(),
            },
            FilterRow::Status => {
                self.cycle_column_filter(delta);
                self.load_tasks()
            }
            FilterRow::Due => {
                self.filters.due = self.filters.due.cycle(delta);
                self.load_tasks()
            }
            FilterRow::Priority => {
                self.cycle_priority_filter(delta);
                self.load_tasks()
            }
            FilterRow::Sort => {
                self.sort = self.sort.cycle(delta);
                self.load_tasks()
            }
        }
    }

    /// Display value of a filter row.
    pub(crate) fn filter_value(&self, row: FilterRow) -> String {
        match row {
            FilterRow::Workspace => self.workspace_name().to_string(),
            FilterRow::Board => self.board_name().to_string(),
            FilterRow::Status => self.column_filter_label(),
            FilterRow::Due => self.filters.due.label().to_string(),
            FilterRow::Priority => self.priority_filter_label(),
            FilterRow::Sort => self.sort.label().to_string(),
        }
    }

    // ----- context switcher -----

    pub(crate) fn handle_context_key(&mut self, mut panel: ContextPanel, key: KeyEvent) -> Vec<Effect> {
        panel.error = None;
        let step = std::mem::replace(&mut panel.step, ContextStep::List);
        let effects = match step {
            ContextStep::List => match self.context_list_key(&mut panel, key) {
                ListOutcome::Stay(effects) => effects,
                ListOutcome::Close => return Vec::new(),
                ListOutcome::Select => return self.context_select(panel),
            },
            ContextStep::Prompt { mode, target_id, input } => {
                self.context_prompt_key(&mut panel, mode, target_id, input, key)
            }
            ContextStep::Wizard(form) => self.context_wizard_key(&mut panel, form, key),
            ContextStep::Reorder(form) => self.context_reorder_key(&mut panel, form, key),
        };
        self.surface = Surface::Context(Box::new(panel));
        effects
    }

    /// List keys. Command letters only act while the filter is empty;
    /// otherwise they type into it.
    fn context_list_key(&mut self, panel: &mut ContextPanel, key: KeyEvent) -> ListOutcome {
        let items = self.context_items(panel);
        let command = panel.filter.value.is_empty() && !key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ListOutcome::Close,
            KeyCode::Enter => return ListOutcome::Select,
            KeyCode::Up => panel.selected = panel.selected.saturating_sub(1),
            KeyCode::Down => panel.selected = clamp_index(panel.selected + 1, items.len()),
            KeyCode::Char('n') if command => {
                panel.step = match panel.mode {
                    ContextMode::Workspace => ContextStep::Prompt {
                        mode: ContextEditMode::Create,
                        target_id: None,
                        input: InputField::new(),
                    },
                    ContextMode::Board => ContextStep::Wizard(BoardCreateForm::new()),
                };
            }
            KeyCode::Char('r') if command => {
                if let Some(item) = items.get(panel.selected) {
                    panel.step = ContextStep::Prompt {
                        mode: ContextEditMode::Rename,
                        target_id: Some(item.id.clone()),
                        input: InputField::with_value(&item.name),
                    };
                }
            }
            KeyCode::Char('o') if command && panel.mode == ContextMode::Board => {
                return ListOutcome::Stay(self.begin_reorder(panel, items.get(panel.selected)));
            }
            KeyCode::Char('w') if command => self.switch_context_mode(panel, ContextMode::Workspace),
            KeyCode::Char('b') if command => self.switch_context_mode(panel, ContextMode::Board),
            _ => {
                let before = panel.filter.value.clone();
                if panel.filter.handle_key(key) && panel.filter.value != before {
                    panel.selected = 0;
                }
            }
        }
        ListOutcome::Stay(Vec::new())
    }

    fn switch_context_mode(&self, panel: &mut ContextPanel, mode: ContextMode) {
        if panel.mode == mode {
            return;
        }
        panel.mode = mode;
        panel.filter.clear();
        self.select_active_item(panel);
    }

    /// Enter on the list: switch to the selected item and close the panel.
    fn context_select(&mut self, panel: ContextPanel) -> Vec<Effect> {
        let Some(item) = self.context_items(&panel).into_iter().nth(panel.selected) else {
            self.surface = Surface::Context(Box::new(panel));
            return Vec::new();
        };
        info!(mode = ?panel.mode, id = %item.id, "switching context");
        let request = match panel.mode {
            ContextMode::Workspace => self.workspace_request(&item.id),
            ContextMode::Board => self.board_request(&item.id),
        };
        vec![Effect::LoadContext(request)]
    }

    /// Open the reorder tool. The active board's columns are already loaded;
    /// any other board's are fetched first.
    fn begin_reorder(&mut self, panel: &mut ContextPanel, item: Option<&ContextItem>) -> Vec<Effect> {
        let Some(item) = item else {
            panel.error = Some("no board selected".to_string());
            return Vec::new();
        };
        if item.id != self.board_id {
            panel.pending_reorder = Some(item.id.clone());
            return vec![Effect::LoadColumns {
                board_id: item.id.clone(),
            }];
        }
        match ColumnOrderForm::new(&item.id, &item.name, self.columns.clone()) {
            Ok(form) => panel.step = ContextStep::Reorder(form),
            Err(e) => panel.error = Some(e),
        }
        Vec::new()
    }

    pub(crate) fn on_columns_loaded(&mut self, board_id: String, result: Result<Vec<Column>, String>) -> Vec<Effect> {
        let board_name = self
            .boards
            .iter()
            .find(|b| b.id == board_id)
            .map(|b| b.name.clone())
            .unwrap_or_default();
        let Surface::Context(panel) = &mut self.surface else {
            return Vec::new();
        };
        if panel.pending_reorder.as_deref() != Some(board_id.as_str()) || panel.step != ContextStep::List {
            return Vec::new();
        }
        panel.pending_reorder = None;
        match result.and_then(|columns| ColumnOrderForm::new(&board_id, &board_name, columns)) {
            Ok(form) => panel.step = ContextStep::Reorder(form),
            Err(e) => panel.error = Some(e),
        }
        Vec::new()
    }

    fn context_prompt_key(
        &mut self,
        panel: &mut ContextPanel,
        mode: ContextEditMode,
        target_id: Option<String>,
        mut input: InputField,
        key: KeyEvent,
    ) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => return Vec::new(),
            KeyCode::Enter => {
                let name = input.value.trim().to_string();
                if name.is_empty() {
                    panel.error = Some("name is required".to_string());
                } else if let Some(op) = self.context_name_op(panel.mode, mode, target_id.clone(), name) {
                    return vec![Effect::ContextOp {
                        op,
                        then: self.current_request(),
                    }];
                }
            }
            _ => {
                input.handle_key(key);
            }
        }
        panel.step = ContextStep::Prompt { mode, target_id, input };
        Vec::new()
    }

    fn context_name_op(
        &self,
        panel_mode: ContextMode,
        edit: ContextEditMode,
        target_id: Option<String>,
        name: String,
    ) -> Option<ContextOp> {
        match (edit, panel_mode) {
            (ContextEditMode::Create, ContextMode::Workspace) => Some(ContextOp::CreateWorkspace {
                provider_id: self.provider_id.clone(),
                name,
            }),
            (ContextEditMode::Create, ContextMode::Board) => Some(ContextOp::CreateBoard {
                workspace_id: self.workspace_id.clone(),
                name,
                columns: crate::board::default_columns(),
            }),
            (ContextEditMode::Rename, ContextMode::Workspace) => {
                target_id.map(|id| ContextOp::RenameWorkspace { id, name })
            }
            (ContextEditMode::Rename, ContextMode::Board) => target_id.map(|id| ContextOp::RenameBoard { id, name }),
        }
    }

    fn context_wizard_key(&mut self, panel: &mut ContextPanel, mut form: BoardCreateForm, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Vec::new(),
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Char('n') if ctrl => form.add_column(),
            KeyCode::Char('d') if ctrl => {
                form.remove_focused_column();
            }
            KeyCode::Left => {
                if !form.cycle_color(-1) {
                    form.current_input().move_cursor_left();
                }
            }
            KeyCode::Right => {
                if !form.cycle_color(1) {
                    form.current_input().move_cursor_right();
                }
            }
            KeyCode::Enter if form.is_last_field() => match form.validate() {
                Ok((name, columns)) => {
                    return vec![Effect::ContextOp {
                        op: ContextOp::CreateBoard {
                            workspace_id: self.workspace_id.clone(),
                            name,
                            columns,
                        },
                        then: self.current_request(),
                    }];
                }
                Err(e) => form.error = Some(e),
            },
            KeyCode::Enter => form.move_focus(1),
            KeyCode::Char(c) if !ctrl => {
                form.handle_char(c);
                form.error = None;
            }
            _ => {
                form.current_input().handle_key(key);
            }
        }
        panel.step = ContextStep::Wizard(form);
        Vec::new()
    }

    fn context_reorder_key(&mut self, panel: &mut ContextPanel, mut form: ColumnOrderForm, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => return Vec::new(),
            KeyCode::Enter => {
                return vec![Effect::ContextOp {
                    op: ContextOp::ReorderColumns {
                        board_id: form.board_id.clone(),
                        ids: form.ordered_ids(),
                    },
                    then: self.current_request(),
                }];
            }
            KeyCode::Char('k') if ctrl => {
                form.move_selected(-1);
            }
            KeyCode::Char('j') if ctrl => {
                form.move_selected(1);
            }
            KeyCode::Up if shift => {
                form.move_selected(-1);
            }
            KeyCode::Down if shift => {
                form.move_selected(1);
            }
            KeyCode::Up | KeyCode::Char('k') => form.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => form.move_selection(1),
            _ => {}
        }
        panel.step = ContextStep::Reorder(form);
        Vec::new()
    }
}
