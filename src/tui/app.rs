//! Application state and the reducer that drives the terminal interface.
//!
//! `App::update` takes one `Event` and returns the effects it needs run. It
//! never touches the store or the terminal itself; the runtime executes the
//! effects and feeds their results back in as further events.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::board::{Board, Column, Workspace};
use crate::dates::DateLocale;
use crate::fields::{SortMode, ViewMode, PRIORITY_LABELS};
use crate::prefs::UiPrefs;
use crate::service::context::{ContextRequest, ContextSnapshot};
use crate::task::{Comment, MoveTaskInput, Task, TaskFilter, TaskPatch};
use crate::tui::effects::{Effect, Event};
use crate::tui::enums::{ContextMode, EditorTarget};
use crate::tui::filters::{clamp_index, tasks_for_column, visible_tasks, TaskFilters};
use crate::tui::input::InputField;
use crate::tui::keybinds::{Action, KeybindPanel};
use crate::tui::panels::{ContextPanel, FilterPanel};
use crate::tui::task_form::TaskForm;
use crate::tui::viewer::TaskViewer;

/// The one surface that owns keystrokes. Opening a surface replaces the
/// previous one.
#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    Base,
    Search(InputField),
    Comment { task_id: String, input: InputField },
    TaskForm(Box<TaskForm>),
    Context(Box<ContextPanel>),
    Filters(FilterPanel),
    Keybinds(KeybindPanel),
    Viewer(TaskViewer),
}

/// Main application state.
pub struct App {
    pub(crate) provider_id: String,
    pub(crate) locale: DateLocale,
    pub(crate) prefs: UiPrefs,

    pub(crate) workspaces: Vec<Workspace>,
    pub(crate) boards: Vec<Board>,
    pub(crate) columns: Vec<Column>,
    pub(crate) workspace_id: String,
    pub(crate) board_id: String,

    /// Loaded tasks after client-side filters and sort.
    pub(crate) tasks: Vec<Task>,
    /// Comments for `comments_task_id`; `None` while loading.
    pub(crate) comments: Option<Vec<Comment>>,
    pub(crate) comments_task_id: Option<String>,

    pub(crate) filters: TaskFilters,
    pub(crate) sort: SortMode,
    pub(crate) view: ViewMode,
    pub(crate) selected: usize,
    pub(crate) active_column: usize,
    /// Selected row per kanban column.
    pub(crate) kanban_rows: Vec<usize>,
    pub(crate) show_details: bool,

    pub(crate) surface: Surface,
    /// Task whose viewer reopens once the nested form or comment closes.
    pub(crate) return_to_viewer: Option<String>,
    /// The single in-flight external editor session.
    pub(crate) pending_editor: Option<EditorTarget>,
    pub(crate) status: String,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) should_quit: bool,
}

impl App {
    pub fn new(provider_id: impl Into<String>, locale: DateLocale, prefs: UiPrefs, view: ViewMode, sort: SortMode) -> Self {
        Self {
            provider_id: provider_id.into(),
            locale,
            prefs,
            workspaces: Vec::new(),
            boards: Vec::new(),
            columns: Vec::new(),
            workspace_id: String::new(),
            board_id: String::new(),
            tasks: Vec::new(),
            comments: None,
            comments_task_id: None,
            filters: TaskFilters::default(),
            sort,
            view,
            selected: 0,
            active_column: 0,
            kanban_rows: Vec::new(),
            show_details: false,
            surface: Surface::Base,
            return_to_viewer: None,
            pending_editor: None,
            status: String::new(),
            width: 80,
            height: 24,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Effects to run before the first frame: resolve the remembered context.
    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::LoadContext(ContextRequest {
            workspace_ids: self.prefs.last_workspace_id.iter().cloned().collect(),
            board_ids: Vec::new(),
            last_board_by_workspace: self.prefs.last_board_by_workspace.clone(),
            fallback_board_id: None,
        })]
    }

    /// Reduce one event into new state plus the effects to run.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.clamp_viewer_scroll();
                Vec::new()
            }
            Event::TasksLoaded(result) => self.on_tasks_loaded(result),
            Event::CommentsLoaded { task_id, result } => self.on_comments_loaded(task_id, result),
            Event::ColumnsLoaded { board_id, result } => self.on_columns_loaded(board_id, result),
            Event::ContextLoaded { result, note } => self.on_context_loaded(result, note),
            Event::OpDone(result) => self.on_op_done(result),
            Event::DescriptionEdited { target, result } => self.on_description_edited(target, result),
            Event::ExecuteAction(action) => self.perform(action),
        }
    }

    /// Route a key to the active surface. The surface is taken out for the
    /// duration of the call; handlers put it back to stay open.
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        self.status.clear();
        match std::mem::replace(&mut self.surface, Surface::Base) {
            Surface::Base => self.handle_base_key(key),
            Surface::Viewer(viewer) => self.handle_viewer_key(viewer, key),
            Surface::Keybinds(panel) => self.handle_keybinds_key(panel, key),
            Surface::Filters(panel) => self.handle_filters_key(panel, key),
            Surface::Context(panel) => self.handle_context_key(*panel, key),
            Surface::Search(input) => self.handle_search_key(input, key),
            Surface::Comment { task_id, input } => self.handle_comment_key(task_id, input, key),
            Surface::TaskForm(form) => self.handle_task_form_key(*form, key),
        }
    }

    fn handle_base_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Char('?') => {
                self.surface = Surface::Keybinds(KeybindPanel::default());
                return Vec::new();
            }
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('f') => Action::OpenFilters,
            KeyCode::Char('w') => Action::OpenWorkspaces,
            KeyCode::Char('b') => Action::OpenBoards,
            KeyCode::Char('[') => Action::PrevBoard,
            KeyCode::Char(']') => Action::NextBoard,
            KeyCode::Tab => Action::ToggleView,
            KeyCode::Char('d') => Action::ToggleDetails,
            KeyCode::Char('/') => Action::Search,
            KeyCode::Char('x') => Action::ClearSearch,
            KeyCode::Char('n') => Action::NewTask,
            KeyCode::Char('e') => Action::EditTask,
            KeyCode::Char('E') => Action::EditDescription,
            KeyCode::Char('c') => Action::AddComment,
            KeyCode::Char('s') => Action::CycleStatus,
            KeyCode::Char('z') => Action::CycleDue,
            KeyCode::Char('o') => Action::CycleSort,
            KeyCode::Char('m') => Action::MoveTask,
            KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
            KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
            KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
            KeyCode::Enter => Action::OpenViewer,
            _ => return Vec::new(),
        };
        self.perform(action)
    }

    /// Run a named action. Keys and the keybinding panel both end up here.
    pub(crate) fn perform(&mut self, action: Action) -> Vec<Effect> {
        debug!(?action, "action");
        match action {
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Action::ToggleView => {
                self.view = self.view.toggle();
                self.ensure_selection();
                self.refresh_details()
            }
            Action::ToggleDetails => {
                self.show_details = !self.show_details;
                self.refresh_details()
            }
            Action::Search => {
                self.surface = Surface::Search(InputField::with_value(&self.filters.search));
                Vec::new()
            }
            Action::ClearSearch => {
                if self.filters.search.is_empty() {
                    return Vec::new();
                }
                self.filters.search.clear();
                self.load_tasks()
            }
            Action::OpenFilters => {
                self.surface = Surface::Filters(FilterPanel::default());
                Vec::new()
            }
            Action::OpenWorkspaces => {
                self.open_context(ContextMode::Workspace);
                Vec::new()
            }
            Action::OpenBoards => {
                self.open_context(ContextMode::Board);
                Vec::new()
            }
            Action::PrevBoard => self.step_board(-1),
            Action::NextBoard => self.step_board(1),
            Action::NewTask => self.open_create_form(),
            Action::EditTask => self.open_edit_form(),
            Action::EditDescription => self.edit_description_externally(),
            Action::AddComment => self.open_comment(),
            Action::OpenViewer => match self.current_task() {
                Some(task) => {
                    let task_id = task.id.clone();
                    self.open_viewer(task_id)
                }
                None => Vec::new(),
            },
            Action::MoveTask => self.move_to_next_column(),
            Action::CycleStatus => {
                self.cycle_column_filter(1);
                self.load_tasks()
            }
            Action::CycleDue => {
                self.filters.due = self.filters.due.cycle(1);
                self.load_tasks()
            }
            Action::CycleSort => {
                self.sort = self.sort.cycle(1);
                self.load_tasks()
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::MoveLeft => self.move_column(-1),
            Action::MoveRight => self.move_column(1),
        }
    }

    // ----- context requests -----

    /// Stay on the active workspace and board.
    pub(crate) fn current_request(&self) -> ContextRequest {
        self.board_request(&self.board_id)
    }

    /// Switch to a board of the active workspace.
    pub(crate) fn board_request(&self, board_id: &str) -> ContextRequest {
        ContextRequest {
            workspace_ids: vec![self.workspace_id.clone()],
            board_ids: vec![board_id.to_string()],
            last_board_by_workspace: self.prefs.last_board_by_workspace.clone(),
            fallback_board_id: None,
        }
    }

    /// Switch workspace, restoring its remembered board.
    pub(crate) fn workspace_request(&self, workspace_id: &str) -> ContextRequest {
        ContextRequest {
            workspace_ids: vec![workspace_id.to_string()],
            board_ids: Vec::new(),
            last_board_by_workspace: self.prefs.last_board_by_workspace.clone(),
            fallback_board_id: (!self.board_id.is_empty()).then(|| self.board_id.clone()),
        }
    }

    fn step_board(&mut self, delta: i32) -> Vec<Effect> {
        match cycle_id(self.boards.iter().map(|b| b.id.as_str()), &self.board_id, delta) {
            Some(board_id) => vec![Effect::LoadContext(self.board_request(&board_id))],
            None => Vec::new(),
        }
    }

    /// Task listing for the active context. Nothing is loaded before a
    /// workspace is known.
    pub(crate) fn load_tasks(&self) -> Vec<Effect> {
        if self.workspace_id.is_empty() {
            return Vec::new();
        }
        vec![Effect::LoadTasks(TaskFilter {
            workspace_id: self.workspace_id.clone(),
            board_id: (!self.board_id.is_empty()).then(|| self.board_id.clone()),
            title_query: self.filters.search.clone(),
            column_id: self.filters.column_id.clone(),
            ..TaskFilter::default()
        })]
    }

    // ----- filters -----

    /// Step the column filter through All plus each column.
    pub(crate) fn cycle_column_filter(&mut self, delta: i32) {
        let total = self.columns.len() as i32 + 1;
        let current = self
            .filters
            .column_id
            .as_ref()
            .and_then(|id| self.columns.iter().position(|c| &c.id == id))
            .map(|i| i as i32 + 1)
            .unwrap_or(0);
        let next = (current + delta).rem_euclid(total) as usize;
        self.filters.column_id = next.checked_sub(1).map(|i| self.columns[i].id.clone());
    }

    /// Step the priority filter through All plus each level.
    pub(crate) fn cycle_priority_filter(&mut self, delta: i32) {
        let total = PRIORITY_LABELS.len() as i32 + 1;
        let current = self.filters.priority.map(|p| p + 1).unwrap_or(0);
        let next = (current + delta).rem_euclid(total);
        self.filters.priority = (next > 0).then_some(next - 1);
    }

    pub(crate) fn column_filter_label(&self) -> String {
        match &self.filters.column_id {
            Some(id) => self.column_name(id),
            None => "All".to_string(),
        }
    }

    pub(crate) fn priority_filter_label(&self) -> String {
        match self.filters.priority {
            Some(p) => {
                let label = PRIORITY_LABELS.get(p as usize).copied().unwrap_or("?");
                format!("{label} ({p})")
            }
            None => "All".to_string(),
        }
    }

    pub(crate) fn column_name(&self, column_id: &str) -> String {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| column_id.to_string())
    }

    pub(crate) fn workspace_name(&self) -> &str {
        self.workspaces
            .iter()
            .find(|w| w.id == self.workspace_id)
            .map(|w| w.name.as_str())
            .unwrap_or("-")
    }

    pub(crate) fn board_name(&self) -> &str {
        self.boards
            .iter()
            .find(|b| b.id == self.board_id)
            .map(|b| b.name.as_str())
            .unwrap_or("-")
    }

    // ----- selection -----

    /// The task under the cursor in the current view.
    pub(crate) fn current_task(&self) -> Option<&Task> {
        match self.view {
            ViewMode::List => self.tasks.get(self.selected),
            ViewMode::Kanban => {
                let column = self.columns.get(self.active_column)?;
                let row = self.kanban_rows.get(self.active_column).copied().unwrap_or(0);
                tasks_for_column(&self.tasks, &column.id).get(row).copied()
            }
        }
    }

    /// Clamp every selection index into the visible task set.
    pub(crate) fn ensure_selection(&mut self) {
        self.selected = clamp_index(self.selected, self.tasks.len());
        self.kanban_rows.resize(self.columns.len(), 0);
        self.active_column = clamp_index(self.active_column, self.columns.len());
        for (row, column) in self.kanban_rows.iter_mut().zip(&self.columns) {
            *row = clamp_index(*row, tasks_for_column(&self.tasks, &column.id).len());
        }
    }

    fn move_selection(&mut self, delta: i32) -> Vec<Effect> {
        match self.view {
            ViewMode::List => {
                self.selected = step_clamped(self.selected, delta, self.tasks.len());
            }
            ViewMode::Kanban => {
                let Some(column) = self.columns.get(self.active_column) else {
                    return Vec::new();
                };
                let len = tasks_for_column(&self.tasks, &column.id).len();
                if let Some(row) = self.kanban_rows.get_mut(self.active_column) {
                    *row = step_clamped(*row, delta, len);
                }
            }
        }
        self.refresh_details()
    }

    fn move_column(&mut self, delta: i32) -> Vec<Effect> {
        if self.view != ViewMode::Kanban {
            return Vec::new();
        }
        self.active_column = step_clamped(self.active_column, delta, self.columns.len());
        self.ensure_selection();
        self.refresh_details()
    }

    /// Reload comments for the details pane, or drop them when it is hidden.
    fn refresh_details(&mut self) -> Vec<Effect> {
        if !self.show_details {
            self.comments = None;
            self.comments_task_id = None;
            return Vec::new();
        }
        match self.current_task().map(|t| t.id.clone()) {
            Some(task_id) => {
                self.comments = None;
                self.comments_task_id = Some(task_id.clone());
                vec![Effect::LoadComments { task_id }]
            }
            None => {
                self.comments = Some(Vec::new());
                self.comments_task_id = None;
                Vec::new()
            }
        }
    }

    /// Move the current task to the next column, wrapping at the end.
    fn move_to_next_column(&mut self) -> Vec<Effect> {
        let Some(task) = self.current_task() else {
            return Vec::new();
        };
        if self.columns.is_empty() {
            return Vec::new();
        }
        let current = task
            .column_id
            .as_ref()
            .and_then(|id| self.columns.iter().position(|c| &c.id == id))
            .unwrap_or(0);
        let next = &self.columns[(current + 1) % self.columns.len()];
        vec![Effect::MoveTask {
            input: MoveTaskInput {
                task_id: task.id.clone(),
                column_id: Some(next.id.clone()),
                status: Some(next.status_key()),
                position: 0.0,
            },
            note: format!("moved to {}", next.name),
        }]
    }

    fn edit_description_externally(&mut self) -> Vec<Effect> {
        if self.pending_editor.is_some() {
            self.status = "editor already open".to_string();
            return Vec::new();
        }
        let Some(task) = self.current_task() else {
            return Vec::new();
        };
        let target = EditorTarget::Task(task.id.clone());
        let text = task.description_md.clone();
        self.pending_editor = Some(target.clone());
        vec![Effect::OpenEditor { target, text }]
    }

    // ----- async results -----

    fn on_tasks_loaded(&mut self, result: Result<Vec<Task>, String>) -> Vec<Effect> {
        match result {
            Ok(tasks) => {
                self.tasks = visible_tasks(&tasks, &self.filters, self.sort, Utc::now());
                self.ensure_selection();
                if matches!(self.surface, Surface::Viewer(_)) {
                    self.clamp_viewer_scroll();
                    return Vec::new();
                }
                self.refresh_details()
            }
            Err(e) => {
                self.status = e;
                self.comments = None;
                self.comments_task_id = None;
                self.return_to_viewer = None;
                Vec::new()
            }
        }
    }

    fn on_comments_loaded(&mut self, task_id: String, result: Result<Vec<Comment>, String>) -> Vec<Effect> {
        if self.comments_task_id.as_deref() != Some(task_id.as_str()) {
            debug!(%task_id, "dropping stale comments");
            return Vec::new();
        }
        match result {
            Ok(comments) => self.comments = Some(comments),
            Err(e) => {
                self.comments = Some(Vec::new());
                self.status = e;
            }
        }
        self.clamp_viewer_scroll();
        Vec::new()
    }

    fn on_context_loaded(&mut self, result: Result<ContextSnapshot, String>, note: Option<String>) -> Vec<Effect> {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.status = e;
                return Vec::new();
            }
        };
        let board_changed = snapshot.board_id != self.board_id;
        self.workspaces = snapshot.workspaces;
        self.boards = snapshot.boards;
        self.columns = snapshot.columns;
        self.workspace_id = snapshot.workspace_id;
        self.board_id = snapshot.board_id;
        info!(workspace_id = %self.workspace_id, board_id = %self.board_id, "context loaded");

        if board_changed {
            self.filters.column_id = None;
            self.filters.priority = None;
            self.active_column = 0;
            self.kanban_rows.clear();
        } else if let Some(id) = &self.filters.column_id {
            if !self.columns.iter().any(|c| &c.id == id) {
                self.filters.column_id = None;
            }
        }
        self.ensure_selection();
        self.clamp_context_panel();
        if let Some(note) = note {
            self.status = note;
        }

        self.prefs.remember(&self.workspace_id, &self.board_id);
        let mut effects = vec![Effect::SavePrefs(self.prefs.clone())];
        effects.extend(self.load_tasks());
        effects
    }

    fn on_op_done(&mut self, result: Result<String, String>) -> Vec<Effect> {
        match result {
            Ok(note) => {
                self.status = note;
                let mut effects = self.load_tasks();
                if let Some(task_id) = self.return_to_viewer.take() {
                    if self.surface == Surface::Base {
                        effects.extend(self.open_viewer(task_id));
                    }
                }
                effects
            }
            Err(e) => {
                self.status = e;
                self.return_to_viewer = None;
                Vec::new()
            }
        }
    }

    fn on_description_edited(&mut self, target: EditorTarget, result: Result<String, String>) -> Vec<Effect> {
        if self.pending_editor.as_ref() != Some(&target) {
            return Vec::new();
        }
        self.pending_editor = None;
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                self.status = e;
                return Vec::new();
            }
        };
        match target {
            EditorTarget::Form => {
                if let Surface::TaskForm(form) = &mut self.surface {
                    form.set_description(&text);
                }
                Vec::new()
            }
            EditorTarget::Task(task_id) => vec![Effect::UpdateTask {
                task_id,
                patch: TaskPatch::description(text),
                note: "description updated".to_string(),
            }],
        }
    }
}

/// Move `idx` by `delta` inside `0..len` without wrapping.
fn step_clamped(idx: usize, delta: i32, len: usize) -> usize {
    let next = (idx as i64 + delta as i64).max(0) as usize;
    clamp_index(next, len)
}

/// The id `delta` steps from `current`, wrapping. `None` when that is
/// `current` itself or there is nothing to pick.
pub(crate) fn cycle_id<'a>(ids: impl Iterator<Item = &'a str>, current: &str, delta: i32) -> Option<String> {
    let ids: Vec<&str> = ids.collect();
    if ids.is_empty() {
        return None;
    }
    let idx = ids.iter().position(|id| *id == current).unwrap_or(0) as i32;
    let next = ids[(idx + delta).rem_euclid(ids.len() as i32) as usize];
    (next != current).then(|| next.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dates::DateOrder;
    use crate::fields::DueFilter;
    use crate::task::fixtures::task;

    pub(crate) fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub(crate) fn ch(c: char) -> Event {
        key(KeyCode::Char(c))
    }

    pub(crate) fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    pub(crate) fn column(id: &str, name: &str, position: i32) -> Column {
        Column {
            id: id.to_string(),
            board_id: "b1".to_string(),
            remote_id: None,
            name: name.to_string(),
            color: "#60A5FA".to_string(),
            position,
            wip_limit: None,
        }
    }

    pub(crate) fn snapshot() -> ContextSnapshot {
        ContextSnapshot {
            workspaces: vec![
                Workspace {
                    id: "w1".to_string(),
                    provider_id: "p1".to_string(),
                    remote_id: None,
                    name: "Work".to_string(),
                },
                Workspace {
                    id: "w2".to_string(),
                    provider_id: "p1".to_string(),
                    remote_id: None,
                    name: "Home".to_string(),
                },
            ],
            boards: vec![board("b1", "Main"), board("b2", "Side")],
            columns: vec![column("c1", "Todo", 1), column("c2", "Doing", 2), column("c3", "Done", 3)],
            workspace_id: "w1".to_string(),
            board_id: "b1".to_string(),
        }
    }

    fn board(id: &str, name: &str) -> Board {
        Board {
            id: id.to_string(),
            workspace_id: "w1".to_string(),
            remote_id: None,
            name: name.to_string(),
            view_default: "list".to_string(),
        }
    }

    pub(crate) fn task_in(id: &str, title: &str, column_id: &str, priority: i32) -> Task {
        let mut t = task(id, title);
        t.column_id = Some(column_id.to_string());
        t.priority = priority;
        t
    }

    /// An app with the default snapshot and three tasks loaded.
    pub(crate) fn loaded_app() -> App {
        let mut app = App::new("p1", DateLocale::new(DateOrder::Ymd), UiPrefs::default(), ViewMode::List, SortMode::Priority);
        app.update(Event::ContextLoaded {
            result: Ok(snapshot()),
            note: None,
        });
        app.update(Event::TasksLoaded(Ok(vec![
            task_in("t1", "Alpha", "c1", 1),
            task_in("t2", "Beta", "c1", 2),
            task_in("t3", "Gamma", "c2", 3),
        ])));
        app
    }

    #[test]
    fn test_init_uses_remembered_workspace() {
        let mut prefs = UiPrefs::default();
        prefs.remember("w2", "b9");
        let app = App::new("p1", DateLocale::new(DateOrder::Dmy), prefs, ViewMode::List, SortMode::Priority);
        match app.init().as_slice() {
            [Effect::LoadContext(req)] => {
                assert_eq!(req.workspace_ids, vec!["w2"]);
                assert_eq!(req.last_board_by_workspace.get("w2").map(String::as_str), Some("b9"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_context_loaded_saves_prefs_and_loads_tasks() {
        let mut app = App::new("p1", DateLocale::new(DateOrder::Dmy), UiPrefs::default(), ViewMode::List, SortMode::Priority);
        let effects = app.update(Event::ContextLoaded {
            result: Ok(snapshot()),
            note: Some("board created".to_string()),
        });
        assert_eq!(effects.len(), 2);
        match &effects[0] {
            Effect::SavePrefs(prefs) => assert_eq!(prefs.last_workspace_id.as_deref(), Some("w1")),
            other => panic!("unexpected {other:?}"),
        }
        match &effects[1] {
            Effect::LoadTasks(filter) => {
                assert_eq!(filter.workspace_id, "w1");
                assert_eq!(filter.board_id.as_deref(), Some("b1"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.status, "board created");
        assert_eq!(app.kanban_rows.len(), 3);
    }

    #[test]
    fn test_board_switch_resets_column_and_priority_filters() {
        let mut app = loaded_app();
        app.filters.column_id = Some("c1".to_string());
        app.filters.priority = Some(2);
        let mut snap = snapshot();
        snap.board_id = "b2".to_string();
        snap.columns = vec![column("x1", "Inbox", 1)];
        app.update(Event::ContextLoaded { result: Ok(snap), note: None });
        assert_eq!(app.filters.column_id, None);
        assert_eq!(app.filters.priority, None);
        assert_eq!(app.kanban_rows, vec![0]);
    }

    #[test]
    fn test_tasks_loaded_sorts_and_clamps() {
        let mut app = loaded_app();
        assert_eq!(app.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["t1", "t2", "t3"]);
        app.selected = 2;
        app.update(Event::TasksLoaded(Ok(vec![task_in("t1", "Alpha", "c1", 1)])));
        assert_eq!(app.selected, 0);
        app.update(Event::TasksLoaded(Ok(Vec::new())));
        assert_eq!(app.selected, 0);
        assert!(app.current_task().is_none());
    }

    #[test]
    fn test_tasks_error_clears_comments_and_continuation() {
        let mut app = loaded_app();
        app.comments = Some(Vec::new());
        app.comments_task_id = Some("t1".to_string());
        app.return_to_viewer = Some("t1".to_string());
        app.update(Event::TasksLoaded(Err("store lock poisoned".to_string())));
        assert_eq!(app.status, "store lock poisoned");
        assert!(app.comments.is_none());
        assert!(app.return_to_viewer.is_none());
    }

    #[test]
    fn test_list_navigation_clamps() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Up));
        assert_eq!(app.selected, 0);
        app.update(ch('j'));
        app.update(ch('j'));
        app.update(ch('j'));
        assert_eq!(app.selected, 2);
        assert_eq!(app.current_task().map(|t| t.id.as_str()), Some("t3"));
    }

    #[test]
    fn test_kanban_rows_clamp_per_column() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Tab));
        assert_eq!(app.view, ViewMode::Kanban);
        app.update(key(KeyCode::Down));
        assert_eq!(app.kanban_rows, vec![1, 0, 0]);
        app.update(key(KeyCode::Right));
        assert_eq!(app.current_task().map(|t| t.id.as_str()), Some("t3"));
        app.update(key(KeyCode::Right));
        app.update(key(KeyCode::Right));
        assert_eq!(app.active_column, 2);
        assert!(app.current_task().is_none());

        app.update(Event::TasksLoaded(Ok(vec![task_in("t1", "Alpha", "c1", 1)])));
        assert_eq!(app.kanban_rows, vec![0, 0, 0]);
    }

    #[test]
    fn test_move_task_wraps_to_first_column() {
        let mut app = loaded_app();
        app.selected = 2;
        let effects = app.update(ch('m'));
        match effects.as_slice() {
            [Effect::MoveTask { input, note }] => {
                assert_eq!(input.task_id, "t3");
                assert_eq!(input.column_id.as_deref(), Some("c3"));
                assert_eq!(input.status.as_deref(), Some("done"));
                assert_eq!(note, "moved to Done");
            }
            other => panic!("unexpected {other:?}"),
        }

        app.update(Event::TasksLoaded(Ok(vec![task_in("t9", "Last", "c3", 0)])));
        match app.update(ch('m')).as_slice() {
            [Effect::MoveTask { input, .. }] => assert_eq!(input.column_id.as_deref(), Some("c1")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_op_done_reloads_and_reopens_viewer() {
        let mut app = loaded_app();
        app.return_to_viewer = Some("t2".to_string());
        let effects = app.update(Event::OpDone(Ok("task updated".to_string())));
        assert_eq!(app.status, "task updated");
        assert!(matches!(effects[0], Effect::LoadTasks(_)));
        assert!(matches!(&effects[1], Effect::LoadComments { task_id } if task_id == "t2"));
        assert!(matches!(&app.surface, Surface::Viewer(v) if v.task_id == "t2"));
        assert!(app.comments.is_none());
    }

    #[test]
    fn test_op_failure_cancels_viewer_return() {
        let mut app = loaded_app();
        app.return_to_viewer = Some("t2".to_string());
        let effects = app.update(Event::OpDone(Err("title cannot be empty".to_string())));
        assert!(effects.is_empty());
        assert!(app.return_to_viewer.is_none());
        assert_eq!(app.surface, Surface::Base);
    }

    #[test]
    fn test_cycle_filters_reload() {
        let mut app = loaded_app();
        let effects = app.update(ch('s'));
        assert_eq!(app.filters.column_id.as_deref(), Some("c1"));
        assert!(matches!(&effects[0], Effect::LoadTasks(f) if f.column_id.as_deref() == Some("c1")));
        app.update(ch('s'));
        app.update(ch('s'));
        app.update(ch('s'));
        assert_eq!(app.filters.column_id, None);

        app.update(ch('z'));
        assert_eq!(app.filters.due, DueFilter::Soon);
        app.update(ch('o'));
        assert_eq!(app.sort, SortMode::Due);
    }

    #[test]
    fn test_priority_filter_cycle_and_label() {
        let mut app = loaded_app();
        assert_eq!(app.priority_filter_label(), "All");
        app.cycle_priority_filter(1);
        assert_eq!(app.filters.priority, Some(0));
        assert_eq!(app.priority_filter_label(), "Critical (0)");
        app.cycle_priority_filter(-2);
        assert_eq!(app.filters.priority, Some(5));
        assert_eq!(app.priority_filter_label(), "None (5)");
    }

    #[test]
    fn test_clear_search_only_when_searching() {
        let mut app = loaded_app();
        assert!(app.update(ch('x')).is_empty());
        app.filters.search = "alp".to_string();
        let effects = app.update(ch('x'));
        assert!(matches!(&effects[0], Effect::LoadTasks(f) if f.title_query.is_empty()));
    }

    #[test]
    fn test_board_brackets_wrap() {
        let mut app = loaded_app();
        match app.update(ch(']')).as_slice() {
            [Effect::LoadContext(req)] => assert_eq!(req.board_ids, vec!["b2"]),
            other => panic!("unexpected {other:?}"),
        }
        match app.update(ch('[')).as_slice() {
            [Effect::LoadContext(req)] => assert_eq!(req.board_ids, vec!["b2"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_details_pane_loads_comments_for_current_task() {
        let mut app = loaded_app();
        let effects = app.update(ch('d'));
        assert!(matches!(&effects[0], Effect::LoadComments { task_id } if task_id == "t1"));
        let effects = app.update(ch('j'));
        assert!(matches!(&effects[0], Effect::LoadComments { task_id } if task_id == "t2"));

        app.update(Event::CommentsLoaded {
            task_id: "t1".to_string(),
            result: Ok(Vec::new()),
        });
        assert!(app.comments.is_none(), "stale comments must be ignored");
        app.update(Event::CommentsLoaded {
            task_id: "t2".to_string(),
            result: Ok(Vec::new()),
        });
        assert_eq!(app.comments, Some(Vec::new()));

        app.update(ch('d'));
        assert!(app.comments.is_none());
    }

    #[test]
    fn test_external_description_edit_flow() {
        let mut app = loaded_app();
        let effects = app.update(ch('E'));
        assert!(matches!(&effects[0], Effect::OpenEditor { target: EditorTarget::Task(id), .. } if id == "t1"));
        assert!(app.update(ch('E')).is_empty());
        assert_eq!(app.status, "editor already open");

        let effects = app.update(Event::DescriptionEdited {
            target: EditorTarget::Task("t1".to_string()),
            result: Ok("new body".to_string()),
        });
        match effects.as_slice() {
            [Effect::UpdateTask { task_id, patch, note }] => {
                assert_eq!(task_id, "t1");
                assert_eq!(patch.description_md.as_deref(), Some("new body"));
                assert_eq!(note, "description updated");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(app.pending_editor.is_none());
    }

    #[test]
    fn test_editor_error_is_reported() {
        let mut app = loaded_app();
        app.update(ch('E'));
        let effects = app.update(Event::DescriptionEdited {
            target: EditorTarget::Task("t1".to_string()),
            result: Err("editor failed: vi exited with exit status: 1".to_string()),
        });
        assert!(effects.is_empty());
        assert!(app.status.starts_with("editor failed"));
        assert!(app.pending_editor.is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded_app();
        app.update(ctrl('c'));
        assert!(app.should_quit());
        let mut app = loaded_app();
        app.update(ch('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_cycle_id() {
        let ids = ["a", "b", "c"];
        assert_eq!(cycle_id(ids.iter().copied(), "c", 1).as_deref(), Some("a"));
        assert_eq!(cycle_id(ids.iter().copied(), "a", -1).as_deref(), Some("c"));
        assert_eq!(cycle_id(["a"].iter().copied(), "a", 1), None);
        assert_eq!(cycle_id(std::iter::empty(), "a", 1), None);
    }
}
