//! Full-screen task viewer: description on the left, comments on the right.

use crossterm::event::{KeyCode, KeyEvent};

use crate::task::Task;
use crate::tui::app::{App, Surface};
use crate::tui::effects::Effect;
use crate::tui::input::InputField;
use crate::tui::task_form::TaskForm;
use crate::tui::utils::ViewerLayout;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskViewer {
    pub task_id: String,
    /// First visible description line.
    pub scroll: usize,
    /// First visible comment.
    pub comment_scroll: usize,
}

impl TaskViewer {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            scroll: 0,
            comment_scroll: 0,
        }
    }
}

impl App {
    /// Show a task in the viewer and fetch its comments.
    pub(crate) fn open_viewer(&mut self, task_id: String) -> Vec<Effect> {
        self.comments = None;
        self.comments_task_id = Some(task_id.clone());
        self.surface = Surface::Viewer(TaskViewer::new(task_id.clone()));
        vec![Effect::LoadComments { task_id }]
    }

    /// The viewed task, falling back to the current selection when it has
    /// dropped out of the loaded set.
    pub(crate) fn viewer_task(&self, viewer: &TaskViewer) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == viewer.task_id)
            .or_else(|| self.current_task())
    }

    pub(crate) fn viewer_layout(&self) -> ViewerLayout {
        ViewerLayout::new(self.width as usize, self.height as usize)
    }

    fn viewer_max_scroll(&self, viewer: &TaskViewer) -> usize {
        self.viewer_task(viewer)
            .map(|t| self.viewer_layout().max_scroll(&t.description_md))
            .unwrap_or(0)
    }

    fn comment_count(&self) -> usize {
        self.comments.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Re-clamp viewer offsets after a resize or a reload.
    pub(crate) fn clamp_viewer_scroll(&mut self) {
        let (max, comments) = match &self.surface {
            Surface::Viewer(viewer) => (self.viewer_max_scroll(viewer), self.comment_count()),
            _ => return,
        };
        if let Surface::Viewer(viewer) = &mut self.surface {
            viewer.scroll = viewer.scroll.min(max);
            viewer.comment_scroll = viewer.comment_scroll.min(comments.saturating_sub(1));
        }
    }

    pub(crate) fn handle_viewer_key(&mut self, mut viewer: TaskViewer, key: KeyEvent) -> Vec<Effect> {
        let max = self.viewer_max_scroll(&viewer);
        let page = (self.viewer_layout().description_rows() / 2).max(1);
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return Vec::new(),
            KeyCode::Char('e') => {
                if let Some(task) = self.viewer_task(&viewer).cloned() {
                    self.return_to_viewer = Some(task.id.clone());
                    self.surface = Surface::TaskForm(Box::new(TaskForm::from_task(&task, &self.columns, &self.locale)));
                    return Vec::new();
                }
            }
            KeyCode::Char('c') => {
                if let Some(task_id) = self.viewer_task(&viewer).map(|t| t.id.clone()) {
                    self.return_to_viewer = Some(task_id.clone());
                    self.surface = Surface::Comment {
                        task_id,
                        input: InputField::new(),
                    };
                    return Vec::new();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => viewer.scroll = viewer.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => viewer.scroll = (viewer.scroll + 1).min(max),
            KeyCode::PageUp => viewer.scroll = viewer.scroll.saturating_sub(page),
            KeyCode::PageDown => viewer.scroll = (viewer.scroll + page).min(max),
            KeyCode::Home => viewer.scroll = 0,
            KeyCode::End => viewer.scroll = max,
            KeyCode::Char('J') => {
                viewer.comment_scroll = (viewer.comment_scroll + 1).min(self.comment_count().saturating_sub(1));
            }
            KeyCode::Char('K') => viewer.comment_scroll = viewer.comment_scroll.saturating_sub(1),
            _ => {}
        }
        self.surface = Surface::Viewer(viewer);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Comment;
    use crate::tui::app::tests::{ch, key, loaded_app, task_in};
    use crate::tui::effects::Event;
    use chrono::{TimeZone, Utc};

    fn viewer(app: &App) -> &TaskViewer {
        match &app.surface {
            Surface::Viewer(v) => v,
            other => panic!("expected viewer, got {other:?}"),
        }
    }

    fn long_task() -> Task {
        let mut t = task_in("t1", "Alpha", "c1", 1);
        t.description_md = (0..60).map(|i| format!("line {i}\n")).collect();
        t
    }

    fn comment(id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            task_id: "t1".to_string(),
            provider_id: "p1".to_string(),
            remote_id: None,
            body_md: "ok".to_string(),
            author: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_enter_opens_viewer_and_loads_comments() {
        let mut app = loaded_app();
        let effects = app.update(key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [Effect::LoadComments { task_id }] if task_id == "t1"));
        assert_eq!(viewer(&app).task_id, "t1");
        assert!(app.comments.is_none());
        app.update(ch('q'));
        assert_eq!(app.surface, Surface::Base);
    }

    #[test]
    fn test_scroll_is_clamped_to_content() {
        let mut app = loaded_app();
        app.update(Event::Resize { width: 120, height: 40 });
        app.update(Event::TasksLoaded(Ok(vec![long_task()])));
        app.update(key(KeyCode::Enter));
        let max = app.viewer_layout().max_scroll(&long_task().description_md);
        assert!(max > 0);

        app.update(key(KeyCode::Up));
        assert_eq!(viewer(&app).scroll, 0);
        app.update(key(KeyCode::End));
        assert_eq!(viewer(&app).scroll, max);
        app.update(key(KeyCode::Down));
        assert_eq!(viewer(&app).scroll, max);
        app.update(key(KeyCode::PageUp));
        let page = app.viewer_layout().description_rows() / 2;
        assert_eq!(viewer(&app).scroll, max - page);
        app.update(key(KeyCode::Home));
        assert_eq!(viewer(&app).scroll, 0);

        app.update(key(KeyCode::End));
        app.update(Event::Resize { width: 200, height: 80 });
        assert!(viewer(&app).scroll <= app.viewer_layout().max_scroll(&long_task().description_md));
    }

    #[test]
    fn test_comment_scroll() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Enter));
        app.update(Event::CommentsLoaded {
            task_id: "t1".to_string(),
            result: Ok(vec![comment("a"), comment("b")]),
        });
        app.update(ch('J'));
        app.update(ch('J'));
        assert_eq!(viewer(&app).comment_scroll, 1);
        app.update(ch('K'));
        assert_eq!(viewer(&app).comment_scroll, 0);
    }

    #[test]
    fn test_edit_from_viewer_returns_on_cancel() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Enter));
        app.update(ch('e'));
        assert!(matches!(&app.surface, Surface::TaskForm(form) if form.is_edit()));
        assert_eq!(app.return_to_viewer.as_deref(), Some("t1"));

        let effects = app.update(key(KeyCode::Esc));
        assert!(matches!(effects.as_slice(), [Effect::LoadComments { .. }]));
        assert_eq!(viewer(&app).task_id, "t1");
        assert!(app.return_to_viewer.is_none());
    }

    #[test]
    fn test_comment_from_viewer_returns_after_save() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Enter));
        app.update(ch('c'));
        assert!(matches!(&app.surface, Surface::Comment { task_id, .. } if task_id == "t1"));
        for c in "done".chars() {
            app.update(ch(c));
        }
        let effects = app.update(key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [Effect::AddComment(input)] if input.body_md == "done"));
        assert_eq!(app.surface, Surface::Base);

        app.update(Event::OpDone(Ok("comment added".to_string())));
        assert_eq!(viewer(&app).task_id, "t1");
    }

    #[test]
    fn test_tasks_reload_keeps_viewer_comments() {
        let mut app = loaded_app();
        app.update(key(KeyCode::Enter));
        app.update(Event::CommentsLoaded {
            task_id: "t1".to_string(),
            result: Ok(vec![comment("a")]),
        });
        let effects = app.update(Event::TasksLoaded(Ok(vec![task_in("t1", "Alpha", "c1", 1)])));
        assert!(effects.is_empty());
        assert_eq!(app.comments.as_ref().map(Vec::len), Some(1));
    }
}
