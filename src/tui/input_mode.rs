//! Search, comment and task form input handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::AddCommentInput;
use crate::tui::app::{App, Surface};
use crate::tui::effects::Effect;
use crate::tui::enums::EditorTarget;
use crate::tui::input::InputField;
use crate::tui::task_form::{TaskForm, TaskSubmission, DESCRIPTION_FIELD, PRIORITY_FIELD};

impl App {
    pub(crate) fn open_create_form(&mut self) -> Vec<Effect> {
        self.surface = Surface::TaskForm(Box::new(TaskForm::new(&self.columns)));
        Vec::new()
    }

    pub(crate) fn open_edit_form(&mut self) -> Vec<Effect> {
        if let Some(task) = self.current_task() {
            let form = TaskForm::from_task(task, &self.columns, &self.locale);
            self.surface = Surface::TaskForm(Box::new(form));
        }
        Vec::new()
    }

    pub(crate) fn open_comment(&mut self) -> Vec<Effect> {
        if let Some(task) = self.current_task() {
            self.surface = Surface::Comment {
                task_id: task.id.clone(),
                input: InputField::new(),
            };
        }
        Vec::new()
    }

    /// Leave a nested form, going back to the viewer it was opened from.
    fn close_to_viewer(&mut self) -> Vec<Effect> {
        match self.return_to_viewer.take() {
            Some(task_id) => self.open_viewer(task_id),
            None => Vec::new(),
        }
    }

    pub(crate) fn handle_search_key(&mut self, mut input: InputField, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => Vec::new(),
            KeyCode::Enter => {
                self.filters.search = input.value.trim().to_string();
                self.load_tasks()
            }
            _ => {
                input.handle_key(key);
                self.surface = Surface::Search(input);
                Vec::new()
            }
        }
    }

    pub(crate) fn handle_comment_key(&mut self, task_id: String, mut input: InputField, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => self.close_to_viewer(),
            KeyCode::Enter => {
                if input.is_blank() {
                    self.status = "comment is required".to_string();
                    self.surface = Surface::Comment { task_id, input };
                    return Vec::new();
                }
                vec![Effect::AddComment(AddCommentInput {
                    task_id,
                    provider_id: self.provider_id.clone(),
                    body_md: input.value.trim().to_string(),
                    author: None,
                })]
            }
            _ => {
                input.handle_key(key);
                self.surface = Surface::Comment { task_id, input };
                Vec::new()
            }
        }
    }

    pub(crate) fn handle_task_form_key(&mut self, mut form: TaskForm, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let mut effects = Vec::new();
        match key.code {
            KeyCode::Esc => {
                if self.pending_editor == Some(EditorTarget::Form) {
                    self.pending_editor = None;
                }
                return self.close_to_viewer();
            }
            KeyCode::Char('s') if ctrl => return self.submit_task_form(form),
            KeyCode::Char('g') if ctrl => {
                if form.current_field == DESCRIPTION_FIELD && self.pending_editor.is_none() {
                    self.pending_editor = Some(EditorTarget::Form);
                    effects.push(Effect::OpenEditor {
                        target: EditorTarget::Form,
                        text: form.description_full.clone(),
                    });
                }
            }
            KeyCode::Enter if form.is_last_field() => return self.submit_task_form(form),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.handle_left_right(false),
            KeyCode::Right => form.handle_left_right(true),
            KeyCode::Char(c @ '0'..='5') if form.current_field == PRIORITY_FIELD => {
                form.set_priority(c as usize - '0' as usize);
            }
            KeyCode::Char(c) if !ctrl => form.handle_char(c),
            KeyCode::Backspace => form.handle_backspace(),
            KeyCode::Delete => form.handle_delete(),
            KeyCode::Home => {
                if let Some(field) = form.current_input() {
                    field.move_home();
                }
            }
            KeyCode::End => {
                if let Some(field) = form.current_input() {
                    field.move_end();
                }
            }
            _ => {}
        }
        self.surface = Surface::TaskForm(Box::new(form));
        effects
    }

    /// Validate the form; errors keep it open with the message inline.
    fn submit_task_form(&mut self, mut form: TaskForm) -> Vec<Effect> {
        let submission = form.submit(
            &self.provider_id,
            &self.workspace_id,
            &self.board_id,
            &self.columns,
            &self.locale,
        );
        match submission {
            Ok(TaskSubmission::Create(input)) => vec![Effect::CreateTask(input)],
            Ok(TaskSubmission::Update { task_id, patch }) => vec![Effect::UpdateTask {
                task_id,
                patch,
                note: "task updated".to_string(),
            }],
            Err(e) => {
                form.error = Some(e);
                self.surface = Surface::TaskForm(Box::new(form));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::{ch, ctrl, key, loaded_app};
    use crate::tui::effects::Event;
    use crate::tui::task_form::{DUE_FIELD, STATUS_FIELD};

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.update(ch(c));
        }
    }

    fn form(app: &App) -> &TaskForm {
        match &app.surface {
            Surface::TaskForm(form) => form,
            other => panic!("expected task form, got {other:?}"),
        }
    }

    #[test]
    fn test_search_sets_title_filter() {
        let mut app = loaded_app();
        app.update(ch('/'));
        type_text(&mut app, " beta ");
        let effects = app.update(key(KeyCode::Enter));
        assert_eq!(app.filters.search, "beta");
        assert!(matches!(effects.as_slice(), [Effect::LoadTasks(f)] if f.title_query == "beta"));
        assert_eq!(app.surface, Surface::Base);

        app.update(ch('/'));
        assert!(matches!(&app.surface, Surface::Search(input) if input.value == "beta"));
        app.update(key(KeyCode::Esc));
        assert_eq!(app.surface, Surface::Base);
    }

    #[test]
    fn test_empty_comment_stays_open() {
        let mut app = loaded_app();
        app.update(ch('c'));
        let effects = app.update(key(KeyCode::Enter));
        assert!(effects.is_empty());
        assert_eq!(app.status, "comment is required");
        assert!(matches!(app.surface, Surface::Comment { .. }));
        app.update(key(KeyCode::Esc));
        assert_eq!(app.surface, Surface::Base);
    }

    #[test]
    fn test_create_task_defaults_to_first_column() {
        let mut app = loaded_app();
        app.update(ch('n'));
        type_text(&mut app, "Ship it");
        let effects = app.update(ctrl('s'));
        match effects.as_slice() {
            [Effect::CreateTask(input)] => {
                assert_eq!(input.title, "Ship it");
                assert_eq!(input.workspace_id, "w1");
                assert_eq!(input.board_id.as_deref(), Some("b1"));
                assert_eq!(input.column_id.as_deref(), Some("c1"));
                assert_eq!(input.priority, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.surface, Surface::Base);
    }

    #[test]
    fn test_form_errors_stay_inline() {
        let mut app = loaded_app();
        app.update(ch('n'));
        app.update(ctrl('s'));
        assert_eq!(form(&app).error.as_deref(), Some("title is required"));

        type_text(&mut app, "Title");
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::Tab));
        assert_eq!(form(&app).current_field, DUE_FIELD);
        type_text(&mut app, "someday");
        let effects = app.update(ctrl('s'));
        assert!(effects.is_empty());
        assert!(form(&app).error.as_deref().unwrap_or("").starts_with("due date must match"));
    }

    #[test]
    fn test_priority_digits_and_enter_submit() {
        let mut app = loaded_app();
        app.update(ch('n'));
        type_text(&mut app, "Fix 5 bugs");
        assert_eq!(form(&app).title.value, "Fix 5 bugs");
        app.update(key(KeyCode::Up));
        app.update(key(KeyCode::Up));
        assert_eq!(form(&app).current_field, PRIORITY_FIELD);
        app.update(ch('3'));
        assert_eq!(form(&app).priority, 3);
        app.update(key(KeyCode::Enter));
        assert_eq!(form(&app).current_field, STATUS_FIELD);
        match app.update(key(KeyCode::Enter)).as_slice() {
            [Effect::CreateTask(input)] => assert_eq!(input.priority, 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_edit_submits_update() {
        let mut app = loaded_app();
        app.update(ch('e'));
        assert!(form(&app).is_edit());
        type_text(&mut app, "!");
        match app.update(ctrl('s')).as_slice() {
            [Effect::UpdateTask { task_id, patch, note }] => {
                assert_eq!(task_id, "t1");
                assert_eq!(patch.title.as_deref(), Some("Alpha!"));
                assert_eq!(note, "task updated");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_form_editor_handoff() {
        let mut app = loaded_app();
        app.update(ch('n'));
        assert!(app.update(ctrl('g')).is_empty(), "editor only opens from the description field");
        app.update(key(KeyCode::Tab));
        match app.update(ctrl('g')).as_slice() {
            [Effect::OpenEditor { target, text }] => {
                assert_eq!(target, &EditorTarget::Form);
                assert!(text.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        app.update(Event::DescriptionEdited {
            target: EditorTarget::Form,
            result: Ok("first line\nsecond line".to_string()),
        });
        assert_eq!(form(&app).description_full, "first line\nsecond line");
        assert_eq!(form(&app).description.value, "first line");
        assert!(app.pending_editor.is_none());
    }
}
