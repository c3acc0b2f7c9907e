//! Drawing the application state with ratatui.
//!
//! Rendering is read-only: every function here takes `&App` and paints the
//! base screen (header, list or kanban body, optional details pane, footer)
//! and then the open overlay on top.

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::dates::DueTone;
use crate::fields::{ViewMode, PRIORITY_LABELS};
use crate::task::Task;
use crate::tui::app::{App, Surface};
use crate::tui::board_form::{BoardCreateForm, ColumnOrderForm};
use crate::tui::colors::{
    hex_to_color, priority_color, AMBER, CREAM, DUE_DEFAULT, DUE_NONE, DUE_OVERDUE, DUE_TODAY, GOLD, MUTED,
    PANEL_BORDER,
};
use crate::tui::enums::{ContextEditMode, ContextMode, FilterRow};
use crate::tui::filters::tasks_for_column;
use crate::tui::input::InputField;
use crate::tui::keybinds::KeybindPanel;
use crate::tui::panels::{ContextPanel, ContextStep, FilterPanel};
use crate::tui::task_form::{TaskForm, DESCRIPTION_FIELD, DUE_FIELD, PRIORITY_FIELD, STATUS_FIELD, TITLE_FIELD};
use crate::tui::utils::{markdown_lines, truncate, wrap_text, MarkdownKind};
use crate::tui::viewer::TaskViewer;

const SHORTCUTS: &str =
    "?:keybinds w:workspaces b:board-manager [ ]:boards f:filters s/z:quick-filter o:sort n:new /:search enter:open-task q:quit";

fn selected_style() -> Style {
    Style::default().bg(GOLD).fg(Color::Black).add_modifier(Modifier::BOLD)
}

fn hint_style() -> Style {
    Style::default().fg(MUTED)
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    }
}

/// Input text with a block cursor when focused.
fn input_spans(field: &InputField, focused: bool) -> Vec<Span<'static>> {
    if !focused {
        return vec![Span::raw(field.value.clone())];
    }
    let chars: Vec<char> = field.value.chars().collect();
    let cursor = field.cursor.min(chars.len());
    let before: String = chars[..cursor].iter().collect();
    let at = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(cursor + 1).collect();
    vec![
        Span::raw(before),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ]
}

/// A popup clamped to the screen: `percent` of the width or `min_width`,
/// whichever is larger.
fn popup_area(area: Rect, percent: u16, min_width: u16, height: u16) -> Rect {
    let width = (area.width as u32 * percent as u32 / 100) as u16;
    let width = width.max(min_width).min(area.width.saturating_sub(2).max(20));
    let height = height.min(area.height.saturating_sub(2).max(8));
    crate::tui::utils::centered_fixed(width, height, area)
}

/// Clear `area`, draw a rounded panel border and return the inner area.
fn draw_panel(f: &mut Frame, area: Rect) -> Rect {
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(PANEL_BORDER))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// First row to show so `selected` stays inside `rows` visible rows.
fn scroll_offset(selected: usize, rows: usize, len: usize) -> usize {
    let rows = rows.max(1);
    let offset = (selected + 1).saturating_sub(rows);
    offset.min(len.saturating_sub(rows))
}

fn title_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(CREAM).add_modifier(Modifier::BOLD),
    ))
}

fn due_cell(app: &App, task: &Task) -> Span<'static> {
    match task.due_at {
        Some(due) => {
            let label = app.locale.due_label(due, Utc::now());
            let color = match label.tone {
                DueTone::Today => DUE_TODAY,
                DueTone::Overdue => DUE_OVERDUE,
                DueTone::Normal => DUE_DEFAULT,
            };
            Span::styled(label.text, Style::default().fg(color))
        }
        None => Span::styled("-", Style::default().fg(DUE_NONE)),
    }
}

impl App {
    /// Paint one frame.
    pub(crate) fn render(&self, f: &mut Frame) {
        let area = f.area();
        let footer = self.footer_lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(footer.len() as u16),
            ])
            .split(area);

        self.render_header(f, chunks[0]);
        self.render_body(f, chunks[1]);
        f.render_widget(Paragraph::new(footer), chunks[2]);

        match &self.surface {
            Surface::Keybinds(panel) => self.render_keybinds(f, area, panel),
            Surface::Filters(panel) => self.render_filters(f, area, panel),
            Surface::Context(panel) => self.render_context(f, area, panel),
            Surface::TaskForm(form) => self.render_task_form(f, area, form),
            Surface::Viewer(viewer) => self.render_viewer(f, area, viewer),
            Surface::Base | Surface::Search(_) | Surface::Comment { .. } => {}
        }
    }

    /// The filter summary shown on the right of the header.
    pub(crate) fn header_meta(&self) -> String {
        let mut filters = vec![
            format!("status:{}", self.column_filter_label()),
            format!("due:{}", self.filters.due.label().to_lowercase()),
        ];
        if let Some(p) = self.filters.priority {
            filters.push(format!("priority:p{p}"));
        }
        format!(
            "view:{}  sort:{}  filter:{}  search:{:?}",
            self.view.label(),
            self.sort.label().to_lowercase(),
            filters.join(","),
            self.filters.search
        )
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let title = format!("{} / {}", self.workspace_name(), self.board_name());
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(title.chars().count() as u16 + 2), Constraint::Min(0)])
            .split(area);
        f.render_widget(Paragraph::new(title_line(&title)), chunks[0]);
        f.render_widget(
            Paragraph::new(Span::styled(self.header_meta(), hint_style())).alignment(Alignment::Right),
            chunks[1],
        );
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(3);
        if !self.status.trim().is_empty() {
            lines.push(Line::from(Span::styled(self.status.clone(), Style::default().fg(AMBER))));
        }
        let mut shortcuts = SHORTCUTS.to_string();
        if !self.filters.search.trim().is_empty() {
            shortcuts.push_str(" x:clear-search");
        }
        lines.push(Line::from(Span::styled(shortcuts, hint_style())));

        let input = match &self.surface {
            Surface::Search(input) => Some(("/", input)),
            Surface::Comment { input, .. } => Some(("comment: ", input)),
            _ => None,
        };
        if let Some((prompt, input)) = input {
            let mut spans = vec![Span::styled(prompt, Style::default().fg(GOLD))];
            spans.extend(input_spans(input, true));
            lines.push(Line::from(spans));
        }
        lines
    }

    fn render_body(&self, f: &mut Frame, area: Rect) {
        let main = if self.show_details {
            let details_width = (area.width / 4).max(36).min(area.width);
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(details_width)])
                .split(area);
            self.render_details(f, chunks[1]);
            chunks[0]
        } else {
            area
        };
        match self.view {
            ViewMode::List => self.render_list(f, main),
            ViewMode::Kanban => self.render_kanban(f, main),
        }
    }

    fn status_cell(&self, task: &Task) -> Span<'static> {
        match task.column_id.as_ref().and_then(|id| self.columns.iter().find(|c| &c.id == id)) {
            Some(column) => Span::styled(column.name.clone(), Style::default().fg(hex_to_color(&column.color))),
            None => Span::raw(task.status.clone().unwrap_or_else(|| "-".to_string())),
        }
    }

    fn render_list(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PANEL_BORDER))
            .title(format!("Tasks ({})", self.tasks.len()));

        if self.tasks.is_empty() {
            let empty = Paragraph::new(vec![Line::from("No tasks yet."), Line::from("Press n to create one.")])
                .style(hint_style())
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(
            ["Task", "Status", "Due", "Pri"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().fg(CREAM));

        let rows: Vec<Row> = self
            .tasks
            .iter()
            .map(|task| {
                Row::new(vec![
                    Cell::from(task.title.clone()),
                    Cell::from(self.status_cell(task)),
                    Cell::from(due_cell(self, task)),
                    Cell::from(Span::styled(
                        format!("p{}", task.priority),
                        Style::default().fg(priority_color(task.priority)),
                    )),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(4),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(selected_style())
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_kanban(&self, f: &mut Frame, area: Rect) {
        if self.columns.is_empty() {
            let empty = Paragraph::new("No columns")
                .style(hint_style())
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, area);
            return;
        }

        let count = self.columns.len() as u32;
        let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, (column, &column_area)) in self.columns.iter().zip(areas.iter()).enumerate() {
            let active = i == self.active_column;
            let color = hex_to_color(&column.color);
            let title_style = if active {
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if active { GOLD } else { PANEL_BORDER }))
                .title(Span::styled(column.name.clone(), title_style));
            let inner = block.inner(column_area);
            f.render_widget(block, column_area);

            let tasks = tasks_for_column(&self.tasks, &column.id);
            if tasks.is_empty() {
                f.render_widget(Paragraph::new("(empty)").style(hint_style()), inner);
                continue;
            }

            // Two lines per card: title, then due and priority.
            let row = self.kanban_rows.get(i).copied().unwrap_or(0);
            let visible = (inner.height as usize / 2).max(1);
            let offset = scroll_offset(row, visible, tasks.len());
            let width = inner.width as usize;
            let mut lines = Vec::new();
            for (idx, task) in tasks.iter().enumerate().skip(offset).take(visible) {
                let selected = active && idx == row;
                let title_style = if selected {
                    selected_style()
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(truncate(&task.title, width), title_style)));
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    due_cell(self, task),
                    Span::raw("  "),
                    Span::styled(format!("p{}", task.priority), Style::default().fg(priority_color(task.priority))),
                ]));
            }
            f.render_widget(Paragraph::new(lines), inner);
        }
    }

    fn comment_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match &self.comments {
            None => lines.push(Line::from(Span::styled("(loading...)", hint_style()))),
            Some(comments) if comments.is_empty() => lines.push(Line::from(Span::styled("(none)", hint_style()))),
            Some(comments) => {
                for comment in comments {
                    let author = comment.author.as_deref().unwrap_or("unknown");
                    lines.push(Line::from(Span::styled(
                        format!("{author}  {}", self.locale.format_timestamp(comment.created_at)),
                        Style::default().fg(AMBER),
                    )));
                    for text in wrap_text(&comment.body_md, width.saturating_sub(2).max(1)) {
                        lines.push(Line::from(format!("  {text}")));
                    }
                }
            }
        }
        lines
    }

    fn render_details(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PANEL_BORDER))
            .title("Details");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let Some(task) = self.current_task() else {
            f.render_widget(Paragraph::new("No task selected").style(hint_style()), inner);
            return;
        };
        let width = inner.width as usize;
        let due = task
            .due_at
            .map(|d| self.locale.format_date(d))
            .unwrap_or_else(|| "-".to_string());
        let column = task
            .column_id
            .as_deref()
            .map(|id| self.column_name(id))
            .unwrap_or_else(|| "-".to_string());

        let mut lines = vec![title_line(&task.title)];
        lines.push(Line::from(Span::styled(
            format!("Priority: {} | Due: {} | Column: {}", task.priority, due, column),
            hint_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description", Style::default().add_modifier(Modifier::BOLD))));
        lines.extend(markdown_lines(&task.description_md, width).into_iter().map(markdown_line));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Comments", Style::default().add_modifier(Modifier::BOLD))));
        lines.extend(self.comment_lines(width));
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn render_keybinds(&self, f: &mut Frame, area: Rect, panel: &KeybindPanel) {
        let height = (area.height * 3 / 4).max(12);
        let inner = draw_panel(f, popup_area(area, 75, 64, height));
        let entries = panel.visible(!self.filters.search.is_empty());

        let mut lines = vec![
            title_line("Keybindings"),
            Line::from(Span::styled("Type to filter | Enter: execute | Esc: close", hint_style())),
            Line::from(input_spans(&panel.filter, true)),
            Line::from(""),
        ];
        if entries.is_empty() {
            lines.push(Line::from(Span::styled("(no keybindings match filter)", hint_style())));
        }
        let rows = (inner.height as usize).saturating_sub(lines.len());
        let offset = scroll_offset(panel.selected, rows, entries.len());
        for (i, entry) in entries.iter().enumerate().skip(offset).take(rows.max(1)) {
            let line = if i == panel.selected {
                Line::from(Span::styled(format!("{:<12} {}", entry.key, entry.label), selected_style()))
            } else {
                Line::from(vec![
                    Span::styled(format!("{:<12} ", entry.key), Style::default().fg(AMBER)),
                    Span::raw(entry.label),
                ])
            };
            lines.push(line);
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn render_filters(&self, f: &mut Frame, area: Rect, panel: &FilterPanel) {
        let inner = draw_panel(f, popup_area(area, 66, 56, 12));
        let mut lines = vec![
            title_line("Filter & Sort"),
            Line::from(Span::styled("↑/↓ select row | ←/→ change value | Enter/Esc close", hint_style())),
            Line::from(""),
        ];
        for row in FilterRow::ALL {
            let text = format!("{:<12} {}", row.label(), self.filter_value(row));
            let style = if row == panel.row() {
                selected_style()
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn render_context(&self, f: &mut Frame, area: Rect, panel: &ContextPanel) {
        let height = (area.height * 3 / 4).max(12);
        let inner = draw_panel(f, popup_area(area, 66, 64, height));
        let mut lines = match &panel.step {
            ContextStep::Wizard(form) => wizard_lines(form, inner.height as usize),
            ContextStep::Reorder(form) => reorder_lines(form, inner.height as usize, inner.width as usize),
            ContextStep::List | ContextStep::Prompt { .. } => self.context_list_lines(panel, inner.height as usize),
        };
        if let Some(error) = &panel.error {
            lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(DUE_OVERDUE))));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn context_list_lines(&self, panel: &ContextPanel, height: usize) -> Vec<Line<'static>> {
        let help = match panel.mode {
            ContextMode::Workspace => "Type to filter | Enter: switch | n:create | r:rename | b:boards | Esc:close",
            ContextMode::Board => {
                "Type to filter | Enter: switch | n:create (name + columns + colors) | r:rename | o:reorder columns | w:workspaces | Esc:close"
            }
        };
        let prompting = matches!(panel.step, ContextStep::Prompt { .. });
        let mut lines = vec![
            title_line(panel.mode.title()),
            Line::from(Span::styled(help, hint_style())),
            Line::from(input_spans(&panel.filter, !prompting)),
            Line::from(""),
        ];

        let items = self.context_items(panel);
        let rows = height.saturating_sub(lines.len() + 3).max(1);
        if items.is_empty() {
            lines.push(Line::from(Span::styled("(empty)", hint_style())));
        }
        let offset = scroll_offset(panel.selected, rows, items.len());
        for (i, item) in items.iter().enumerate().skip(offset).take(rows) {
            let style = if i == panel.selected {
                selected_style()
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(item.name.clone(), style)));
        }

        if let ContextStep::Prompt { mode, input, .. } = &panel.step {
            let label = match mode {
                ContextEditMode::Create => "Create: ",
                ContextEditMode::Rename => "Rename: ",
            };
            lines.push(Line::from(""));
            let mut spans = vec![Span::styled(label, Style::default().fg(GOLD))];
            spans.extend(input_spans(input, true));
            lines.push(Line::from(spans));
        }
        lines
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect, form: &TaskForm) {
        let height = (area.height * 3 / 4).max(18);
        let inner = draw_panel(f, popup_area(area, 80, 72, height));
        let width = (inner.width as usize).saturating_sub(2).max(12);

        let field = |idx: usize, label: &str| Span::styled(format!("{:<12}", format!("{label}:")), label_style(form.current_field == idx));
        let text_line = |idx: usize, label: &str, input: &InputField| {
            let mut spans = vec![field(idx, label), Span::raw(" ")];
            spans.extend(input_spans(input, form.current_field == idx));
            Line::from(spans)
        };

        let status_color = form
            .selected_status()
            .and_then(|o| o.color.as_deref())
            .map(hex_to_color)
            .unwrap_or(DUE_DEFAULT);
        let mut lines = vec![
            title_line(form.title_label()),
            Line::from(Span::styled(
                format!(
                    "Tab/Shift+Tab navigate | ←/→ select priority/status | 0-5 priority | Ctrl+S save | Ctrl+G edit description in $EDITOR | Esc cancel | due: {}",
                    self.locale.hint()
                ),
                hint_style(),
            )),
            Line::from(""),
            text_line(TITLE_FIELD, "Title", &form.title),
            text_line(DESCRIPTION_FIELD, "Description", &form.description),
            text_line(DUE_FIELD, "Due Date", &form.due),
            Line::from(vec![
                field(PRIORITY_FIELD, "Priority"),
                Span::raw(" "),
                Span::styled(
                    form.priority_label(),
                    Style::default()
                        .fg(priority_color(form.priority as i32))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                field(STATUS_FIELD, "Status"),
                Span::raw(" "),
                Span::styled(
                    form.status_label().to_string(),
                    Style::default().fg(status_color).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(DUE_OVERDUE))));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description preview:", hint_style())));
        let preview = form.description_full.trim();
        if preview.is_empty() {
            lines.push(Line::from(Span::styled("(empty)", hint_style())));
        } else {
            let mut wrapped = wrap_text(preview, width);
            let max_lines = ((inner.height as usize) / 3).clamp(3, 8);
            if wrapped.len() > max_lines {
                wrapped.truncate(max_lines - 1);
                wrapped.push("...".to_string());
            }
            lines.extend(wrapped.into_iter().map(|l| Line::from(Span::styled(l, hint_style()))));
        }

        match form.current_field {
            PRIORITY_FIELD => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Priority options:", hint_style())));
                for (i, label) in PRIORITY_LABELS.iter().enumerate() {
                    let style = if i == form.priority {
                        selected_style()
                    } else {
                        Style::default().fg(priority_color(i as i32))
                    };
                    lines.push(Line::from(Span::styled(format!("  {i}) {label}"), style)));
                }
            }
            STATUS_FIELD => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Status options:", hint_style())));
                for (i, option) in form.status_options.iter().enumerate() {
                    let style = if i == form.status {
                        selected_style()
                    } else {
                        Style::default().fg(option.color.as_deref().map(hex_to_color).unwrap_or(DUE_DEFAULT))
                    };
                    lines.push(Line::from(Span::styled(format!("  {}", option.label), style)));
                }
            }
            _ => {}
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn render_viewer(&self, f: &mut Frame, area: Rect, viewer: &TaskViewer) {
        let layout = self.viewer_layout();
        let panel_rect = crate::tui::utils::centered_fixed(layout.panel_width as u16, layout.panel_height as u16, area);
        let inner = draw_panel(f, panel_rect);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(layout.left_width as u16),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let Some(task) = self.viewer_task(viewer) else {
            f.render_widget(Paragraph::new("Task not found").style(hint_style()), chunks[0]);
            return;
        };

        let due = task
            .due_at
            .map(|d| self.locale.format_date(d))
            .unwrap_or_else(|| "no due date".to_string());
        let status = task
            .column_id
            .as_deref()
            .map(|id| self.column_name(id))
            .or_else(|| task.status.clone())
            .unwrap_or_else(|| "-".to_string());

        let mut left = vec![
            title_line(&truncate(&task.title, layout.left_width)),
            Line::from(Span::styled(format!("{due} | p{} | {status}", task.priority), hint_style())),
            Line::from(Span::styled("j/k or ↑/↓ scroll description | Enter/Esc close", hint_style())),
        ];
        left.extend(
            markdown_lines(&task.description_md, layout.left_width)
                .into_iter()
                .skip(viewer.scroll)
                .take(layout.description_rows())
                .map(markdown_line),
        );
        f.render_widget(Paragraph::new(left), chunks[0]);

        let separator: Vec<Line> = (0..chunks[1].height).map(|_| Line::from(Span::styled("│", hint_style()))).collect();
        f.render_widget(Paragraph::new(separator), chunks[1]);

        let mut right = vec![
            Line::from(Span::styled("Comments", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled("J/K scroll | e edit | c comment", hint_style())),
        ];
        let comments = self.comment_lines(layout.right_width);
        // Comment scroll is counted in comments, so skip whole entries.
        let skip = match &self.comments {
            Some(list) if !list.is_empty() => {
                let width = layout.right_width.saturating_sub(2).max(1);
                list.iter()
                    .take(viewer.comment_scroll)
                    .map(|c| 1 + wrap_text(&c.body_md, width).len())
                    .sum()
            }
            _ => 0,
        };
        right.extend(comments.into_iter().skip(skip));
        f.render_widget(Paragraph::new(right), chunks[2]);
    }
}

fn markdown_line(line: crate::tui::utils::MarkdownLine) -> Line<'static> {
    let style = match line.kind {
        MarkdownKind::Heading(1) => Style::default().fg(CREAM).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        MarkdownKind::Heading(_) => Style::default().fg(CREAM).add_modifier(Modifier::BOLD),
        MarkdownKind::Bullet => Style::default().fg(DUE_DEFAULT),
        MarkdownKind::Text => Style::default(),
    };
    Line::from(Span::styled(line.text, style))
}

fn wizard_lines(form: &BoardCreateForm, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        title_line("Create Board"),
        Line::from(Span::styled(
            "Tab/Shift+Tab focus | Ctrl+N add column | Ctrl+D remove column | ←/→ pick color | Enter save | Esc cancel",
            hint_style(),
        )),
        Line::from(""),
        Line::from(Span::styled("Board Name", label_style(form.focus == 0))),
        Line::from(input_spans(&form.name, form.focus == 0)),
        Line::from(""),
        Line::from(Span::styled(format!("Columns ({})", form.columns.len()), hint_style())),
    ];

    // Each column row takes four lines: two labels and two inputs.
    let visible = (height.saturating_sub(lines.len() + 3) / 4).max(1);
    let focused_row = form.focused_row().unwrap_or(0);
    let offset = scroll_offset(focused_row, visible, form.columns.len());
    if offset > 0 {
        lines.push(Line::from(Span::styled("↑ more columns", hint_style())));
    }
    for (i, row) in form.columns.iter().enumerate().skip(offset).take(visible) {
        let name_focus = form.focus == 1 + i * 2;
        let color_focus = form.focus == 2 + i * 2;
        lines.push(Line::from(Span::styled(format!("Column {} Name", i + 1), label_style(name_focus))));
        lines.push(Line::from(input_spans(&row.name, name_focus)));
        lines.push(Line::from(Span::styled(format!("Column {} Color", i + 1), label_style(color_focus))));
        let mut color = vec![
            Span::styled("  ", Style::default().bg(hex_to_color(&row.color.value))),
            Span::raw(" "),
        ];
        color.extend(input_spans(&row.color, color_focus));
        lines.push(Line::from(color));
    }
    if offset + visible < form.columns.len() {
        lines.push(Line::from(Span::styled("↓ more columns", hint_style())));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(DUE_OVERDUE))));
    }
    lines
}

fn reorder_lines(form: &ColumnOrderForm, height: usize, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        title_line("Reorder Columns"),
        Line::from(Span::styled(
            "Up/Down select | Ctrl+K move up | Ctrl+J move down | Enter save | Esc cancel",
            hint_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(format!("Board: {}", form.board_name), hint_style())),
        Line::from(""),
    ];
    let rows = height.saturating_sub(lines.len() + 2).max(1);
    let offset = scroll_offset(form.selected, rows, form.columns.len());
    let name_width = width.saturating_sub(18).max(4);
    for (i, column) in form.columns.iter().enumerate().skip(offset).take(rows) {
        let name = if column.name.trim().is_empty() {
            "(unnamed)"
        } else {
            column.name.trim()
        };
        let text = format!("{:>2}. {} {}", i + 1, truncate(name, name_width), column.color.to_uppercase());
        let style = if i == form.selected {
            selected_style()
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default().bg(hex_to_color(&column.color))),
            Span::raw(" "),
            Span::styled(text, style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("Columns: {}", form.columns.len()), hint_style())));
    lines
}
