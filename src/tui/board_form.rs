//! The board creation wizard and the column reorder tool.

use crate::board::{default_columns, Column, ColumnSpec};
use crate::fields::{cycle_palette_color, is_hex_color, normalize_hex_color, BOARD_COLOR_PALETTE};
use crate::tui::filters::clamp_index;
use crate::tui::input::InputField;

/// One (name, color) row of the wizard.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnRow {
    pub name: InputField,
    pub color: InputField,
}

impl ColumnRow {
    /// A row numbered from 1; a blank color takes the palette entry for that slot.
    pub fn new(index: usize, name: &str, color: &str) -> Self {
        let color = if color.trim().is_empty() {
            BOARD_COLOR_PALETTE[index.saturating_sub(1) % BOARD_COLOR_PALETTE.len()].to_string()
        } else {
            normalize_hex_color(color)
        };
        Self {
            name: InputField::with_value(name),
            color: InputField::with_value(&color),
        }
    }
}

/// Board name plus a resizable list of column rows.
///
/// Focus 0 is the board name; after that each row owns two slots, name then
/// color.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardCreateForm {
    pub name: InputField,
    pub columns: Vec<ColumnRow>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Default for BoardCreateForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardCreateForm {
    /// Starts with the default Todo/Doing/Done columns.
    pub fn new() -> Self {
        let columns = default_columns()
            .iter()
            .enumerate()
            .map(|(i, spec)| ColumnRow::new(i + 1, &spec.name, &spec.color))
            .collect();
        Self {
            name: InputField::new(),
            columns,
            focus: 0,
            error: None,
        }
    }

    pub fn field_count(&self) -> usize {
        1 + self.columns.len() * 2
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 == self.field_count()
    }

    pub fn move_focus(&mut self, delta: i32) {
        let count = self.field_count() as i32;
        self.focus = (self.focus as i32 + delta).rem_euclid(count) as usize;
    }

    /// Row index under focus, if a row field is focused.
    pub fn focused_row(&self) -> Option<usize> {
        if self.focus == 0 {
            return None;
        }
        let row = (self.focus - 1) / 2;
        (row < self.columns.len()).then_some(row)
    }

    /// Row index when its color field is focused.
    pub fn focused_color_row(&self) -> Option<usize> {
        self.focused_row().filter(|_| (self.focus - 1) % 2 == 1)
    }

    pub fn current_input(&mut self) -> &mut InputField {
        match self.focused_row() {
            None => &mut self.name,
            Some(row) if (self.focus - 1) % 2 == 0 => &mut self.columns[row].name,
            Some(row) => &mut self.columns[row].color,
        }
    }

    /// Type into the focused field; color fields are kept uppercase.
    pub fn handle_char(&mut self, c: char) {
        let is_color = self.focused_color_row().is_some();
        let field = self.current_input();
        field.handle_char(c);
        if is_color {
            let upper = field.value.to_uppercase();
            let cursor = field.cursor;
            field.value = upper;
            field.cursor = cursor;
        }
    }

    /// Step the focused color through the palette. Returns false when no
    /// color field is focused.
    pub fn cycle_color(&mut self, delta: i32) -> bool {
        match self.focused_color_row() {
            Some(row) => {
                let next = cycle_palette_color(&self.columns[row].color.value, delta);
                self.columns[row].color.set_value(next);
                true
            }
            None => false,
        }
    }

    /// Append a row and focus its name.
    pub fn add_column(&mut self) {
        let index = self.columns.len() + 1;
        self.columns.push(ColumnRow::new(index, "", ""));
        self.focus = 1 + (self.columns.len() - 1) * 2;
    }

    /// Remove the focused row; at least one row always remains.
    pub fn remove_focused_column(&mut self) -> bool {
        let Some(row) = self.focused_row() else {
            return false;
        };
        if self.columns.len() <= 1 {
            return false;
        }
        self.columns.remove(row);
        self.focus = (1 + row * 2).min(self.field_count() - 1);
        true
    }

    /// Validate and collect the rows. Rows with neither name nor color are skipped.
    pub fn validate(&self) -> Result<(String, Vec<ColumnSpec>), String> {
        let name = self.name.value.trim();
        if name.is_empty() {
            return Err("board name is required".to_string());
        }
        let mut specs = Vec::with_capacity(self.columns.len());
        for (idx, row) in self.columns.iter().enumerate() {
            let col_name = row.name.value.trim();
            let color = normalize_hex_color(&row.color.value);
            if col_name.is_empty() && color.is_empty() {
                continue;
            }
            if col_name.is_empty() {
                return Err(format!("column {} name is required", idx + 1));
            }
            if !is_hex_color(&color) {
                return Err(format!("column {} color must be HEX (#RRGGBB)", idx + 1));
            }
            specs.push(ColumnSpec::new(col_name, &color));
        }
        if specs.is_empty() {
            return Err("add at least one column".to_string());
        }
        Ok((name.to_string(), specs))
    }
}

/// Column order being edited for one board.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnOrderForm {
    pub board_id: String,
    pub board_name: String,
    pub columns: Vec<Column>,
    pub selected: usize,
}

impl ColumnOrderForm {
    pub fn new(board_id: &str, board_name: &str, mut columns: Vec<Column>) -> Result<Self, String> {
        if board_id.trim().is_empty() {
            return Err("no board selected".to_string());
        }
        if columns.is_empty() {
            return Err("selected board has no columns".to_string());
        }
        crate::board::sort_columns(&mut columns);
        Ok(Self {
            board_id: board_id.to_string(),
            board_name: board_name.to_string(),
            columns,
            selected: 0,
        })
    }

    pub fn move_selection(&mut self, delta: i32) {
        let next = (self.selected as i32 + delta).max(0) as usize;
        self.selected = clamp_index(next, self.columns.len());
    }

    /// Swap the selected column with its neighbour and renumber 1..N.
    /// Returns false at either end.
    pub fn move_selected(&mut self, delta: i32) -> bool {
        if self.columns.len() < 2 {
            return false;
        }
        let target = self.selected as i32 + delta;
        if target < 0 || target as usize >= self.columns.len() {
            return false;
        }
        let target = target as usize;
        self.columns.swap(self.selected, target);
        self.selected = target;
        for (i, col) in self.columns.iter_mut().enumerate() {
            col.position = i as i32 + 1;
        }
        true
    }

    pub fn ordered_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }
}
