//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Focused field borders and the selected row.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Header title.
pub const CREAM: Color = Color::Rgb(255, 255, 175);
/// Secondary text: header meta, shortcut line, empty-column marker.
pub const MUTED: Color = Color::Rgb(148, 148, 148);
/// Status line.
pub const AMBER: Color = Color::Rgb(255, 215, 135);
/// Due today.
pub const DUE_TODAY: Color = Color::Rgb(255, 215, 0);
/// Overdue.
pub const DUE_OVERDUE: Color = Color::Rgb(255, 95, 95);
/// Due later.
pub const DUE_DEFAULT: Color = Color::Rgb(208, 208, 208);
/// No due date.
pub const DUE_NONE: Color = Color::Rgb(138, 138, 138);
/// Panel borders.
pub const PANEL_BORDER: Color = Color::Rgb(188, 188, 188);

/// Convert `#RRGGBB` to a terminal color; anything else falls back to white.
pub fn hex_to_color(hex: &str) -> Color {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return Color::White;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// Color for a priority value.
pub fn priority_color(priority: i32) -> Color {
    match priority {
        0 => Color::Rgb(239, 68, 68),
        1 => Color::Rgb(249, 115, 22),
        2 => Color::Rgb(245, 158, 11),
        3 => Color::Rgb(96, 165, 250),
        4 => Color::Rgb(156, 163, 175),
        _ => MUTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("#60A5FA"), Color::Rgb(0x60, 0xA5, 0xFA));
        assert_eq!(hex_to_color("#zzzzzz"), Color::White);
        assert_eq!(hex_to_color("#fff"), Color::White);
    }
}
