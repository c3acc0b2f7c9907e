//! Enumerations and field helpers shared by the services and the TUI.
//!
//! Priorities, due-date buckets, sort orders and view modes, plus the hex
//! color rules used for board columns.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority levels in display order. Index equals the stored value.
pub const PRIORITY_LABELS: [&str; 6] = ["Critical", "Urgent", "High", "Medium", "Low", "None"];

/// Stored value for "no priority".
pub const PRIORITY_NONE: i32 = 5;

/// Map a stored priority onto the sortable range; unknown values sort last.
pub fn normalize_priority(priority: i32) -> i32 {
    if (0..=PRIORITY_NONE).contains(&priority) {
        priority
    } else {
        PRIORITY_NONE + 1
    }
}

pub fn format_priority(priority: i32) -> &'static str {
    match normalize_priority(priority) {
        p @ 0..=5 => PRIORITY_LABELS[p as usize],
        _ => "Unknown",
    }
}

/// Due-date bucket used by the filter panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DueFilter {
    #[default]
    Any,
    Soon,
    Overdue,
    NoDate,
}

impl DueFilter {
    pub const ALL: [DueFilter; 4] = [DueFilter::Any, DueFilter::Soon, DueFilter::Overdue, DueFilter::NoDate];

    pub fn label(self) -> &'static str {
        match self {
            DueFilter::Any => "Any",
            DueFilter::Soon => "Due Soon",
            DueFilter::Overdue => "Overdue",
            DueFilter::NoDate => "No Date",
        }
    }

    /// Step through the buckets, wrapping at either end.
    pub fn cycle(self, delta: i32) -> Self {
        cycle_in(&Self::ALL, self, delta)
    }
}

/// Task list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Priority,
    Due,
    Title,
    Updated,
    Created,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Priority,
        SortMode::Due,
        SortMode::Title,
        SortMode::Updated,
        SortMode::Created,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Priority => "Priority",
            SortMode::Due => "Due Date",
            SortMode::Title => "Title",
            SortMode::Updated => "Updated",
            SortMode::Created => "Created",
        }
    }

    pub fn cycle(self, delta: i32) -> Self {
        cycle_in(&Self::ALL, self, delta)
    }
}

/// Base presentation of the task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewMode {
    #[default]
    List,
    Kanban,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Kanban,
            ViewMode::Kanban => ViewMode::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::List => "List",
            ViewMode::Kanban => "Kanban",
        }
    }
}

fn cycle_in<T: Copy + PartialEq>(all: &[T], current: T, delta: i32) -> T {
    let len = all.len() as i32;
    let idx = all.iter().position(|v| *v == current).unwrap_or(0) as i32;
    all[(idx + delta).rem_euclid(len) as usize]
}

/// Palette offered by the board wizard's color picker.
pub const BOARD_COLOR_PALETTE: [&str; 10] = [
    "#60A5FA", "#F59E0B", "#22C55E", "#A78BFA", "#F472B6", "#38BDF8", "#F87171", "#34D399",
    "#FACC15", "#9CA3AF",
];

/// True for `#RRGGBB` with hex digits of either case.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Trim and uppercase a color for storage.
pub fn normalize_hex_color(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Step through the palette from `current`. Colors outside the palette start
/// from the first entry going forward and the last going backward.
pub fn cycle_palette_color(current: &str, delta: i32) -> &'static str {
    let current = normalize_hex_color(current);
    let len = BOARD_COLOR_PALETTE.len() as i32;
    match BOARD_COLOR_PALETTE.iter().position(|c| *c == current) {
        Some(idx) => BOARD_COLOR_PALETTE[(idx as i32 + delta).rem_euclid(len) as usize],
        None if delta < 0 => BOARD_COLOR_PALETTE[BOARD_COLOR_PALETTE.len() - 1],
        None => BOARD_COLOR_PALETTE[0],
    }
}

/// Normalize labels: trim, drop empties, keep the first occurrence of each.
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() || out.iter().any(|l| l == label) {
            continue;
        }
        out.push(label.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_priority() {
        assert_eq!(normalize_priority(0), 0);
        assert_eq!(normalize_priority(5), 5);
        assert_eq!(normalize_priority(-1), 6);
        assert_eq!(normalize_priority(9), 6);
        assert_eq!(format_priority(2), "High");
        assert_eq!(format_priority(42), "Unknown");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#60a5fa"));
        assert!(is_hex_color("#60A5FA"));
        assert!(!is_hex_color("#ZZZZZZ"));
        assert!(!is_hex_color("60A5FA"));
        assert!(!is_hex_color("#60A5F"));
        assert_eq!(normalize_hex_color(" #60a5fa "), "#60A5FA");
    }

    #[test]
    fn test_cycle_palette_color() {
        assert_eq!(cycle_palette_color("#60A5FA", 1), "#F59E0B");
        assert_eq!(cycle_palette_color("#60a5fa", -1), "#9CA3AF");
        assert_eq!(cycle_palette_color("#123456", 1), "#60A5FA");
        assert_eq!(cycle_palette_color("", -1), "#9CA3AF");
    }

    #[test]
    fn test_cycle_enums_wrap() {
        assert_eq!(DueFilter::NoDate.cycle(1), DueFilter::Any);
        assert_eq!(DueFilter::Any.cycle(-1), DueFilter::NoDate);
        assert_eq!(SortMode::Created.cycle(1), SortMode::Priority);
        assert_eq!(ViewMode::List.toggle(), ViewMode::Kanban);
    }

    #[test]
    fn test_normalize_labels() {
        let labels = vec![" a ".to_string(), "".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(normalize_labels(&labels), vec!["a", "b"]);
    }
}
