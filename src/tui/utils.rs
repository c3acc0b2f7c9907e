//! Layout and text helpers shared by the renderer and the reducer.

use ratatui::layout::Rect;

/// A rectangle of a fixed size centered in `r`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

/// First line of a description, cut to 80 columns.
pub fn summarize_description(description: &str) -> String {
    let trimmed = description.trim();
    let first = trimmed.lines().next().unwrap_or("");
    if first.chars().count() > 80 {
        let head: String = first.chars().take(77).collect();
        format!("{head}...")
    } else {
        first.to_string()
    }
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }
    let head: String = text.chars().take(width - 1).collect();
    format!("{head}…")
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Greedy word wrap. Words longer than the width are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let text = normalize_newlines(text);
    if width == 0 {
        return vec![text];
    }
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let mut remaining: Vec<char> = raw.trim().chars().collect();
        if remaining.is_empty() {
            out.push(String::new());
            continue;
        }
        while remaining.len() > width {
            let chunk = &remaining[..width];
            if remaining[width] == ' ' || remaining[width] == '\t' {
                out.push(chunk.iter().collect());
                remaining = trim_leading(&remaining[width..]);
                continue;
            }
            match chunk.iter().rposition(|c| *c == ' ' || *c == '\t') {
                Some(at) if at > 0 => {
                    out.push(chunk[..at].iter().collect::<String>().trim_end().to_string());
                    remaining = trim_leading(&remaining[at..]);
                }
                _ => {
                    out.push(chunk.iter().collect());
                    remaining = trim_leading(&remaining[width..]);
                }
            }
        }
        if !remaining.is_empty() {
            out.push(remaining.into_iter().collect());
        }
    }
    out
}

fn trim_leading(chars: &[char]) -> Vec<char> {
    chars
        .iter()
        .skip_while(|c| **c == ' ' || **c == '\t')
        .copied()
        .collect()
}

/// How a rendered markdown line should be styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkdownKind {
    Heading(u8),
    Bullet,
    Text,
}

/// A wrapped line of rendered markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownLine {
    pub kind: MarkdownKind,
    pub text: String,
}

/// Minimal markdown: `#`..`###` headings and `- ` bullets, wrapped to width.
/// An empty body renders as a single "(empty)" line.
pub fn markdown_lines(md: &str, width: usize) -> Vec<MarkdownLine> {
    let md = normalize_newlines(md);
    let md = md.trim();
    if md.is_empty() {
        return vec![MarkdownLine {
            kind: MarkdownKind::Text,
            text: "(empty)".to_string(),
        }];
    }
    let mut out = Vec::new();
    for raw in md.lines() {
        let line = raw.trim_end();
        let (kind, text) = if let Some(rest) = line.strip_prefix("### ") {
            (MarkdownKind::Heading(3), rest.to_string())
        } else if let Some(rest) = line.strip_prefix("## ") {
            (MarkdownKind::Heading(2), rest.to_string())
        } else if let Some(rest) = line.strip_prefix("# ") {
            (MarkdownKind::Heading(1), rest.to_string())
        } else if let Some(rest) = line.trim_start().strip_prefix("- ") {
            (MarkdownKind::Bullet, format!("• {rest}"))
        } else {
            (MarkdownKind::Text, line.to_string())
        };
        for text in wrap_text(&text, width) {
            out.push(MarkdownLine { kind, text });
        }
    }
    out
}

/// Geometry of the full task viewer for a terminal size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerLayout {
    pub panel_width: usize,
    pub panel_height: usize,
    pub content_width: usize,
    pub content_height: usize,
    pub left_width: usize,
    pub right_width: usize,
}

impl ViewerLayout {
    pub fn new(width: usize, height: usize) -> Self {
        let mut panel_width = width.saturating_sub(6).max(80);
        if panel_width + 2 > width {
            panel_width = width.saturating_sub(2).max(20);
        }
        let mut panel_height = height.saturating_sub(4).max(18);
        if panel_height + 2 > height {
            panel_height = height.saturating_sub(2).max(10);
        }
        // Border plus one column of padding on each side.
        let content_width = panel_width.saturating_sub(4).max(1);
        let content_height = panel_height.saturating_sub(2).max(1);

        let mut right_width = (content_width / 4).max(24);
        if right_width + 24 > content_width {
            right_width = content_width.saturating_sub(24);
        }
        right_width = right_width.max(16);
        let mut left_width = content_width.saturating_sub(right_width + 1);
        if left_width < 20 {
            left_width = 20;
            right_width = content_width.saturating_sub(left_width + 1).max(16);
        }
        Self {
            panel_width,
            panel_height,
            content_width,
            content_height,
            left_width,
            right_width,
        }
    }

    /// Rows available to the description under the title, meta and hint lines.
    pub fn description_rows(&self) -> usize {
        self.content_height.saturating_sub(3).max(1)
    }

    /// Largest scroll offset for a description.
    pub fn max_scroll(&self, description_md: &str) -> usize {
        markdown_lines(description_md, self.left_width)
            .len()
            .saturating_sub(self.description_rows())
    }
}
