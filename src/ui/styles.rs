use ratatui::style::{Color, Modifier, Style};

use crate::buffer::Face;

// ── Background colors (deep slate, slightly blue) ──
pub const BG: Color = Color::Rgb(13, 15, 21);
pub const SURFACE: Color = Color::Rgb(23, 26, 36);
pub const BORDER: Color = Color::Rgb(52, 57, 76);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(202, 211, 232);
pub const DIM: Color = Color::Rgb(122, 131, 158);
pub const MUTED: Color = Color::Rgb(79, 86, 110);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(122, 162, 247);
pub const CYAN: Color = Color::Rgb(125, 207, 255);
pub const GREEN: Color = Color::Rgb(158, 206, 106);
pub const YELLOW: Color = Color::Rgb(224, 175, 104);
pub const RED: Color = Color::Rgb(247, 118, 142);
pub const PURPLE: Color = Color::Rgb(187, 154, 247);

// ── Diff colors (tinted backgrounds, vivid text) ──
pub const ADD_BG: Color = Color::Rgb(21, 38, 27);
pub const DEL_BG: Color = Color::Rgb(45, 21, 30);
pub const HUNK_BG: Color = Color::Rgb(27, 29, 48);

/// Line cursor background
pub const CURSOR_BG: Color = Color::Rgb(42, 46, 68);

/// Region selection background
pub const SELECTION_BG: Color = Color::Rgb(34, 37, 58);

/// Base style of the main panes
pub fn base_style() -> Style {
    Style::new().fg(TEXT).bg(BG)
}

/// Style of secondary panes (process log, popups, the bottom bar)
pub fn panel_style() -> Style {
    Style::new().fg(TEXT).bg(SURFACE)
}

pub fn key_hint_style() -> Style {
    Style::new().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn message_style() -> Style {
    Style::new().fg(CYAN)
}

/// Map an abstract face key onto its terminal style
pub fn face_style(face: Face) -> Style {
    match face {
        Face::Heading => Style::new().fg(BLUE).add_modifier(Modifier::BOLD),
        Face::SectionHeading => Style::new().fg(PURPLE).add_modifier(Modifier::BOLD),
        Face::FileRow => Style::new().fg(YELLOW),
        Face::UntrackedRow => Style::new().fg(DIM),
        Face::HunkHeader => Style::new().fg(PURPLE).bg(HUNK_BG),
        Face::DiffAdd => Style::new().fg(GREEN).bg(ADD_BG),
        Face::DiffRemove => Style::new().fg(RED).bg(DEL_BG),
        Face::DiffContext => Style::new().fg(DIM),
        Face::CommitRow => Style::new().fg(CYAN),
        Face::StashRow => Style::new().fg(YELLOW),
        Face::LogCommand => Style::new().fg(GREEN).add_modifier(Modifier::BOLD),
    }
}
