use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::PickerState;
use crate::ui::styles;

/// Centered picker popup over the candidate list
pub fn render_picker(f: &mut Frame, area: Rect, picker: &PickerState) {
    let width = (area.width * 2 / 3).clamp(24, 70);
    let height = ((picker.candidates.len() as u16) + 2).min(area.height * 2 / 3).max(3);
    let popup = centered(area, width, height);

    let visible = height.saturating_sub(2) as usize;
    let scroll = picker.selected.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = picker
        .candidates
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible.max(1))
        .map(|(i, candidate)| {
            let style = if i == picker.selected {
                Style::default()
                    .fg(styles::PURPLE)
                    .bg(styles::SELECTION_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(styles::TEXT)
            };
            Line::from(Span::styled(format!(" {candidate}"), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::PURPLE))
        .title(format!(" {} ", picker.title));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).style(styles::panel_style()).block(block),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
