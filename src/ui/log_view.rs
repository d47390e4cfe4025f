use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::ui::styles;

/// Render the tail of the process-log buffer: one record per command, `$ git
/// …` headers highlighted.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let height = area.height.saturating_sub(2) as usize;
    let line_count = app.process_log_buffer.line_count();
    let start = line_count.saturating_sub(height.max(1));

    let lines: Vec<Line> = (start..line_count)
        .map(|line_no| {
            let text = app.process_log_buffer.line_text(line_no);
            let style = if text.starts_with("$ git ") {
                styles::face_style(crate::buffer::Face::LogCommand)
            } else if text.starts_with("ERROR:") {
                Style::default().fg(styles::RED)
            } else {
                Style::default().fg(styles::DIM)
            };
            Line::from(Span::styled(text.to_string(), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::BORDER))
        .title(" process log ");
    f.render_widget(
        Paragraph::new(lines).style(styles::panel_style()).block(block),
        area,
    );
}
