use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::ui::styles;

/// Render the status buffer: visible lines only, faces from the buffer's
/// overlays, cursor and region selection highlighted.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let buf = app.buf();
    let hidden = buf.tree.hidden_ranges();
    let selection = buf.selection.map(|s| s.ordered());

    // visible buffer lines with their real line numbers
    let visible: Vec<usize> = (0..buf.buffer.line_count())
        .filter(|&line| {
            !hidden
                .iter()
                .any(|&(start, end)| start <= line && line <= end)
        })
        .collect();

    // keep the cursor inside the viewport
    let height = area.height.saturating_sub(2) as usize;
    let cursor_pos = visible
        .iter()
        .position(|&l| l == buf.cursor_line)
        .unwrap_or(0);
    let scroll = cursor_pos.saturating_sub(height.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for &line_no in visible.iter().skip(scroll).take(height.max(1)) {
        let text = buf.buffer.line_text(line_no);
        let mut style = buf
            .buffer
            .face_at_line(line_no)
            .map(styles::face_style)
            .unwrap_or_else(|| Style::default().fg(styles::TEXT));

        if let Some((start, end)) = selection {
            if start <= line_no && line_no <= end {
                style = style.bg(styles::SELECTION_BG);
            }
        }
        if line_no == buf.cursor_line {
            style = style.bg(styles::CURSOR_BG);
        }

        // collapsed sections get an ellipsis marker on the heading
        let collapsed_marker = buf
            .tree
            .section_at_line(line_no)
            .map(|id| {
                let node = buf.tree.get(id);
                node.start_line == line_no && node.collapsed && !node.children.is_empty()
            })
            .unwrap_or(false);

        let content = if collapsed_marker {
            format!("{text}…")
        } else {
            text.to_string()
        };
        lines.push(Line::from(Span::styled(content, style)));
    }

    let title = format!(" {} ", app.focused_root.display());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::BORDER))
        .title(title);
    f.render_widget(
        Paragraph::new(lines).style(styles::base_style()).block(block),
        area,
    );
}

/// Render a read-only view pane (old content, commit diff, log output)
pub fn render_view(f: &mut Frame, area: Rect, app: &App) {
    let Some(ref view) = app.view else {
        return;
    };

    let height = area.height.saturating_sub(2) as usize;
    let scroll = view.cursor_line.saturating_sub(height / 2);

    let lines: Vec<Line> = (scroll..view.buffer.line_count())
        .take(height.max(1))
        .map(|line_no| {
            let text = view.buffer.line_text(line_no);
            let mut style = diff_text_style(text);
            if line_no == view.cursor_line {
                style = style.bg(styles::CURSOR_BG);
            }
            Line::from(Span::styled(text.to_string(), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::BORDER))
        .title(format!(" {} (q to close) ", view.title));
    f.render_widget(
        Paragraph::new(lines).style(styles::base_style()).block(block),
        area,
    );
}

fn diff_text_style(line: &str) -> Style {
    if line.starts_with("+++") || line.starts_with("---") || line.starts_with("@@") {
        Style::default().fg(styles::PURPLE)
    } else if line.starts_with('+') {
        Style::default().fg(styles::GREEN)
    } else if line.starts_with('-') {
        Style::default().fg(styles::RED)
    } else {
        Style::default().fg(styles::TEXT)
    }
}
