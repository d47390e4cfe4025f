use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::commands::{transient_for, TransientState};
use crate::ui::styles;

/// Bottom-anchored transient popup: one line per switch with its state, one
/// line per suffix command.
pub fn render(f: &mut Frame, area: Rect, state: &TransientState) {
    let transient = transient_for(state.category);

    let mut lines: Vec<Line> = Vec::new();
    if !transient.switches.is_empty() {
        lines.push(Line::from(Span::styled(
            "Switches",
            Style::default().fg(styles::MUTED),
        )));
        for switch in transient.switches {
            let on = state.is_enabled(switch.key);
            let marker = if on { "x" } else { " " };
            let mut text = format!(" [{marker}] -{}  {} ({})", switch.key, switch.desc, switch.arg);
            if let Some(value) = state.value(switch.key) {
                text.push_str(&format!(" = {value}"));
            }
            let style = if on {
                Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(styles::DIM)
            };
            lines.push(Line::from(Span::styled(text, style)));
        }
    }
    lines.push(Line::from(Span::styled(
        "Commands",
        Style::default().fg(styles::MUTED),
    )));
    for suffix in transient.suffixes {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}  ", suffix.key), styles::key_hint_style()),
            Span::styled(suffix.label, Style::default().fg(styles::TEXT)),
        ]));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height),
        width: area.width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::PURPLE))
        .title(format!(" {} ", transient.title));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).style(styles::panel_style()).block(block),
        popup,
    );
}
