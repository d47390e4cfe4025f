mod log_view;
mod overlay;
mod status_view;
pub mod styles;
mod transient;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode};

/// Render the whole frame: main pane (status or view), optional process-log
/// split, one-line bottom bar, and any popup for the current input mode.
pub fn draw(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let main = outer[0];
    if app.show_process_log {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main);
        render_main(f, split[0], app);
        log_view::render(f, split[1], app);
    } else {
        render_main(f, main, app);
    }

    render_bottom_bar(f, outer[1], app);

    match &app.input_mode {
        InputMode::Transient(state) => transient::render(f, main, state),
        InputMode::Picker(picker) => overlay::render_picker(f, main, picker),
        _ => {}
    }
}

fn render_main(f: &mut Frame, area: Rect, app: &App) {
    if app.view.is_some() {
        status_view::render_view(f, area, app);
    } else {
        status_view::render(f, area, app);
    }
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.input_mode {
        InputMode::Prompt(prompt) => Line::from(vec![
            Span::styled(prompt.prompt.clone(), styles::key_hint_style()),
            Span::styled(prompt.input.clone(), Style::default().fg(styles::TEXT)),
            Span::styled("▏", Style::default().fg(styles::CYAN)),
        ]),
        InputMode::Confirm(confirm) => Line::from(Span::styled(
            format!("{} (y/n)", confirm.question),
            styles::message_style(),
        )),
        _ => match &app.message {
            Some(message) => Line::from(Span::styled(message.clone(), styles::message_style())),
            None => Line::from(Span::styled(
                "s stage  u unstage  x discard  ⏎ visit  TAB fold  g refresh  ? menus  q quit",
                Style::default().fg(styles::MUTED),
            )),
        },
    };
    f.render_widget(Paragraph::new(line).style(styles::panel_style()), area);
}
