mod app;
mod buffer;
mod commands;
mod config;
mod git;
mod hooks;
mod logger;
mod ops;
mod patch;
mod section;
mod status;
mod ui;

use anyhow::Result;
use app::{App, AppEvent, InputMode};
use clap::Parser;
use commands::Category;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use git::{git_available, new_process_log, repo_root, GitRunner, NotARepository};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Magit-style git status dashboard for the terminal
#[derive(Parser)]
#[command(name = "gd", version, about)]
struct Cli {
    /// Repository path (defaults to the current directory)
    path: Option<String>,

    /// Open with the process log pane visible
    #[arg(long)]
    process_log: bool,

    /// Override the commit-list length for log sections
    #[arg(long)]
    log_max_count: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init()?;

    if !git_available() {
        anyhow::bail!("git is not installed or not in PATH");
    }

    // Resolve the repository root once; it is the working directory for
    // every subsequent invocation from this status buffer.
    let start_dir = PathBuf::from(cli.path.as_deref().unwrap_or("."));
    let probe = GitRunner::for_root(&start_dir, new_process_log(16));
    let git_root = repo_root(&probe)
        .ok_or_else(|| NotARepository(start_dir.display().to_string()))?;

    let mut config = config::load_config(&git_root.to_string_lossy());
    if let Some(n) = cli.log_max_count {
        config.log.max_count = n;
    }

    let (mut app, events_rx) = App::new(git_root, config);
    app.show_process_log = cli.process_log;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, events_rx);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events_rx: Receiver<AppEvent>,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        if app.show_process_log {
            app.sync_process_log();
        }
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for keys with a timeout so worker completions drain too
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match &app.input_mode {
                    InputMode::Normal => handle_normal_input(app, key)?,
                    InputMode::Prompt(_) => handle_prompt_input(app, key),
                    InputMode::Confirm(_) => handle_confirm_input(app, key),
                    InputMode::Transient(_) => handle_transient_input(app, key),
                    InputMode::Picker(_) => handle_picker_input(app, key),
                }
            }
        }

        while let Ok(event) = events_rx.try_recv() {
            app.handle_event(event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<()> {
    // A view pane swallows navigation until closed
    if app.view.is_some() {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.close_view(),
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(view) = app.view.as_mut() {
                    let max = view.buffer.line_count().saturating_sub(1);
                    view.cursor_line = (view.cursor_line + 1).min(max);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(view) = app.view.as_mut() {
                    view.cursor_line = view.cursor_line.saturating_sub(1);
                }
            }
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') => app.should_quit = true,

        // ── Cursor and section navigation ──
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::ALT) => app.next_sibling(),
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::ALT) => app.prev_sibling(),
        KeyCode::Char('n') => app.next_section(),
        KeyCode::Char('p') => app.prev_section(),
        KeyCode::Char('^') => app.parent_section(),

        // ── Folding ──
        KeyCode::Tab => app.toggle_section(),
        KeyCode::Char(c @ '1'..='4') => {
            app.set_visibility_level(c as usize - '0' as usize);
        }

        // ── Refresh ──
        KeyCode::Char('g') | KeyCode::Char('R') => {
            app.refresh_focused();
            app.notify("Refreshing…");
        }

        // ── Point operations ──
        KeyCode::Char('s') => app.stage(),
        KeyCode::Char('u') => app.unstage(),
        KeyCode::Char('x') => app.request_discard(),
        KeyCode::Enter => app.visit(),
        KeyCode::Char('v') => app.start_selection(),
        KeyCode::Esc => app.clear_selection(),

        // ── Transient menus ──
        KeyCode::Char('c') => app.open_transient(Category::Commit),
        KeyCode::Char('P') => app.open_transient(Category::Push),
        KeyCode::Char('F') => app.open_transient(Category::Pull),
        KeyCode::Char('f') => app.open_transient(Category::Fetch),
        KeyCode::Char('z') => app.open_transient(Category::Stash),
        KeyCode::Char('m') => app.open_transient(Category::Merge),
        KeyCode::Char('r') => app.open_transient(Category::Rebase),
        KeyCode::Char('A') => app.open_transient(Category::CherryPick),
        KeyCode::Char('X') => app.open_transient(Category::Reset),
        KeyCode::Char('t') => app.open_transient(Category::Tag),
        KeyCode::Char('l') => app.open_transient(Category::Log),
        KeyCode::Char('d') => app.open_transient(Category::Diff),
        KeyCode::Char('b') => app.open_transient(Category::Branch),

        KeyCode::Char('$') => app.toggle_process_log(),
        KeyCode::Char('?') => {
            app.notify("c commit  P push  F pull  f fetch  z stash  m merge  r rebase  A pick  X reset  t tag  l log  d diff  b branch");
        }
        _ => {}
    }
    Ok(())
}

fn handle_prompt_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Esc => {
            app.pending_transient = None;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if let InputMode::Prompt(prompt) = &mut app.input_mode {
                prompt.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let InputMode::Prompt(prompt) = &mut app.input_mode {
                prompt.input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_confirm_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = match &app.input_mode {
                InputMode::Confirm(confirm) => confirm.action,
                _ => return,
            };
            app.confirm(action);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.notify("Cancelled");
        }
        _ => {}
    }
}

fn handle_transient_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Char(c) => app.transient_key(c),
        _ => {}
    }
}

fn handle_picker_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.accept_picker(),
        KeyCode::Char('j') | KeyCode::Down => {
            if let InputMode::Picker(picker) = &mut app.input_mode {
                if picker.selected + 1 < picker.candidates.len() {
                    picker.selected += 1;
                }
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let InputMode::Picker(picker) = &mut app.input_mode {
                picker.selected = picker.selected.saturating_sub(1);
            }
        }
        _ => {}
    }
}
