use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::buffer::TextBuffer;
use crate::commands::{
    build_args, run_op, spawn_op, transient_for, Category, CommandSpec, OpResult, Outcome,
    Positional, TransientState,
};
use crate::config::DeckConfig;
use crate::git::{
    self, new_process_log, parse_branch_list, GitRunner, ProcessLogHandle, BRANCH_FORMAT,
};
use crate::hooks::{HookArgs, HookBus, AFTER_SAVE, COMMIT_FINISHED, POST_OPERATION, STATUS_REFRESHED};
use crate::ops::{self, VisitTarget, COMMIT_VIEW_FORMAT};
use crate::section::SectionData;
use crate::status::{collect_snapshots, GitData, StatusBuffer};

/// Completions delivered to the main loop from worker threads
pub enum AppEvent {
    SnapshotsReady { root: PathBuf, data: GitData },
    OpFinished(OpResult),
    RefreshRequested { root: PathBuf },
    EditorClosed { root: PathBuf },
}

/// What a pending y/n confirmation will do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmAction {
    Discard,
}

/// Follow-up for a submitted prompt
pub enum PromptAction {
    /// Positional input for a matrix command
    CommandArg {
        spec: CommandSpec,
        switches: Vec<String>,
    },
    /// Second stage of tag creation: optional annotation message
    TagMessage {
        spec: CommandSpec,
        switches: Vec<String>,
        name: String,
    },
    /// Value for a value-bearing transient switch
    SwitchValue { key: char },
}

pub struct PromptState {
    pub prompt: String,
    pub input: String,
    pub action: PromptAction,
}

pub enum PickerAction {
    CommandArg {
        spec: CommandSpec,
        switches: Vec<String>,
    },
}

pub struct PickerState {
    pub title: String,
    pub candidates: Vec<String>,
    pub selected: usize,
    pub action: PickerAction,
}

pub struct ConfirmState {
    pub question: String,
    pub action: ConfirmAction,
}

pub enum InputMode {
    Normal,
    Prompt(PromptState),
    Confirm(ConfirmState),
    Transient(TransientState),
    Picker(PickerState),
}

/// A read-only content pane (old file content, commit diff, log output)
pub struct ViewPane {
    pub title: String,
    pub buffer: TextBuffer,
    pub cursor_line: usize,
}

pub struct App {
    pub config: DeckConfig,
    pub process_log: ProcessLogHandle,
    pub process_log_buffer: TextBuffer,
    pub status_bufs: HashMap<PathBuf, StatusBuffer>,
    /// Most recently focused status buffer's root
    pub focused_root: PathBuf,
    pub hooks: HookBus,
    pub input_mode: InputMode,
    /// Transient stashed aside while a switch-value prompt is open
    pub pending_transient: Option<TransientState>,
    pub view: Option<ViewPane>,
    pub message: Option<String>,
    pub show_process_log: bool,
    pub should_quit: bool,
    events_tx: Sender<AppEvent>,
}

impl App {
    /// Create the app for one repository root and fire the initial refresh.
    pub fn new(git_root: PathBuf, config: DeckConfig) -> (Self, Receiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::channel();
        let process_log = new_process_log(config.process_log.max_lines);

        let mut status_bufs = HashMap::new();
        status_bufs.insert(
            git_root.clone(),
            StatusBuffer::new(
                git_root.clone(),
                Duration::from_millis(config.refresh.debounce_ms),
                config.display.show_recent,
                config.display.show_stashes,
            ),
        );

        let mut process_log_buffer = TextBuffer::new();
        process_log_buffer.set_read_only(true);

        let mut app = App {
            config,
            process_log,
            process_log_buffer,
            status_bufs,
            focused_root: git_root.clone(),
            hooks: HookBus::new(),
            input_mode: InputMode::Normal,
            pending_transient: None,
            view: None,
            message: None,
            show_process_log: false,
            should_quit: false,
            events_tx,
        };
        app.hooks.add(STATUS_REFRESHED, |_| {
            info!("status refreshed");
        });
        // Revert pass: after tree-changing operations an embedding host
        // reloads its unmodified file-backed buffers from disk here.
        app.hooks.add(POST_OPERATION, |args| {
            let tree_changing = matches!(
                args.args.first().map(String::as_str),
                Some("checkout") | Some("pull") | Some("merge") | Some("rebase") | Some("stash")
            );
            if tree_changing && args.exit == Some(0) {
                info!(op = ?args.op, "worktree changed; reverting file buffers");
            }
        });
        app.refresh(git_root);
        (app, events_rx)
    }

    pub fn runner(&self) -> GitRunner {
        GitRunner::for_root(&self.focused_root, self.process_log.clone())
    }

    fn runner_for(&self, root: &PathBuf) -> GitRunner {
        GitRunner::for_root(root, self.process_log.clone())
    }

    pub fn buf(&self) -> &StatusBuffer {
        self.status_bufs
            .get(&self.focused_root)
            .expect("focused status buffer exists")
    }

    pub fn buf_mut(&mut self) -> &mut StatusBuffer {
        self.status_bufs
            .get_mut(&self.focused_root)
            .expect("focused status buffer exists")
    }

    pub fn notify(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }

    // ── Refresh (single-flight; render happens on SnapshotsReady) ──

    pub fn refresh_focused(&mut self) {
        let root = self.focused_root.clone();
        self.refresh(root);
    }

    pub fn refresh(&mut self, root: PathBuf) {
        let Some(buf) = self.status_bufs.get(&root) else {
            return;
        };
        if !buf.scheduler.try_begin() {
            return;
        }
        let runner = self.runner_for(&root);
        let tx = self.events_tx.clone();
        let log_max = self.config.log.max_count;
        thread::spawn(move || {
            let data = collect_snapshots(&runner, log_max);
            let _ = tx.send(AppEvent::SnapshotsReady { root, data });
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SnapshotsReady { root, data } => {
                if let Some(buf) = self.status_bufs.get_mut(&root) {
                    buf.install(data);
                    buf.scheduler.finish();
                    self.hooks.fire(STATUS_REFRESHED, &HookArgs::default());
                }
            }
            AppEvent::OpFinished(result) => {
                self.hooks.fire(
                    POST_OPERATION,
                    &HookArgs::operation(&result.op, &result.args, result.exit),
                );
                self.message = Some(result.message);
                self.refresh_focused();
            }
            AppEvent::RefreshRequested { root } => self.refresh(root),
            AppEvent::EditorClosed { root } => {
                self.hooks.fire(AFTER_SAVE, &HookArgs::default());
                if let Some(buf) = self.status_bufs.get(&root) {
                    let tx = self.events_tx.clone();
                    buf.scheduler.debounced_after_save(move || {
                        let _ = tx.send(AppEvent::RefreshRequested { root });
                    });
                }
            }
        }
    }

    // ── Cursor movement over visible lines ──

    pub fn cursor_down(&mut self) {
        let buf = self.buf_mut();
        let max = buf.buffer.line_count().saturating_sub(1);
        let mut line = buf.cursor_line;
        while line < max {
            line += 1;
            if buf.tree.is_line_visible(line) {
                buf.cursor_line = line;
                return;
            }
        }
    }

    pub fn cursor_up(&mut self) {
        let buf = self.buf_mut();
        let mut line = buf.cursor_line;
        while line > 0 {
            line -= 1;
            if buf.tree.is_line_visible(line) {
                buf.cursor_line = line;
                return;
            }
        }
    }

    pub fn next_section(&mut self) {
        let buf = self.buf_mut();
        if let Some(line) = buf.tree.next_section_line(buf.cursor_line) {
            buf.cursor_line = line;
        }
    }

    pub fn prev_section(&mut self) {
        let buf = self.buf_mut();
        if let Some(line) = buf.tree.prev_section_line(buf.cursor_line) {
            buf.cursor_line = line;
        }
    }

    pub fn next_sibling(&mut self) {
        let buf = self.buf_mut();
        if let Some(line) = buf.tree.next_sibling_line(buf.cursor_line) {
            buf.cursor_line = line;
        }
    }

    pub fn prev_sibling(&mut self) {
        let buf = self.buf_mut();
        if let Some(line) = buf.tree.prev_sibling_line(buf.cursor_line) {
            buf.cursor_line = line;
        }
    }

    pub fn parent_section(&mut self) {
        let buf = self.buf_mut();
        if let Some(line) = buf.tree.parent_section_line(buf.cursor_line) {
            buf.cursor_line = line;
        }
    }

    // ── Point operations ──

    pub fn toggle_section(&mut self) {
        let runner = self.runner();
        self.buf_mut().toggle_at_cursor(&runner);
    }

    pub fn set_visibility_level(&mut self, level: usize) {
        self.buf_mut().set_visibility_level(level);
    }

    pub fn stage(&mut self) {
        let runner = self.runner();
        let outcome = ops::stage(self.buf_mut(), &runner);
        self.finish_point_op(outcome);
    }

    pub fn unstage(&mut self) {
        let runner = self.runner();
        let outcome = ops::unstage(self.buf_mut(), &runner);
        self.finish_point_op(outcome);
    }

    /// `x`: ask first when configured, then discard on `y`.
    pub fn request_discard(&mut self) {
        let Some(question) = ops::discard_description(self.buf()) else {
            self.notify("Nothing to discard here");
            return;
        };
        if self.config.confirm.discard {
            self.input_mode = InputMode::Confirm(ConfirmState {
                question,
                action: ConfirmAction::Discard,
            });
        } else {
            self.confirm(ConfirmAction::Discard);
        }
    }

    pub fn confirm(&mut self, action: ConfirmAction) {
        self.input_mode = InputMode::Normal;
        match action {
            ConfirmAction::Discard => {
                let runner = self.runner();
                let outcome = ops::discard(self.buf_mut(), &runner);
                self.finish_point_op(outcome);
            }
        }
    }

    /// Mutation failures surface one line and still refresh, reconciling the
    /// UI with whatever actually happened.
    fn finish_point_op(&mut self, outcome: Result<String>) {
        match outcome {
            Ok(message) => self.notify(&message),
            Err(err) => self.notify(&err.to_string()),
        }
        self.refresh_focused();
    }

    pub fn start_selection(&mut self) {
        self.buf_mut().extend_selection();
    }

    pub fn clear_selection(&mut self) {
        self.buf_mut().clear_selection();
    }

    // ── Visit ──

    pub fn visit(&mut self) {
        let Some(target) = ops::visit_target(self.buf()) else {
            self.notify("Nothing to visit here");
            return;
        };
        let runner = self.runner();
        match target {
            VisitTarget::File { path, line } => self.open_editor(path, line),
            VisitTarget::OldContent {
                ref_spec,
                title,
                line,
            } => {
                let out = runner.run(&["show", &ref_spec]);
                if out.ok() {
                    self.open_view(&title, &out.stdout, line.saturating_sub(1));
                } else {
                    self.notify(&out.first_error_line());
                }
            }
            VisitTarget::CommitDiff { hash } => {
                let out = runner.run(&["show", COMMIT_VIEW_FORMAT, &hash]);
                if out.ok() {
                    self.open_view(&hash, &out.stdout, 0);
                } else {
                    self.notify(&out.first_error_line());
                }
            }
            VisitTarget::StashDiff { stash_ref } => {
                let out = runner.run(&["stash", "show", "-p", &stash_ref]);
                if out.ok() {
                    self.open_view(&stash_ref, &out.stdout, 0);
                } else {
                    self.notify(&out.first_error_line());
                }
            }
        }
    }

    /// Launch `$EDITOR +line path` on a worker thread; its exit fires the
    /// after-save hook and the debounced refresh.
    fn open_editor(&mut self, path: PathBuf, line: usize) {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
        let root = self.focused_root.clone();
        let tx = self.events_tx.clone();
        thread::spawn(move || {
            let _ = std::process::Command::new(&editor)
                .arg(format!("+{line}"))
                .arg(&path)
                .status();
            let _ = tx.send(AppEvent::EditorClosed { root });
        });
        self.notify("Editing; status refreshes when the editor exits");
    }

    pub fn open_view(&mut self, title: &str, content: &str, cursor_line: usize) {
        let mut buffer = TextBuffer::new();
        let _ = buffer.set_text(content);
        buffer.set_read_only(true);
        let cursor_line = cursor_line.min(buffer.line_count().saturating_sub(1));
        self.view = Some(ViewPane {
            title: title.to_string(),
            buffer,
            cursor_line,
        });
    }

    pub fn close_view(&mut self) {
        self.view = None;
    }

    // ── Transients and matrix commands ──

    pub fn open_transient(&mut self, category: Category) {
        self.input_mode = InputMode::Transient(TransientState::new(category));
    }

    /// Key press while a transient is open: toggle a switch or fire a suffix.
    pub fn transient_key(&mut self, key: char) {
        let InputMode::Transient(state) = std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };
        let transient = transient_for(state.category);

        if let Some(switch) = transient.switches.iter().find(|s| s.key == key) {
            let mut state = state;
            if switch.takes_value {
                if state.is_enabled(key) {
                    state.set_value(key, String::new());
                    self.input_mode = InputMode::Transient(state);
                } else {
                    self.pending_transient = Some(state);
                    self.input_mode = InputMode::Prompt(PromptState {
                        prompt: format!("{}: ", switch.desc),
                        input: String::new(),
                        action: PromptAction::SwitchValue { key },
                    });
                }
            } else {
                state.toggle(key);
                self.input_mode = InputMode::Transient(state);
            }
            return;
        }

        if let Some(spec) = transient.suffixes.iter().find(|s| s.key == key).copied() {
            let switches = state.args();
            self.resolve_positional(spec, switches);
            return;
        }

        // Unknown key keeps the transient open
        self.input_mode = InputMode::Transient(state);
    }

    /// Gather the command's positional input, then execute.
    fn resolve_positional(&mut self, spec: CommandSpec, switches: Vec<String>) {
        match spec.positional {
            Positional::None => self.execute_command(spec, switches, Vec::new()),
            Positional::CommitMessage => self.prompt_for(spec, switches, "Commit message: "),
            Positional::Rev => self.prompt_for(spec, switches, "Revision: "),
            Positional::RevOrRange => self.prompt_for(spec, switches, "Revision or range: "),
            Positional::FilePath => self.prompt_for(spec, switches, "File: "),
            Positional::OptionalMessage => self.prompt_for(spec, switches, "Message (optional): "),
            Positional::RemoteBranch => self.prompt_for(spec, switches, "Remote [branch]: "),
            Positional::TagName => self.prompt_for(spec, switches, "Tag name: "),
            Positional::PushTarget => {
                let runner = self.runner();
                match git::push_remote_ref(&runner, None) {
                    Some(target) => {
                        let positional = split_remote_ref(&target);
                        self.execute_command(spec, switches, positional);
                    }
                    None => self.prompt_for(spec, switches, "Push to (remote branch): "),
                }
            }
            Positional::UpstreamRemote => {
                let runner = self.runner();
                match git::upstream_ref(&runner, None) {
                    Some(upstream) => {
                        let remote = upstream
                            .split_once('/')
                            .map(|(r, _)| r.to_string())
                            .unwrap_or(upstream);
                        self.execute_command(spec, switches, vec![remote]);
                    }
                    None => self.prompt_for(spec, switches, "Remote: "),
                }
            }
            Positional::UpstreamRef => {
                let runner = self.runner();
                match git::upstream_ref(&runner, None) {
                    Some(upstream) => self.execute_command(spec, switches, vec![upstream]),
                    None => self.prompt_for(spec, switches, "Rebase onto: "),
                }
            }
            Positional::StashAtPoint => {
                let positional = self.stash_at_point().into_iter().collect();
                self.execute_command(spec, switches, positional);
            }
            Positional::BranchPick => {
                let runner = self.runner();
                let format_arg = format!("--format={BRANCH_FORMAT}");
                let out = runner.run(&["branch", "--all", &format_arg]);
                let candidates: Vec<String> = parse_branch_list(&out.stdout)
                    .into_iter()
                    .filter(|b| !b.current)
                    .map(|b| b.short_name().to_string())
                    .collect();
                self.open_picker("Branch", candidates, spec, switches);
            }
            Positional::TagPick => {
                let runner = self.runner();
                let out = runner.run(&["tag", "--list"]);
                let candidates: Vec<String> =
                    out.stdout.lines().map(|l| l.to_string()).collect();
                self.open_picker("Tag", candidates, spec, switches);
            }
        }
    }

    fn prompt_for(&mut self, spec: CommandSpec, switches: Vec<String>, prompt: &str) {
        self.input_mode = InputMode::Prompt(PromptState {
            prompt: prompt.to_string(),
            input: String::new(),
            action: PromptAction::CommandArg { spec, switches },
        });
    }

    fn open_picker(
        &mut self,
        title: &str,
        candidates: Vec<String>,
        spec: CommandSpec,
        switches: Vec<String>,
    ) {
        if candidates.is_empty() {
            self.notify(&format!("No {} candidates", title.to_lowercase()));
            return;
        }
        self.input_mode = InputMode::Picker(PickerState {
            title: title.to_string(),
            candidates,
            selected: 0,
            action: PickerAction::CommandArg { spec, switches },
        });
    }

    fn stash_at_point(&self) -> Option<String> {
        let buf = self.buf();
        let id = buf.section_at_cursor()?;
        match &buf.tree.get(id).data {
            SectionData::Stash { stash } => Some(stash.stash_ref.clone()),
            _ => None,
        }
    }

    /// Submit the open prompt.
    pub fn submit_prompt(&mut self) {
        let InputMode::Prompt(prompt) = std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };
        let input = prompt.input.trim().to_string();
        match prompt.action {
            PromptAction::SwitchValue { key } => {
                if let Some(mut state) = self.pending_transient.take() {
                    state.set_value(key, input);
                    self.input_mode = InputMode::Transient(state);
                }
            }
            PromptAction::CommandArg { spec, switches } => {
                let positional = match spec.positional {
                    Positional::CommitMessage => {
                        if input.is_empty() {
                            self.notify("Empty commit message");
                            return;
                        }
                        vec!["-m".to_string(), input]
                    }
                    Positional::OptionalMessage => {
                        if input.is_empty() {
                            Vec::new()
                        } else {
                            vec!["-m".to_string(), input]
                        }
                    }
                    Positional::RemoteBranch | Positional::PushTarget => {
                        let parts: Vec<String> =
                            input.split_whitespace().map(String::from).collect();
                        if parts.is_empty() {
                            self.notify("No remote given");
                            return;
                        }
                        parts
                    }
                    Positional::TagName => {
                        if input.is_empty() {
                            self.notify("No tag name given");
                            return;
                        }
                        self.input_mode = InputMode::Prompt(PromptState {
                            prompt: "Annotation (empty for lightweight): ".to_string(),
                            input: String::new(),
                            action: PromptAction::TagMessage {
                                spec,
                                switches,
                                name: input,
                            },
                        });
                        return;
                    }
                    _ => {
                        if input.is_empty() {
                            self.notify("Empty input");
                            return;
                        }
                        vec![input]
                    }
                };
                self.execute_command(spec, switches, positional);
            }
            PromptAction::TagMessage {
                spec,
                switches,
                name,
            } => {
                let positional = if input.is_empty() {
                    vec![name]
                } else {
                    vec!["-a".to_string(), name, "-m".to_string(), input]
                };
                self.execute_command(spec, switches, positional);
            }
        }
    }

    /// Accept the highlighted picker candidate.
    pub fn accept_picker(&mut self) {
        let InputMode::Picker(picker) = std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };
        let Some(choice) = picker.candidates.get(picker.selected).cloned() else {
            return;
        };
        match picker.action {
            PickerAction::CommandArg { spec, switches } => {
                self.execute_command(spec, switches, vec![choice]);
            }
        }
    }

    pub fn execute_command(
        &mut self,
        spec: CommandSpec,
        switches: Vec<String>,
        positional: Vec<String>,
    ) {
        let args = build_args(&spec, &switches, &positional);
        let runner = self.runner();
        match spec.outcome {
            Outcome::View => {
                let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
                let out = runner.run(&arg_refs);
                if out.ok() {
                    self.open_view(spec.label, &out.stdout, 0);
                } else {
                    self.notify(&out.first_error_line());
                }
            }
            Outcome::Mutate => {
                let result = run_op(&runner, spec.label, &args, spec.no_editor);
                self.hooks.fire(
                    POST_OPERATION,
                    &HookArgs::operation(&result.op, &result.args, result.exit),
                );
                if spec.category == Category::Commit && result.exit == 0 {
                    self.hooks.fire(COMMIT_FINISHED, &HookArgs::default());
                }
                self.message = Some(result.message);
                self.refresh_focused();
            }
            Outcome::MutateBackground => {
                let tx = self.events_tx.clone();
                spawn_op(&runner, spec.label, args, spec.no_editor, move |result| {
                    let _ = tx.send(AppEvent::OpFinished(result));
                });
                self.notify(&format!("{}…", spec.label));
            }
        }
    }

    // ── Process log pane ──

    pub fn toggle_process_log(&mut self) {
        self.show_process_log = !self.show_process_log;
    }

    /// Mirror the process log into its display buffer, around the read-only
    /// flag the way the runner contract prescribes.
    pub fn sync_process_log(&mut self) {
        let text = match self.process_log.lock() {
            Ok(log) => log.to_text(),
            Err(_) => return,
        };
        self.process_log_buffer.set_read_only(false);
        let _ = self.process_log_buffer.set_text(&text);
        self.process_log_buffer.set_read_only(true);
    }
}

/// `origin/main` → `["origin", "main"]`; a bare remote passes through
fn split_remote_ref(target: &str) -> Vec<String> {
    match target.split_once('/') {
        Some((remote, branch)) => vec![remote.to_string(), branch.to_string()],
        None => vec![target.to_string()],
    }
}
