use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use std::io::Write;
use tracing::{debug, trace};

/// Result of one git invocation. `exit` is `-1` when the child could not be
/// spawned at all; in that case `stderr` holds the spawn error text.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub exit: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_seconds: f64,
}

impl GitOutput {
    pub fn ok(&self) -> bool {
        self.exit == 0
    }

    /// First line of stderr, for one-line user messages
    pub fn first_error_line(&self) -> String {
        self.stderr
            .lines()
            .next()
            .unwrap_or("git failed")
            .to_string()
    }
}

// ── Process log ──

/// Bounded ring of recent command records, rendered to the process-log pane.
/// Append-only from the runner; oldest lines are dropped past the cap.
pub struct ProcessLog {
    lines: Vec<String>,
    max_lines: usize,
}

impl ProcessLog {
    pub fn new(max_lines: usize) -> Self {
        ProcessLog {
            lines: Vec::new(),
            max_lines,
        }
    }

    /// Append one multi-line record followed by a blank separator line.
    pub fn append_record(&mut self, record: &str) {
        for line in record.lines() {
            self.lines.push(line.to_string());
        }
        self.lines.push(String::new());
        if self.lines.len() > self.max_lines {
            let excess = self.lines.len() - self.max_lines;
            self.lines.drain(..excess);
        }
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

pub type ProcessLogHandle = Arc<Mutex<ProcessLog>>;

pub fn new_process_log(max_lines: usize) -> ProcessLogHandle {
    Arc::new(Mutex::new(ProcessLog::new(max_lines)))
}

// ── Runner ──

/// Spawns `git`, captures stdout/stderr/exit/elapsed, and records every
/// invocation in the process log. Cloned freely across worker threads.
#[derive(Clone)]
pub struct GitRunner {
    git_root: Option<PathBuf>,
    log: ProcessLogHandle,
}

impl GitRunner {
    pub fn new(git_root: Option<PathBuf>, log: ProcessLogHandle) -> Self {
        GitRunner { git_root, log }
    }

    /// Runner bound to a repository root: every invocation gets `-C <root>`.
    pub fn for_root(root: &Path, log: ProcessLogHandle) -> Self {
        GitRunner {
            git_root: Some(root.to_path_buf()),
            log,
        }
    }

    pub fn git_root(&self) -> Option<&Path> {
        self.git_root.as_deref()
    }

    pub fn run(&self, args: &[&str]) -> GitOutput {
        self.invoke(args, None, false)
    }

    /// Pipe `input` to the child's stdin, then close it.
    pub fn run_with_input(&self, input: &str, args: &[&str]) -> GitOutput {
        self.invoke(args, Some(input), false)
    }

    /// For invocations that could try to open an interactive editor
    /// (rebase/merge continue paths): sets `GIT_EDITOR=:`.
    pub fn run_no_editor(&self, args: &[&str]) -> GitOutput {
        self.invoke(args, None, true)
    }

    fn invoke(&self, args: &[&str], input: Option<&str>, no_editor: bool) -> GitOutput {
        let started = Instant::now();
        trace!(args = ?args, stdin = input.is_some(), "git: start");

        let mut cmd = Command::new("git");
        if let Some(ref root) = self.git_root {
            cmd.arg("-C").arg(root);
        }
        cmd.args(args);
        if no_editor {
            cmd.env("GIT_EDITOR", ":");
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        if input.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return self.spawn_failure(args, input.is_some(), started, &err.to_string())
            }
        };
        if let (Some(text), Some(mut stdin)) = (input, child.stdin.take()) {
            // Failure to feed stdin surfaces as a non-zero exit below.
            let _ = stdin.write_all(text.as_bytes());
        }
        let out = match child.wait_with_output() {
            Ok(out) => out,
            Err(err) => {
                return self.spawn_failure(args, input.is_some(), started, &err.to_string())
            }
        };
        let output = GitOutput {
            exit: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };

        self.record(args, input.is_some(), &output);
        if !output.ok() {
            debug!(
                args = ?args,
                exit = output.exit,
                stderr = %output.stderr.trim(),
                "git: failure"
            );
        }
        output
    }

    fn spawn_failure(
        &self,
        args: &[&str],
        piped: bool,
        started: Instant,
        reason: &str,
    ) -> GitOutput {
        let elapsed = started.elapsed().as_secs_f64();
        let header = record_header(args, piped, elapsed, -1);
        let record = format!("{header}\nERROR: {reason}");
        if let Ok(mut log) = self.log.lock() {
            log.append_record(&record);
        }
        debug!(args = ?args, reason, "git: spawn failure");
        GitOutput {
            exit: -1,
            stdout: String::new(),
            stderr: reason.to_string(),
            elapsed_seconds: elapsed,
        }
    }

    fn record(&self, args: &[&str], piped: bool, output: &GitOutput) {
        let header = record_header(args, piped, output.elapsed_seconds, output.exit);
        let body = if output.ok() {
            &output.stdout
        } else {
            &output.stderr
        };
        let record = format!("{}\n{}", header, body.trim_end_matches('\n'));
        if let Ok(mut log) = self.log.lock() {
            log.append_record(&record);
        }
    }
}

fn record_header(args: &[&str], piped: bool, elapsed: f64, exit: i32) -> String {
    let tag = if exit == 0 {
        "ok".to_string()
    } else {
        format!("exit {exit}")
    };
    let stdin_marker = if piped { " <<stdin" } else { "" };
    format!(
        "$ git {}{}  [{:.2}s, {}]",
        args.join(" "),
        stdin_marker,
        elapsed,
        tag
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_caps_oldest_lines() {
        let mut log = ProcessLog::new(6);
        log.append_record("$ git status  [0.01s, ok]\none\ntwo");
        assert_eq!(log.len(), 4);
        log.append_record("$ git diff  [0.01s, ok]\nthree\nfour");
        // 8 lines total, capped to 6: the two oldest dropped
        assert_eq!(log.len(), 6);
        assert_eq!(log.lines()[0], "two");
        assert!(log.lines()[1].is_empty());
        assert_eq!(log.lines()[2], "$ git diff  [0.01s, ok]");
    }

    #[test]
    fn record_header_success_format() {
        let header = record_header(&["status", "--porcelain=v2"], false, 0.034, 0);
        assert_eq!(header, "$ git status --porcelain=v2  [0.03s, ok]");
    }

    #[test]
    fn record_header_failure_and_stdin_format() {
        let header = record_header(&["apply", "--cached"], true, 0.5, 1);
        assert_eq!(header, "$ git apply --cached <<stdin  [0.50s, exit 1]");
    }

    #[test]
    fn runner_captures_version_and_logs_once() {
        let log = new_process_log(100);
        let runner = GitRunner::new(None, Arc::clone(&log));
        let out = runner.run(&["--version"]);
        assert_eq!(out.exit, 0);
        assert!(out.stdout.starts_with("git version"));
        let log = log.lock().unwrap();
        assert_eq!(log.lines()[0], format!(
            "$ git --version  [{:.2}s, ok]",
            out.elapsed_seconds
        ));
    }

    #[test]
    fn runner_pipes_stdin() {
        let log = new_process_log(100);
        let runner = GitRunner::new(None, log);
        // hash-object -w would mutate; --stdin without -w only hashes
        let out = runner.run_with_input("hello\n", &["hash-object", "--stdin"]);
        assert_eq!(out.exit, 0);
        assert_eq!(out.stdout.trim().len(), 40);
    }

    #[test]
    fn nonzero_exit_records_stderr() {
        let log = new_process_log(100);
        let runner = GitRunner::new(None, Arc::clone(&log));
        let out = runner.run(&["rev-parse", "--verify", "no-such-ref-anywhere"]);
        assert_ne!(out.exit, 0);
        let log = log.lock().unwrap();
        let text = log.to_text();
        assert!(text.contains("exit"));
    }
}
