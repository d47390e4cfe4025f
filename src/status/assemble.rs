//! Snapshot collection: fans the status/diff/log/stash commands out on
//! worker threads and gathers the results on one channel. Rendering never
//! starts until every expected result has arrived; a failing command leaves
//! its slot empty rather than failing the refresh.

use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::git::{
    self, parse_diff, parse_log, parse_stash_list, parse_status, Commit, FileDiff, GitRunner,
    Stash, StatusSnapshot, LOG_FORMAT,
};

/// Everything one refresh learned about the repository
#[derive(Debug, Clone, Default)]
pub struct GitData {
    pub status: StatusSnapshot,
    pub unstaged_diff: Vec<FileDiff>,
    pub staged_diff: Vec<FileDiff>,
    pub recent: Vec<Commit>,
    pub stashes: Vec<Stash>,
    pub unpushed: Vec<Commit>,
    pub unpulled: Vec<Commit>,
    pub upstream: Option<String>,
    pub in_progress: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotKind {
    Status,
    UnstagedDiff,
    StagedDiff,
    Log,
    StashList,
    Unpushed,
    Unpulled,
}

/// Run all snapshot commands concurrently and parse the results.
pub fn collect_snapshots(runner: &GitRunner, log_max_count: usize) -> GitData {
    let upstream = git::upstream_ref(runner, None);
    let in_progress = git::in_progress_op(runner);

    let (tx, rx) = mpsc::channel::<(SnapshotKind, git::GitOutput)>();
    let format_arg = format!("--format={LOG_FORMAT}");
    let max_arg = format!("-{log_max_count}");

    let mut expected = 0usize;
    let mut spawn = |kind: SnapshotKind, args: Vec<String>| {
        let tx = tx.clone();
        let runner = runner.clone();
        expected += 1;
        thread::spawn(move || {
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let out = runner.run(&arg_refs);
            let _ = tx.send((kind, out));
        });
    };

    let s = |v: &[&str]| v.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    spawn(
        SnapshotKind::Status,
        s(&["status", "--porcelain=v2", "--branch"]),
    );
    spawn(SnapshotKind::UnstagedDiff, s(&["diff"]));
    spawn(SnapshotKind::StagedDiff, s(&["diff", "--cached"]));
    spawn(
        SnapshotKind::Log,
        vec!["log".into(), format_arg.clone(), max_arg.clone()],
    );
    spawn(SnapshotKind::StashList, s(&["stash", "list"]));
    if let Some(ref up) = upstream {
        spawn(
            SnapshotKind::Unpushed,
            vec![
                "log".into(),
                format_arg.clone(),
                max_arg.clone(),
                format!("{up}..HEAD"),
            ],
        );
        spawn(
            SnapshotKind::Unpulled,
            vec![
                "log".into(),
                format_arg.clone(),
                max_arg.clone(),
                format!("HEAD..{up}"),
            ],
        );
    }
    drop(tx);

    let mut data = GitData {
        upstream,
        in_progress,
        ..GitData::default()
    };

    // Counted drain: exactly `expected` completions, in whatever order the
    // children finish.
    for _ in 0..expected {
        let (kind, out) = match rx.recv() {
            Ok(pair) => pair,
            Err(_) => break,
        };
        if !out.ok() {
            debug!(?kind, exit = out.exit, "snapshot degraded to empty");
            continue;
        }
        match kind {
            SnapshotKind::Status => data.status = parse_status(&out.stdout),
            SnapshotKind::UnstagedDiff => data.unstaged_diff = parse_diff(&out.stdout),
            SnapshotKind::StagedDiff => data.staged_diff = parse_diff(&out.stdout),
            SnapshotKind::Log => data.recent = parse_log(&out.stdout),
            SnapshotKind::StashList => data.stashes = parse_stash_list(&out.stdout),
            SnapshotKind::Unpushed => data.unpushed = parse_log(&out.stdout),
            SnapshotKind::Unpulled => data.unpulled = parse_log(&out.stdout),
        }
    }

    data
}
