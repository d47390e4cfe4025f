//! Operations at point: stage, unstage, discard, and visit dispatch on the
//! section under the cursor. Hunk and region operations are carried out by
//! feeding engine-built patches to `git apply` on stdin.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::info;

use crate::git::{FileDiff, GitOutput, GitRunner, Hunk};
use crate::patch::{hunk_patch, region_patch};
use crate::section::{SectionData, SectionId, SectionKind, StatusKey};
use crate::status::StatusBuffer;

/// Header template for the dedicated commit view
pub const COMMIT_VIEW_FORMAT: &str =
    "--format=commit %H%nAuthor: %an <%ae>%nDate:   %ad%n%n    %s%n";

/// What `Enter` on the current section should open
#[derive(Debug, Clone, PartialEq)]
pub enum VisitTarget {
    /// Working copy, 1-based line
    File { path: PathBuf, line: usize },
    /// Old content of `git show <ref_spec>`, positioned at a 1-based line
    OldContent {
        ref_spec: String,
        title: String,
        line: usize,
    },
    /// Dedicated diff view for one commit
    CommitDiff { hash: String },
    /// Diff view for a stash entry
    StashDiff { stash_ref: String },
}

fn ensure_ok(out: GitOutput) -> Result<()> {
    if out.ok() {
        Ok(())
    } else {
        bail!("{}", out.first_error_line());
    }
}

/// Closest enclosing File section (the section itself when it is a file)
fn enclosing_file(buf: &StatusBuffer, mut id: SectionId) -> Option<SectionId> {
    loop {
        if buf.tree.get(id).kind == SectionKind::File {
            return Some(id);
        }
        id = buf.tree.get(id).parent?;
    }
}

/// Selection mapped to hunk-line offsets; content starts one line past the
/// hunk header. `None` when no selection intersects the hunk content.
fn region_offsets(buf: &StatusBuffer, hunk_id: SectionId, hunk: &Hunk) -> Option<(usize, usize)> {
    let sel = buf.selection?;
    let (sel_start, sel_end) = sel.ordered();
    let node = buf.tree.get(hunk_id);
    let content_start = node.start_line + 1;
    let content_end = content_start + hunk.lines.len().saturating_sub(1);
    let start = sel_start.max(content_start);
    let end = sel_end.min(content_end);
    if start > end {
        return None;
    }
    Some((start - content_start, end - content_start))
}

enum Plan {
    AddPaths(Vec<String>),
    ApplyPatch {
        patch: String,
        args: Vec<&'static str>,
        label: String,
    },
    RestoreStaged(Vec<String>),
    CheckoutWorktree(Vec<String>),
    CheckoutHead(Vec<String>),
    DeleteFiles(Vec<String>),
    Nothing(&'static str),
}

fn hunk_payload(buf: &StatusBuffer, id: SectionId) -> Option<(Hunk, FileDiff)> {
    match &buf.tree.get(id).data {
        SectionData::Hunk { hunk, file_diff } => Some((hunk.clone(), file_diff.clone())),
        _ => None,
    }
}

fn file_status_key(buf: &StatusBuffer, id: SectionId) -> Option<StatusKey> {
    let file_id = enclosing_file(buf, id)?;
    match &buf.tree.get(file_id).data {
        SectionData::File { status_key, .. } => Some(*status_key),
        _ => None,
    }
}

fn child_paths(buf: &StatusBuffer, id: SectionId) -> Vec<String> {
    buf.tree
        .get(id)
        .children
        .iter()
        .filter_map(|&c| match &buf.tree.get(c).data {
            SectionData::File { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect()
}

// ── Stage ──

pub fn stage(buf: &mut StatusBuffer, runner: &GitRunner) -> Result<String> {
    let Some(id) = buf.section_at_cursor() else {
        bail!("Nothing to stage here");
    };
    let plan = match (&buf.tree.get(id).kind, &buf.tree.get(id).data) {
        (SectionKind::File, SectionData::File {
            path, status_key, ..
        }) => match status_key {
            StatusKey::Untracked | StatusKey::Unstaged => Plan::AddPaths(vec![path.clone()]),
            _ => Plan::Nothing("Already staged"),
        },
        (SectionKind::Hunk, _) => {
            let key = file_status_key(buf, id);
            if key != Some(StatusKey::Unstaged) {
                Plan::Nothing("Can only stage unstaged hunks")
            } else {
                let (hunk, file_diff) = hunk_payload(buf, id).expect("hunk payload");
                let patch = match region_offsets(buf, id, &hunk) {
                    Some((start, end)) => region_patch(&file_diff, &hunk, start, end, false),
                    None => hunk_patch(&file_diff, &hunk),
                };
                Plan::ApplyPatch {
                    patch,
                    args: vec!["apply", "--cached"],
                    label: format!("Staged hunk in {}", file_diff.display_path()),
                }
            }
        }
        (SectionKind::SectionHeader, SectionData::SectionHeader { status_key }) => {
            match status_key {
                StatusKey::Untracked | StatusKey::Unstaged => {
                    Plan::AddPaths(child_paths(buf, id))
                }
                _ => Plan::Nothing("Nothing to stage in this section"),
            }
        }
        _ => Plan::Nothing("Nothing to stage here"),
    };

    execute(buf, runner, plan)
}

// ── Unstage ──

pub fn unstage(buf: &mut StatusBuffer, runner: &GitRunner) -> Result<String> {
    let Some(id) = buf.section_at_cursor() else {
        bail!("Nothing to unstage here");
    };
    let plan = match (&buf.tree.get(id).kind, &buf.tree.get(id).data) {
        (SectionKind::File, SectionData::File {
            path, status_key, ..
        }) => match status_key {
            StatusKey::Staged => Plan::RestoreStaged(vec![path.clone()]),
            _ => Plan::Nothing("Not a staged file"),
        },
        (SectionKind::Hunk, _) => {
            if file_status_key(buf, id) != Some(StatusKey::Staged) {
                Plan::Nothing("Can only unstage staged hunks")
            } else {
                let (hunk, file_diff) = hunk_payload(buf, id).expect("hunk payload");
                let patch = match region_offsets(buf, id, &hunk) {
                    Some((start, end)) => region_patch(&file_diff, &hunk, start, end, true),
                    None => hunk_patch(&file_diff, &hunk),
                };
                Plan::ApplyPatch {
                    patch,
                    args: vec!["apply", "--cached", "--reverse"],
                    label: format!("Unstaged hunk in {}", file_diff.display_path()),
                }
            }
        }
        (SectionKind::SectionHeader, SectionData::SectionHeader { status_key }) => {
            match status_key {
                StatusKey::Staged => Plan::RestoreStaged(child_paths(buf, id)),
                _ => Plan::Nothing("Nothing staged in this section"),
            }
        }
        _ => Plan::Nothing("Nothing to unstage here"),
    };

    execute(buf, runner, plan)
}

// ── Discard ──

/// One-line description of what `x` would throw away, for the y/n prompt.
pub fn discard_description(buf: &StatusBuffer) -> Option<String> {
    let id = buf.section_at_cursor()?;
    match (&buf.tree.get(id).kind, &buf.tree.get(id).data) {
        (SectionKind::File, SectionData::File {
            path, status_key, ..
        }) => match status_key {
            StatusKey::Untracked => Some(format!("Delete {path}?")),
            StatusKey::Unstaged | StatusKey::Staged => Some(format!("Discard changes to {path}?")),
            _ => None,
        },
        (SectionKind::Hunk, _) => Some(match buf.selection {
            Some(_) => "Discard selected lines?".to_string(),
            None => "Discard this hunk?".to_string(),
        }),
        (SectionKind::SectionHeader, SectionData::SectionHeader { status_key }) => {
            match status_key {
                StatusKey::Untracked => Some("Delete all untracked files?".to_string()),
                StatusKey::Unstaged => Some("Discard all unstaged changes?".to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn discard(buf: &mut StatusBuffer, runner: &GitRunner) -> Result<String> {
    let Some(id) = buf.section_at_cursor() else {
        bail!("Nothing to discard here");
    };
    let plan = match (&buf.tree.get(id).kind, &buf.tree.get(id).data) {
        (SectionKind::File, SectionData::File {
            path, status_key, ..
        }) => match status_key {
            StatusKey::Untracked => Plan::DeleteFiles(vec![path.clone()]),
            StatusKey::Unstaged => Plan::CheckoutWorktree(vec![path.clone()]),
            StatusKey::Staged => Plan::CheckoutHead(vec![path.clone()]),
            _ => Plan::Nothing("Cannot discard this"),
        },
        (SectionKind::Hunk, _) => {
            if file_status_key(buf, id) != Some(StatusKey::Unstaged) {
                Plan::Nothing("Can only discard worktree hunks")
            } else {
                let (hunk, file_diff) = hunk_payload(buf, id).expect("hunk payload");
                let patch = match region_offsets(buf, id, &hunk) {
                    Some((start, end)) => region_patch(&file_diff, &hunk, start, end, true),
                    None => hunk_patch(&file_diff, &hunk),
                };
                Plan::ApplyPatch {
                    patch,
                    args: vec!["apply", "--reverse"],
                    label: format!("Discarded hunk in {}", file_diff.display_path()),
                }
            }
        }
        (SectionKind::SectionHeader, SectionData::SectionHeader { status_key }) => {
            match status_key {
                StatusKey::Untracked => Plan::DeleteFiles(child_paths(buf, id)),
                StatusKey::Unstaged => Plan::CheckoutWorktree(child_paths(buf, id)),
                _ => Plan::Nothing("Cannot discard this section"),
            }
        }
        _ => Plan::Nothing("Nothing to discard here"),
    };

    execute(buf, runner, plan)
}

// ── Plan execution ──

fn execute(buf: &mut StatusBuffer, runner: &GitRunner, plan: Plan) -> Result<String> {
    let message = match plan {
        Plan::AddPaths(paths) => {
            if paths.is_empty() {
                bail!("No files to stage");
            }
            for path in &paths {
                ensure_ok(runner.run(&["add", "--", path]))?;
            }
            info!(count = paths.len(), "staged paths");
            match paths.as_slice() {
                [one] => format!("Staged {one}"),
                many => format!("Staged {} files", many.len()),
            }
        }
        Plan::RestoreStaged(paths) => {
            if paths.is_empty() {
                bail!("No files to unstage");
            }
            for path in &paths {
                ensure_ok(runner.run(&["restore", "--staged", "--", path]))?;
            }
            match paths.as_slice() {
                [one] => format!("Unstaged {one}"),
                many => format!("Unstaged {} files", many.len()),
            }
        }
        Plan::CheckoutWorktree(paths) => {
            for path in &paths {
                ensure_ok(runner.run(&["checkout", "--", path]))?;
            }
            format!("Discarded changes to {} file(s)", paths.len())
        }
        Plan::CheckoutHead(paths) => {
            for path in &paths {
                ensure_ok(runner.run(&["checkout", "HEAD", "--", path]))?;
            }
            format!("Discarded staged changes to {} file(s)", paths.len())
        }
        Plan::DeleteFiles(paths) => {
            for path in &paths {
                let full = buf.git_root.join(path);
                std::fs::remove_file(&full)
                    .map_err(|e| anyhow::anyhow!("Cannot delete {path}: {e}"))?;
            }
            format!("Deleted {} file(s)", paths.len())
        }
        Plan::ApplyPatch { patch, args, label } => {
            ensure_ok(runner.run_with_input(&patch, &args))?;
            label
        }
        Plan::Nothing(reason) => bail!("{reason}"),
    };

    buf.clear_selection();
    Ok(message)
}

// ── Visit ──

/// Resolve what `Enter` at the cursor opens. Pure with respect to the
/// repository; the caller launches editors and view panes.
pub fn visit_target(buf: &StatusBuffer) -> Option<VisitTarget> {
    let id = buf.section_at_cursor()?;
    let node = buf.tree.get(id);
    match &node.data {
        SectionData::File { path, .. } => Some(VisitTarget::File {
            path: buf.git_root.join(path),
            line: 1,
        }),
        SectionData::Commit { commit } => Some(VisitTarget::CommitDiff {
            hash: commit.hash.clone(),
        }),
        SectionData::Stash { stash } => Some(VisitTarget::StashDiff {
            stash_ref: stash.stash_ref.clone(),
        }),
        SectionData::Hunk { hunk, file_diff } => {
            visit_hunk(buf, id, hunk, file_diff)
        }
        _ => None,
    }
}

fn visit_hunk(
    buf: &StatusBuffer,
    id: SectionId,
    hunk: &Hunk,
    file_diff: &FileDiff,
) -> Option<VisitTarget> {
    let node = buf.tree.get(id);
    let content_start = node.start_line + 1;

    if buf.cursor_line < content_start {
        // Hunk header line
        return Some(VisitTarget::File {
            path: buf.git_root.join(file_diff.display_path()),
            line: hunk.new_start.saturating_sub(1).max(1),
        });
    }

    let offset = buf.cursor_line - content_start;
    let line = hunk.lines.get(offset)?;

    if line.starts_with('-') {
        let staged = file_status_key(buf, id) == Some(StatusKey::Staged);
        let git_ref = if staged { "HEAD" } else { "" };
        let old_path = if file_diff.old_file.is_empty() {
            &file_diff.file
        } else {
            &file_diff.old_file
        };
        Some(VisitTarget::OldContent {
            ref_spec: format!("{git_ref}:{old_path}"),
            title: old_path.to_string(),
            line: old_side_line(hunk, offset),
        })
    } else {
        Some(VisitTarget::File {
            path: buf.git_root.join(file_diff.display_path()),
            line: new_side_line(hunk, offset),
        })
    }
}

/// Old-side line number of the hunk line at `offset` (1-based, walking the
/// `' '`/`'-'` lines before it)
fn old_side_line(hunk: &Hunk, offset: usize) -> usize {
    let before = hunk.lines[..offset]
        .iter()
        .filter(|l| !l.starts_with('+') && !l.starts_with('\\'))
        .count();
    hunk.old_start + before
}

/// New-side line number of the hunk line at `offset`
fn new_side_line(hunk: &Hunk, offset: usize) -> usize {
    let before = hunk.lines[..offset]
        .iter()
        .filter(|l| !l.starts_with('-') && !l.starts_with('\\'))
        .count();
    hunk.new_start + before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{new_process_log, parse_diff};
    use crate::status::{collect_snapshots, GitData, DEFAULT_DEBOUNCE};
    use std::path::Path;

    fn git(dir: &Path, args: &[&str]) -> String {
        let out = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("failed to run git");
        assert!(out.status.success(), "git {args:?} failed");
        String::from_utf8_lossy(&out.stdout).to_string()
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir, &["config", "user.email", "t@example.com"]);
        git(dir, &["config", "user.name", "T"]);
    }

    fn fresh_buffer(dir: &Path, runner: &GitRunner) -> StatusBuffer {
        let mut buf =
            StatusBuffer::new(dir.to_path_buf(), DEFAULT_DEBOUNCE, true, true);
        buf.install(collect_snapshots(runner, 10));
        buf
    }

    fn cursor_to(buf: &mut StatusBuffer, needle: &str) {
        let line = buf
            .buffer
            .text()
            .lines()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?}"));
        buf.cursor_line = line;
    }

    #[test]
    fn stage_untracked_file_then_unstage() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("seed.txt"), "seed\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("fresh.txt"), "fresh\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        cursor_to(&mut buf, "fresh.txt");
        let msg = stage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Staged fresh.txt");
        let staged = git(dir, &["diff", "--cached", "--name-only"]);
        assert!(staged.contains("fresh.txt"));

        buf.install(collect_snapshots(&runner, 10));
        cursor_to(&mut buf, "fresh.txt");
        let msg = unstage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Unstaged fresh.txt");
        let staged = git(dir, &["diff", "--cached", "--name-only"]);
        assert!(!staged.contains("fresh.txt"));
    }

    #[test]
    fn stage_hunk_via_patch_application() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("a.txt"), "one\ntwo\nthree\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("a.txt"), "one\nTWO\nthree\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        // expand the file, put the cursor inside the hunk
        cursor_to(&mut buf, "modified  a.txt");
        buf.toggle_at_cursor(&runner);
        cursor_to(&mut buf, "+TWO");
        let msg = stage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Staged hunk in a.txt");

        let staged = git(dir, &["diff", "--cached"]);
        assert!(staged.contains("+TWO"));
        // worktree and index now agree
        let unstaged = git(dir, &["diff"]);
        assert!(unstaged.is_empty());
    }

    #[test]
    fn region_stage_stages_only_selected_addition() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("a.txt"), "ctx1\nctx2\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("a.txt"), "ctx1\nadd1\nadd2\nctx2\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        cursor_to(&mut buf, "modified  a.txt");
        buf.toggle_at_cursor(&runner);
        cursor_to(&mut buf, "+add1");
        buf.extend_selection();
        let msg = stage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Staged hunk in a.txt");
        assert!(buf.selection.is_none());

        let staged = git(dir, &["diff", "--cached"]);
        assert!(staged.contains("+add1"));
        assert!(!staged.contains("+add2"));
        let unstaged = git(dir, &["diff"]);
        assert!(unstaged.contains("+add2"));
    }

    #[test]
    fn region_unstage_removes_only_selected_addition_from_index() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("a.txt"), "ctx1\nctx2\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("a.txt"), "ctx1\nadd1\nadd2\nctx2\n").unwrap();
        git(dir, &["add", "a.txt"]);

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        // the staged modification renders under Staged changes
        cursor_to(&mut buf, "modified  a.txt");
        buf.toggle_at_cursor(&runner);
        cursor_to(&mut buf, "+add1");
        buf.extend_selection();
        let msg = unstage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Unstaged hunk in a.txt");

        let staged = git(dir, &["diff", "--cached"]);
        assert!(!staged.contains("+add1"));
        assert!(staged.contains("+add2"));
    }

    #[test]
    fn discard_untracked_deletes_and_hunk_discard_reverts_worktree() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("a.txt"), "one\ntwo\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("junk.txt"), "junk\n").unwrap();
        std::fs::write(dir.join("a.txt"), "one\nTWO\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        cursor_to(&mut buf, "junk.txt");
        assert_eq!(
            discard_description(&buf).as_deref(),
            Some("Delete junk.txt?")
        );
        discard(&mut buf, &runner).unwrap();
        assert!(!dir.join("junk.txt").exists());

        buf.install(collect_snapshots(&runner, 10));
        cursor_to(&mut buf, "modified  a.txt");
        buf.toggle_at_cursor(&runner);
        cursor_to(&mut buf, "+TWO");
        discard(&mut buf, &runner).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("a.txt")).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn section_header_stage_adds_every_child() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("x.txt"), "x\n").unwrap();
        std::fs::write(dir.join("y.txt"), "y\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);
        cursor_to(&mut buf, "Untracked files (2)");
        let msg = stage(&mut buf, &runner).unwrap();
        assert_eq!(msg, "Staged 2 files");
        let staged = git(dir, &["diff", "--cached", "--name-only"]);
        assert!(staged.contains("x.txt") && staged.contains("y.txt"));
    }

    // ── Visit line arithmetic ──

    fn sample_hunk() -> Hunk {
        let files = parse_diff(
            "diff --git a/f.txt b/f.txt\n\
             --- a/f.txt\n\
             +++ b/f.txt\n\
             @@ -10,4 +20,4 @@\n \
             ctx0\n\
             -del0\n\
             +add0\n \
             ctx1\n",
        );
        files[0].hunks[0].clone()
    }

    #[test]
    fn old_and_new_side_line_walks() {
        let hunk = sample_hunk();
        // offsets: 0 " ctx0", 1 "-del0", 2 "+add0", 3 " ctx1"
        assert_eq!(old_side_line(&hunk, 0), 10);
        assert_eq!(old_side_line(&hunk, 1), 11);
        assert_eq!(new_side_line(&hunk, 0), 20);
        assert_eq!(new_side_line(&hunk, 2), 21);
        assert_eq!(new_side_line(&hunk, 3), 22);
    }

    #[test]
    fn visit_targets_by_cursor_position() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        std::fs::write(dir.join("a.txt"), "one\ntwo\n").unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "seed"]);
        std::fs::write(dir.join("a.txt"), "one\nTWO\n").unwrap();

        let runner = GitRunner::for_root(dir, new_process_log(5000));
        let mut buf = fresh_buffer(dir, &runner);

        // file row
        cursor_to(&mut buf, "modified  a.txt");
        assert_eq!(
            visit_target(&buf),
            Some(VisitTarget::File {
                path: dir.join("a.txt"),
                line: 1
            })
        );

        // removed line opens index content at the old-side line
        buf.toggle_at_cursor(&runner);
        cursor_to(&mut buf, "-two");
        match visit_target(&buf) {
            Some(VisitTarget::OldContent { ref_spec, line, .. }) => {
                assert_eq!(ref_spec, ":a.txt");
                assert_eq!(line, 2);
            }
            other => panic!("expected OldContent, got {other:?}"),
        }

        // added line opens the working copy at the new-side line
        cursor_to(&mut buf, "+TWO");
        match visit_target(&buf) {
            Some(VisitTarget::File { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected File, got {other:?}"),
        }

        // commit row opens the commit view
        cursor_to(&mut buf, "seed");
        match visit_target(&buf) {
            Some(VisitTarget::CommitDiff { hash }) => assert!(!hash.is_empty()),
            other => panic!("expected CommitDiff, got {other:?}"),
        }
    }
}
