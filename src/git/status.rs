use std::path::PathBuf;
use std::sync::OnceLock;

use crate::git::process::GitRunner;

/// Raised by entry points when no repository can be found at or above the
/// starting directory.
#[derive(Debug, thiserror::Error)]
#[error("Not in a git repository: {0}")]
pub struct NotARepository(pub String);

// ── Porcelain v2 status ──

/// Branch header block of `git status --porcelain=v2 --branch`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchInfo {
    pub oid: String,
    pub head: String,
    pub upstream: Option<String>,
    pub ahead: usize,
    pub behind: usize,
}

/// One per-path record from the status output
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEntry {
    Changed {
        xy: String,
        path: String,
    },
    Renamed {
        xy: String,
        path: String,
        #[allow(dead_code)]
        orig_path: String,
    },
    Unmerged {
        xy: String,
        path: String,
    },
    Untracked {
        path: String,
    },
}

impl StatusEntry {
    pub fn path(&self) -> &str {
        match self {
            StatusEntry::Changed { path, .. }
            | StatusEntry::Renamed { path, .. }
            | StatusEntry::Unmerged { path, .. }
            | StatusEntry::Untracked { path } => path,
        }
    }

    pub fn xy(&self) -> &str {
        match self {
            StatusEntry::Changed { xy, .. }
            | StatusEntry::Renamed { xy, .. }
            | StatusEntry::Unmerged { xy, .. } => xy,
            StatusEntry::Untracked { .. } => "??",
        }
    }

    /// Index side of the xy code is set
    pub fn staged(&self) -> bool {
        match self {
            StatusEntry::Untracked { .. } | StatusEntry::Unmerged { .. } => false,
            _ => !self.xy().starts_with('.'),
        }
    }

    /// Worktree side of the xy code is set
    pub fn unstaged(&self) -> bool {
        match self {
            StatusEntry::Untracked { .. } => false,
            StatusEntry::Unmerged { .. } => true,
            _ => !self.xy().ends_with('.'),
        }
    }
}

/// Full parsed snapshot of `git status --porcelain=v2 --branch`
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub branch: BranchInfo,
    pub entries: Vec<StatusEntry>,
}

/// Parse porcelain-v2 output. Unknown lines and partial records are skipped;
/// this never fails.
pub fn parse_status(output: &str) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot::default();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("# branch.oid ") {
            snapshot.branch.oid = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("# branch.head ") {
            snapshot.branch.head = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("# branch.upstream ") {
            snapshot.branch.upstream = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("# branch.ab ") {
            // Format: "+<ahead> -<behind>"
            for part in rest.split_whitespace() {
                if let Some(n) = part.strip_prefix('+') {
                    snapshot.branch.ahead = n.parse().unwrap_or(0);
                } else if let Some(n) = part.strip_prefix('-') {
                    snapshot.branch.behind = n.parse().unwrap_or(0);
                }
            }
        } else if let Some(rest) = line.strip_prefix("1 ") {
            // 1 XY sub mH mI mW hH hI <path>
            let mut fields = rest.splitn(8, ' ');
            let xy = fields.next().unwrap_or("").to_string();
            let path = match fields.nth(6) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => continue,
            };
            snapshot.entries.push(StatusEntry::Changed { xy, path });
        } else if let Some(rest) = line.strip_prefix("2 ") {
            // 2 XY sub mH mI mW hH hI Xscore <path>\t<orig_path>
            let mut fields = rest.splitn(9, ' ');
            let xy = fields.next().unwrap_or("").to_string();
            let path_part = match fields.nth(7) {
                Some(p) => p,
                None => continue,
            };
            let (path, orig_path) = match path_part.split_once('\t') {
                Some((p, o)) => (p.to_string(), o.to_string()),
                None => continue,
            };
            snapshot.entries.push(StatusEntry::Renamed {
                xy,
                path,
                orig_path,
            });
        } else if let Some(rest) = line.strip_prefix("u ") {
            // u XY sub m1 m2 m3 mW h1 h2 h3 <path>
            let mut fields = rest.splitn(10, ' ');
            let xy = fields.next().unwrap_or("").to_string();
            let path = match fields.nth(8) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => continue,
            };
            snapshot.entries.push(StatusEntry::Unmerged { xy, path });
        } else if let Some(rest) = line.strip_prefix("? ") {
            snapshot.entries.push(StatusEntry::Untracked {
                path: rest.to_string(),
            });
        }
    }

    snapshot
}

// ── Repo info ──

static GIT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Whether `git` is on PATH; probed once per process.
pub fn git_available() -> bool {
    *GIT_AVAILABLE.get_or_init(|| {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

/// Repository root for the runner's working directory; `None` outside a repo.
pub fn repo_root(runner: &GitRunner) -> Option<PathBuf> {
    let out = runner.run(&["rev-parse", "--show-toplevel"]);
    if !out.ok() {
        return None;
    }
    out.stdout.lines().next().map(PathBuf::from)
}

/// Current branch short name; `None` in detached-HEAD state.
pub fn current_branch(runner: &GitRunner) -> Option<String> {
    let out = runner.run(&["symbolic-ref", "--short", "HEAD"]);
    if !out.ok() {
        return None;
    }
    let name = out.stdout.trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// `git config --get <key>`, treating empty values as absent
fn config_get(runner: &GitRunner, key: &str) -> Option<String> {
    let out = runner.run(&["config", "--get", key]);
    if !out.ok() {
        return None;
    }
    let value = out.stdout.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Upstream tracking ref `<remote>/<branch>` for the given branch (defaults
/// to the current one); `None` if either config key is missing.
pub fn upstream_ref(runner: &GitRunner, branch: Option<&str>) -> Option<String> {
    let branch = match branch {
        Some(b) => b.to_string(),
        None => current_branch(runner)?,
    };
    let remote = config_get(runner, &format!("branch.{branch}.remote"))?;
    let merge = config_get(runner, &format!("branch.{branch}.merge"))?;
    let short = merge.strip_prefix("refs/heads/").unwrap_or(&merge);
    Some(format!("{remote}/{short}"))
}

/// The ref `git push` with no arguments would push to, resolved via the
/// cascade `branch.<b>.pushRemote` → `remote.pushDefault` → `branch.<b>.remote`.
pub fn push_remote_ref(runner: &GitRunner, branch: Option<&str>) -> Option<String> {
    let branch = match branch {
        Some(b) => b.to_string(),
        None => current_branch(runner)?,
    };
    let remote = config_get(runner, &format!("branch.{branch}.pushRemote"))
        .or_else(|| config_get(runner, "remote.pushDefault"))
        .or_else(|| config_get(runner, &format!("branch.{branch}.remote")))?;
    Some(format!("{remote}/{branch}"))
}

/// Label for an in-progress merge or rebase, shown in the status header.
pub fn in_progress_op(runner: &GitRunner) -> Option<&'static str> {
    let out = runner.run(&["rev-parse", "--git-dir"]);
    if !out.ok() {
        return None;
    }
    let git_dir = PathBuf::from(out.stdout.trim());
    let git_dir = if git_dir.is_absolute() {
        git_dir
    } else {
        runner.git_root()?.join(git_dir)
    };

    if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
        Some("Rebasing")
    } else if git_dir.join("MERGE_HEAD").exists() {
        Some("Merging")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::process::new_process_log;
    use std::path::Path;

    #[test]
    fn parse_branch_headers_and_entries() {
        let output = "# branch.oid a1b2c3d\n\
                      # branch.head main\n\
                      # branch.upstream origin/main\n\
                      # branch.ab +2 -1\n\
                      1 M. N... 100644 100644 100644 aaa bbb file1.txt\n\
                      2 R. N... 100644 100644 100644 aaa bbb R100 new.txt\told.txt\n\
                      ? untracked.txt\n";
        let snap = parse_status(output);

        assert_eq!(snap.branch.oid, "a1b2c3d");
        assert_eq!(snap.branch.head, "main");
        assert_eq!(snap.branch.upstream.as_deref(), Some("origin/main"));
        assert_eq!(snap.branch.ahead, 2);
        assert_eq!(snap.branch.behind, 1);

        assert_eq!(snap.entries.len(), 3);
        match &snap.entries[0] {
            StatusEntry::Changed { xy, path } => {
                assert_eq!(xy, "M.");
                assert_eq!(path, "file1.txt");
            }
            other => panic!("expected Changed, got {other:?}"),
        }
        assert!(snap.entries[0].staged());
        assert!(!snap.entries[0].unstaged());

        match &snap.entries[1] {
            StatusEntry::Renamed {
                xy,
                path,
                orig_path,
            } => {
                assert_eq!(xy, "R.");
                assert_eq!(path, "new.txt");
                assert_eq!(orig_path, "old.txt");
            }
            other => panic!("expected Renamed, got {other:?}"),
        }

        assert_eq!(
            snap.entries[2],
            StatusEntry::Untracked {
                path: "untracked.txt".into()
            }
        );
    }

    #[test]
    fn parse_unmerged_entry() {
        let output = "u UU N... 100644 100644 100644 100644 aaa bbb ccc conflicted.rs\n";
        let snap = parse_status(output);
        assert_eq!(snap.entries.len(), 1);
        match &snap.entries[0] {
            StatusEntry::Unmerged { xy, path } => {
                assert_eq!(xy, "UU");
                assert_eq!(path, "conflicted.rs");
            }
            other => panic!("expected Unmerged, got {other:?}"),
        }
        assert!(snap.entries[0].unstaged());
    }

    #[test]
    fn parse_detached_head_has_no_upstream() {
        let output = "# branch.oid deadbeef\n# branch.head (detached)\n";
        let snap = parse_status(output);
        assert_eq!(snap.branch.head, "(detached)");
        assert!(snap.branch.upstream.is_none());
        assert_eq!(snap.branch.ahead, 0);
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let output = "1 M.\ngarbage\n? untracked\n";
        let snap = parse_status(output);
        assert_eq!(snap.entries.len(), 1);
        assert_eq!(snap.entries[0].path(), "untracked");
    }

    #[test]
    fn paths_with_spaces_survive_field_splitting() {
        let output = "1 .M N... 100644 100644 100644 aaa bbb my file.txt\n";
        let snap = parse_status(output);
        assert_eq!(snap.entries[0].path(), "my file.txt");
        assert!(!snap.entries[0].staged());
        assert!(snap.entries[0].unstaged());
    }

    // ── Repo info against a scripted repository ──

    fn git(dir: &Path, args: &[&str]) {
        let out = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("failed to run git");
        assert!(out.status.success(), "git {args:?} failed");
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir, &["config", "user.email", "test@example.com"]);
        git(dir, &["config", "user.name", "Test"]);
    }

    fn runner_for(dir: &Path) -> GitRunner {
        GitRunner::for_root(dir, new_process_log(1000))
    }

    #[test]
    fn repo_root_and_current_branch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap();
        init_repo(&dir);
        let runner = runner_for(&dir);

        let root = repo_root(&runner).expect("repo root");
        assert_eq!(root.canonicalize().unwrap(), dir);
        assert_eq!(current_branch(&runner).as_deref(), Some("main"));
    }

    #[test]
    fn repo_root_absent_outside_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = runner_for(tmp.path());
        assert!(repo_root(&runner).is_none());
    }

    #[test]
    fn push_remote_cascade_prefers_push_remote_then_push_default() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        init_repo(dir);
        let runner = runner_for(dir);

        git(dir, &["config", "branch.main.remote", "origin"]);
        git(dir, &["config", "branch.main.merge", "refs/heads/main"]);
        git(dir, &["config", "remote.pushDefault", "origin3"]);
        git(dir, &["config", "branch.main.pushRemote", "origin2"]);

        assert_eq!(
            push_remote_ref(&runner, Some("main")).as_deref(),
            Some("origin2/main")
        );

        git(dir, &["config", "--unset", "branch.main.pushRemote"]);
        assert_eq!(
            push_remote_ref(&runner, Some("main")).as_deref(),
            Some("origin3/main")
        );

        git(dir, &["config", "--unset", "remote.pushDefault"]);
        assert_eq!(
            push_remote_ref(&runner, Some("main")).as_deref(),
            Some("origin/main")
        );

        git(dir, &["config", "--unset", "branch.main.remote"]);
        assert_eq!(push_remote_ref(&runner, Some("main")), None);

        // upstream ref still needs both remote and merge keys
        assert_eq!(upstream_ref(&runner, Some("main")), None);
        git(dir, &["config", "branch.main.remote", "origin"]);
        assert_eq!(
            upstream_ref(&runner, Some("main")).as_deref(),
            Some("origin/main")
        );
    }
}
