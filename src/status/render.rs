//! Turns a [`GitData`] snapshot plus per-buffer view state into the status
//! buffer's text, face overlays, and section tree in a single pass.

use std::collections::{HashMap, HashSet};

use crate::buffer::{Face, Overlay, OverlayTag};
use crate::git::{Commit, FileDiff, StatusEntry};
use crate::section::{
    expand_key, Section, SectionData, SectionKind, SectionTree, StatusKey,
};
use crate::status::GitData;

/// View state consulted while rendering; owned by the status buffer
pub struct ViewState<'a> {
    pub expanded_files: &'a HashSet<String>,
    pub expanded_commits: &'a HashSet<String>,
    pub commit_diffs: &'a HashMap<String, Vec<FileDiff>>,
    pub collapsed_sections: &'a HashSet<StatusKey>,
    pub show_recent: bool,
    pub show_stashes: bool,
}

pub struct RenderedStatus {
    pub text: String,
    pub overlays: Vec<Overlay>,
    pub tree: SectionTree,
}

/// Text writer that tracks the current line number and records face spans
struct Writer {
    text: String,
    line: usize,
    overlays: Vec<Overlay>,
}

impl Writer {
    fn new() -> Self {
        Writer {
            text: String::new(),
            line: 0,
            overlays: Vec::new(),
        }
    }

    fn push_line(&mut self, content: &str, face: Option<(Face, OverlayTag)>) -> usize {
        let line_no = self.line;
        let start = self.text.len();
        self.text.push_str(content);
        if let Some((face, tag)) = face {
            self.overlays.push(Overlay {
                start,
                end: self.text.len(),
                face,
                tag,
                priority: if tag == OverlayTag::GitDiff { 1 } else { 0 },
            });
        }
        self.text.push('\n');
        self.line += 1;
        line_no
    }

    fn blank(&mut self) {
        self.push_line("", None);
    }
}

fn section(kind: SectionKind, data: SectionData, start: usize, face: Face) -> Section {
    Section {
        kind,
        data,
        start_line: start,
        end_line: start,
        collapsed: false,
        face,
        children: Vec::new(),
        parent: None,
    }
}

/// xy → human change type. The index character wins; otherwise the worktree
/// character; otherwise "changed".
fn change_type(xy: &str) -> &'static str {
    let mut chars = xy.chars();
    let index = chars.next().unwrap_or('.');
    let worktree = chars.next().unwrap_or('.');
    match index {
        'M' => "modified",
        'A' => "new file",
        'D' => "deleted",
        'R' => "renamed",
        'C' => "copied",
        _ => match worktree {
            'M' => "modified",
            'D' => "deleted",
            _ => "changed",
        },
    }
}

fn ab_summary(ahead: usize, behind: usize) -> String {
    match (ahead, behind) {
        (0, 0) => "up to date".to_string(),
        (a, 0) => format!("ahead {a}"),
        (0, b) => format!("behind {b}"),
        (a, b) => format!("ahead {a}, behind {b}"),
    }
}

fn diff_line_face(line: &str) -> Face {
    if line.starts_with('+') {
        Face::DiffAdd
    } else if line.starts_with('-') {
        Face::DiffRemove
    } else {
        Face::DiffContext
    }
}

pub fn render_status(data: &GitData, view: &ViewState) -> RenderedStatus {
    let mut w = Writer::new();
    let mut tree = SectionTree::new();

    // ── Header ──
    let header_id = tree.add(
        section(SectionKind::Header, SectionData::Header, 0, Face::Heading),
        None,
    );
    let head = if data.status.branch.head.is_empty() {
        "(detached)"
    } else {
        &data.status.branch.head
    };
    let oid_short: String = data.status.branch.oid.chars().take(7).collect();
    w.push_line(
        &format!("Head: {head} ({oid_short})"),
        Some((Face::Heading, OverlayTag::GitFace)),
    );
    if let Some(op) = data.in_progress {
        w.push_line(
            &format!("{op} in progress"),
            Some((Face::Heading, OverlayTag::GitFace)),
        );
    }
    if let Some(ref upstream) = data.upstream {
        let ab = ab_summary(data.status.branch.ahead, data.status.branch.behind);
        w.push_line(
            &format!("Upstream: {upstream} ({ab})"),
            Some((Face::Heading, OverlayTag::GitFace)),
        );
    }
    tree.get_mut(header_id).end_line = w.line - 1;

    // ── File groups ──
    for key in [StatusKey::Untracked, StatusKey::Unstaged, StatusKey::Staged] {
        let entries: Vec<&StatusEntry> = data
            .status
            .entries
            .iter()
            .filter(|e| match key {
                StatusKey::Untracked => matches!(e, StatusEntry::Untracked { .. }),
                StatusKey::Unstaged => e.unstaged(),
                StatusKey::Staged => e.staged(),
                _ => false,
            })
            .collect();
        if entries.is_empty() {
            continue;
        }

        w.blank();
        let sec_id = tree.add(
            section(
                SectionKind::SectionHeader,
                SectionData::SectionHeader { status_key: key },
                w.line,
                Face::SectionHeading,
            ),
            None,
        );
        w.push_line(
            &format!("{} ({})", key.title(), entries.len()),
            Some((Face::SectionHeading, OverlayTag::GitFace)),
        );

        for entry in entries {
            let path = entry.path().to_string();
            let (row, face) = match entry {
                StatusEntry::Untracked { .. } => (format!("  {path}"), Face::UntrackedRow),
                StatusEntry::Unmerged { .. } => {
                    (format!("  unmerged  {path}"), Face::FileRow)
                }
                _ => {
                    let xy = entry.xy();
                    let effective = match key {
                        StatusKey::Staged => xy.to_string(),
                        _ => format!(".{}", xy.chars().nth(1).unwrap_or('.')),
                    };
                    (
                        format!("  {}  {}", change_type(&effective), path),
                        Face::FileRow,
                    )
                }
            };

            let file_diff = match key {
                StatusKey::Unstaged => find_diff(&data.unstaged_diff, &path),
                StatusKey::Staged => find_diff(&data.staged_diff, &path),
                _ => None,
            };
            let file_id = tree.add(
                section(
                    SectionKind::File,
                    SectionData::File {
                        path: path.clone(),
                        status_key: key,
                        entry: Some(entry.clone()),
                        file_diff: file_diff.cloned(),
                    },
                    w.line,
                    face,
                ),
                Some(sec_id),
            );
            w.push_line(&row, Some((face, OverlayTag::GitFace)));

            if view.expanded_files.contains(&expand_key(key, &path)) {
                if let Some(diff) = file_diff {
                    render_hunks(&mut w, &mut tree, file_id, diff);
                }
            }
            tree.get_mut(file_id).end_line = w.line - 1;
        }
        tree.get_mut(sec_id).end_line = w.line - 1;
        if view.collapsed_sections.contains(&key) {
            tree.get_mut(sec_id).collapsed = true;
        }
    }

    // ── Commit groups ──
    let commit_groups: [(StatusKey, &[Commit]); 3] = [
        (StatusKey::Unpushed, &data.unpushed),
        (StatusKey::Unpulled, &data.unpulled),
        (StatusKey::Log, &data.recent),
    ];
    for (key, commits) in commit_groups {
        if commits.is_empty() || (key == StatusKey::Log && !view.show_recent) {
            continue;
        }
        w.blank();
        let sec_id = tree.add(
            section(
                SectionKind::SectionHeader,
                SectionData::SectionHeader { status_key: key },
                w.line,
                Face::SectionHeading,
            ),
            None,
        );
        w.push_line(
            &format!("{} ({})", key.title(), commits.len()),
            Some((Face::SectionHeading, OverlayTag::GitFace)),
        );

        for commit in commits {
            let mut row = format!("  {} {}  {}", commit.hash, commit.date, commit.subject);
            if let Some(ref refs) = commit.refs {
                row.push_str(&format!(" ({refs})"));
            }
            let commit_id = tree.add(
                section(
                    SectionKind::Commit,
                    SectionData::Commit {
                        commit: commit.clone(),
                    },
                    w.line,
                    Face::CommitRow,
                ),
                Some(sec_id),
            );
            w.push_line(&row, Some((Face::CommitRow, OverlayTag::GitFace)));

            if view.expanded_commits.contains(&commit.hash) {
                if let Some(diffs) = view.commit_diffs.get(&commit.hash) {
                    for diff in diffs {
                        let file_id = tree.add(
                            section(
                                SectionKind::File,
                                SectionData::File {
                                    path: diff.display_path().to_string(),
                                    status_key: key,
                                    entry: None,
                                    file_diff: Some(diff.clone()),
                                },
                                w.line,
                                Face::FileRow,
                            ),
                            Some(commit_id),
                        );
                        w.push_line(
                            &format!("    {}", diff.display_path()),
                            Some((Face::FileRow, OverlayTag::GitFace)),
                        );
                        render_hunks(&mut w, &mut tree, file_id, diff);
                        tree.get_mut(file_id).end_line = w.line - 1;
                    }
                }
            }
            tree.get_mut(commit_id).end_line = w.line - 1;
        }
        tree.get_mut(sec_id).end_line = w.line - 1;
        if view.collapsed_sections.contains(&key) {
            tree.get_mut(sec_id).collapsed = true;
        }
    }

    // ── Stashes ──
    if !data.stashes.is_empty() && view.show_stashes {
        w.blank();
        let sec_id = tree.add(
            section(
                SectionKind::SectionHeader,
                SectionData::SectionHeader {
                    status_key: StatusKey::Stash,
                },
                w.line,
                Face::SectionHeading,
            ),
            None,
        );
        w.push_line(
            &format!("{} ({})", StatusKey::Stash.title(), data.stashes.len()),
            Some((Face::SectionHeading, OverlayTag::GitFace)),
        );
        for stash in &data.stashes {
            let stash_id = tree.add(
                section(
                    SectionKind::Stash,
                    SectionData::Stash {
                        stash: stash.clone(),
                    },
                    w.line,
                    Face::StashRow,
                ),
                Some(sec_id),
            );
            w.push_line(
                &format!("  {}  {}", stash.stash_ref, stash.message),
                Some((Face::StashRow, OverlayTag::GitFace)),
            );
            tree.get_mut(stash_id).end_line = w.line - 1;
        }
        tree.get_mut(sec_id).end_line = w.line - 1;
        if view.collapsed_sections.contains(&StatusKey::Stash) {
            tree.get_mut(sec_id).collapsed = true;
        }
    }

    RenderedStatus {
        text: w.text,
        overlays: w.overlays,
        tree,
    }
}

/// Inline-diff render: hunk header and lines indented by four spaces, one
/// hunk child per hunk under the file node.
fn render_hunks(w: &mut Writer, tree: &mut SectionTree, file_id: usize, diff: &FileDiff) {
    for hunk in &diff.hunks {
        let hunk_id = tree.add(
            section(
                SectionKind::Hunk,
                SectionData::Hunk {
                    hunk: hunk.clone(),
                    file_diff: diff.clone(),
                },
                w.line,
                Face::HunkHeader,
            ),
            Some(file_id),
        );
        w.push_line(
            &format!("    {}", hunk.header),
            Some((Face::HunkHeader, OverlayTag::GitDiff)),
        );
        for line in &hunk.lines {
            w.push_line(
                &format!("    {line}"),
                Some((diff_line_face(line), OverlayTag::GitDiff)),
            );
        }
        tree.get_mut(hunk_id).end_line = w.line - 1;
    }
}

fn find_diff<'a>(diffs: &'a [FileDiff], path: &str) -> Option<&'a FileDiff> {
    diffs.iter().find(|d| d.display_path() == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{parse_diff, parse_log, parse_status};

    fn empty_view<'a>(
        expanded_files: &'a HashSet<String>,
        expanded_commits: &'a HashSet<String>,
        commit_diffs: &'a HashMap<String, Vec<FileDiff>>,
        collapsed: &'a HashSet<StatusKey>,
    ) -> ViewState<'a> {
        ViewState {
            expanded_files,
            expanded_commits,
            commit_diffs,
            collapsed_sections: collapsed,
            show_recent: true,
            show_stashes: true,
        }
    }

    fn base_data() -> GitData {
        let status = parse_status(
            "# branch.oid a1b2c3da8f00\n\
             # branch.head main\n\
             # branch.upstream origin/main\n\
             # branch.ab +0 -0\n\
             1 .M N... 100644 100644 100644 aaa bbb one.txt\n\
             1 .M N... 100644 100644 100644 aaa bbb two.txt\n\
             ? untracked.txt\n",
        );
        GitData {
            status,
            upstream: Some("origin/main".into()),
            ..GitData::default()
        }
    }

    #[test]
    fn renders_header_and_sections_in_order() {
        let (ef, ec, cd, cs) = Default::default();
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&base_data(), &view);
        let lines: Vec<&str> = rendered.text.lines().collect();

        assert_eq!(lines[0], "Head: main (a1b2c3d)");
        assert_eq!(lines[1], "Upstream: origin/main (up to date)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Untracked files (1)");
        assert_eq!(lines[4], "  untracked.txt");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Unstaged changes (2)");
        assert_eq!(lines[7], "  modified  one.txt");
        assert_eq!(lines[8], "  modified  two.txt");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn ahead_behind_summaries() {
        assert_eq!(ab_summary(0, 0), "up to date");
        assert_eq!(ab_summary(2, 0), "ahead 2");
        assert_eq!(ab_summary(0, 3), "behind 3");
        assert_eq!(ab_summary(2, 1), "ahead 2, behind 1");
    }

    #[test]
    fn change_type_prefers_index_then_worktree() {
        assert_eq!(change_type("M."), "modified");
        assert_eq!(change_type("A."), "new file");
        assert_eq!(change_type("R."), "renamed");
        assert_eq!(change_type(".M"), "modified");
        assert_eq!(change_type(".D"), "deleted");
        assert_eq!(change_type(".."), "changed");
    }

    #[test]
    fn staged_row_uses_index_char_and_unstaged_uses_worktree_char() {
        let mut data = base_data();
        data.status = parse_status(
            "# branch.oid a1b2c3d\n\
             # branch.head main\n\
             1 MM N... 100644 100644 100644 aaa bbb both.txt\n",
        );
        data.upstream = None;
        let (ef, ec, cd, cs) = Default::default();
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&data, &view);
        // the same path appears once under Unstaged and once under Staged
        let rows: Vec<&str> = rendered
            .text
            .lines()
            .filter(|l| l.contains("both.txt"))
            .collect();
        assert_eq!(rows, vec!["  modified  both.txt", "  modified  both.txt"]);
    }

    #[test]
    fn expanded_file_renders_indented_hunks_as_children() {
        let mut data = base_data();
        data.unstaged_diff = parse_diff(
            "diff --git a/one.txt b/one.txt\n\
             --- a/one.txt\n\
             +++ b/one.txt\n\
             @@ -1,2 +1,2 @@\n \
             ctx\n\
             -old\n\
             +new\n",
        );
        let mut ef = HashSet::new();
        ef.insert(expand_key(StatusKey::Unstaged, "one.txt"));
        let (ec, cd, cs) = Default::default();
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&data, &view);

        assert!(rendered.text.contains("    @@ -1,2 +1,2 @@\n"));
        assert!(rendered.text.contains("    -old\n"));
        assert!(rendered.text.contains("    +new\n"));

        // the file node for one.txt has one hunk child spanning its lines
        let file_line = rendered
            .text
            .lines()
            .position(|l| l == "  modified  one.txt")
            .unwrap();
        let file_sec = rendered.tree.section_at_line(file_line).unwrap();
        let file = rendered.tree.get(file_sec);
        assert_eq!(file.kind, SectionKind::File);
        assert_eq!(file.children.len(), 1);
        let hunk = rendered.tree.get(file.children[0]);
        assert_eq!(hunk.kind, SectionKind::Hunk);
        assert_eq!(hunk.start_line, file_line + 1);
        assert_eq!(hunk.end_line, file_line + 4);
        assert_eq!(file.end_line, hunk.end_line);
    }

    #[test]
    fn same_path_staged_and_unstaged_expands_independently() {
        let mut data = base_data();
        data.status = parse_status(
            "# branch.oid a1b2c3d\n\
             # branch.head main\n\
             1 MM N... 100644 100644 100644 aaa bbb both.txt\n",
        );
        data.upstream = None;
        data.unstaged_diff = parse_diff(
            "diff --git a/both.txt b/both.txt\n\
             --- a/both.txt\n\
             +++ b/both.txt\n\
             @@ -1 +1 @@\n\
             -w\n\
             +worktree\n",
        );
        data.staged_diff = parse_diff(
            "diff --git a/both.txt b/both.txt\n\
             --- a/both.txt\n\
             +++ b/both.txt\n\
             @@ -1 +1 @@\n\
             -i\n\
             +index\n",
        );
        let mut ef = HashSet::new();
        ef.insert(expand_key(StatusKey::Staged, "both.txt"));
        let (ec, cd, cs) = Default::default();
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&data, &view);

        // only the staged copy is expanded
        assert!(rendered.text.contains("+index"));
        assert!(!rendered.text.contains("+worktree"));
    }

    #[test]
    fn commit_rows_and_refs() {
        let mut data = base_data();
        data.recent = parse_log("abc1234\0Fix bug\02 days ago\0Ann\0HEAD -> main\n");
        let (ef, ec, cd, cs) = Default::default();
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&data, &view);
        assert!(rendered
            .text
            .contains("  abc1234 2 days ago  Fix bug (HEAD -> main)\n"));
        assert!(rendered.text.contains("Recent commits (1)\n"));
    }

    #[test]
    fn collapsed_section_keeps_full_span_but_hides_children_lines() {
        let data = base_data();
        let (ef, ec, cd) = Default::default();
        let mut cs = HashSet::new();
        cs.insert(StatusKey::Unstaged);
        let view = empty_view(&ef, &ec, &cd, &cs);
        let rendered = render_status(&data, &view);

        let unstaged_line = rendered
            .text
            .lines()
            .position(|l| l.starts_with("Unstaged changes"))
            .unwrap();
        let sec = rendered
            .tree
            .section_at_line(unstaged_line)
            .map(|id| rendered.tree.get(id))
            .unwrap();
        assert!(sec.collapsed);
        assert_eq!(sec.end_line, unstaged_line + 2);
        assert!(!rendered.tree.is_line_visible(unstaged_line + 1));
    }
}
