mod assemble;
mod refresh;
mod render;

pub use assemble::{collect_snapshots, GitData};
pub use refresh::{RefreshScheduler, DEFAULT_DEBOUNCE};
pub use render::{render_status, RenderedStatus, ViewState};

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::{OverlayTag, TextBuffer};
use crate::git::{parse_diff, FileDiff, GitRunner};
use crate::section::{expand_key, SectionData, SectionId, SectionTree, StatusKey};

/// Stateful per-buffer line selection for region (sub-hunk) operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSelection {
    pub anchor_line: usize,
    pub end_line: usize,
}

impl LineSelection {
    /// Endpoints in ascending order
    pub fn ordered(&self) -> (usize, usize) {
        if self.anchor_line <= self.end_line {
            (self.anchor_line, self.end_line)
        } else {
            (self.end_line, self.anchor_line)
        }
    }
}

/// One status buffer per git root, holding the rendered text, the section
/// tree, and all view state that survives a refresh.
pub struct StatusBuffer {
    pub git_root: PathBuf,
    pub buffer: TextBuffer,
    pub tree: SectionTree,
    pub expanded_files: HashSet<String>,
    pub expanded_commits: HashSet<String>,
    /// Commit hash → parsed diff, populated on first expansion, never
    /// evicted for the buffer's lifetime
    pub commit_diffs: HashMap<String, Vec<FileDiff>>,
    pub collapsed_sections: HashSet<StatusKey>,
    /// Last full snapshot; lets view toggles re-render without re-fetching
    pub git_data: Option<GitData>,
    pub saved_cursor: usize,
    pub cursor_line: usize,
    pub selection: Option<LineSelection>,
    pub scheduler: RefreshScheduler,
    pub show_recent: bool,
    pub show_stashes: bool,
}

impl StatusBuffer {
    pub fn new(git_root: PathBuf, debounce: Duration, show_recent: bool, show_stashes: bool) -> Self {
        StatusBuffer {
            git_root,
            buffer: TextBuffer::new(),
            tree: SectionTree::new(),
            expanded_files: HashSet::new(),
            expanded_commits: HashSet::new(),
            commit_diffs: HashMap::new(),
            collapsed_sections: HashSet::new(),
            git_data: None,
            saved_cursor: 0,
            cursor_line: 0,
            selection: None,
            scheduler: RefreshScheduler::new(debounce),
            show_recent,
            show_stashes,
        }
    }

    fn view(&self) -> ViewState<'_> {
        ViewState {
            expanded_files: &self.expanded_files,
            expanded_commits: &self.expanded_commits,
            commit_diffs: &self.commit_diffs,
            collapsed_sections: &self.collapsed_sections,
            show_recent: self.show_recent,
            show_stashes: self.show_stashes,
        }
    }

    /// Install a fresh snapshot and render it.
    pub fn install(&mut self, data: GitData) {
        self.git_data = Some(data);
        self.rerender();
    }

    /// Re-render from the persisted snapshot (view-state-only changes skip
    /// the concurrent fetch entirely).
    pub fn rerender(&mut self) {
        let Some(ref data) = self.git_data else {
            return;
        };
        let rendered = render_status(data, &self.view());

        self.saved_cursor = self.buffer.line_to_byte(self.cursor_line);

        self.buffer.set_read_only(false);
        self.buffer.clear_overlays_by_tag(OverlayTag::GitFace);
        self.buffer.clear_overlays_by_tag(OverlayTag::GitDiff);
        let _ = self.buffer.set_text(&rendered.text);
        for overlay in rendered.overlays {
            self.buffer.add_overlay(overlay);
        }
        self.buffer.set_read_only(true);
        self.tree = rendered.tree;

        let restored = self.buffer.clamp_offset(self.saved_cursor);
        self.cursor_line = self.buffer.byte_to_line(restored);
        self.snap_cursor_visible();
    }

    /// Move the cursor off hidden lines, preferring the enclosing heading.
    pub fn snap_cursor_visible(&mut self) {
        if self.tree.is_line_visible(self.cursor_line) {
            return;
        }
        if let Some(id) = self.tree.section_at_line(self.cursor_line) {
            self.cursor_line = self.tree.get(id).start_line;
        } else {
            self.cursor_line = 0;
        }
    }

    pub fn section_at_cursor(&self) -> Option<SectionId> {
        self.tree.section_at_line(self.cursor_line)
    }

    /// TAB on the section at the cursor: collapse headers, expand file or
    /// commit inline diffs. Commit diffs are fetched on first expansion via
    /// `git show --format= <hash>` and cached.
    pub fn toggle_at_cursor(&mut self, runner: &GitRunner) {
        let Some(id) = self.section_at_cursor() else {
            return;
        };
        enum Action {
            CollapseHeader(StatusKey),
            ToggleFile(String),
            ToggleCommit(String),
            None,
        }
        let action = match &self.tree.get(id).data {
            SectionData::SectionHeader { status_key } => Action::CollapseHeader(*status_key),
            SectionData::File {
                path,
                status_key,
                file_diff,
                ..
            } => {
                if file_diff.is_some() {
                    Action::ToggleFile(expand_key(*status_key, path))
                } else {
                    Action::None
                }
            }
            SectionData::Commit { commit } => Action::ToggleCommit(commit.hash.clone()),
            SectionData::Hunk { .. } | SectionData::Stash { .. } | SectionData::Header => {
                Action::None
            }
        };

        match action {
            Action::CollapseHeader(key) => {
                if self.tree.toggle(self.cursor_line) {
                    if self.collapsed_sections.contains(&key) {
                        self.collapsed_sections.remove(&key);
                    } else {
                        self.collapsed_sections.insert(key);
                    }
                }
            }
            Action::ToggleFile(key) => {
                if !self.expanded_files.remove(&key) {
                    self.expanded_files.insert(key);
                }
                self.rerender();
            }
            Action::ToggleCommit(hash) => {
                if self.expanded_commits.remove(&hash) {
                    self.rerender();
                    return;
                }
                if !self.commit_diffs.contains_key(&hash) {
                    let out = runner.run(&["show", "--format=", &hash]);
                    let diffs = if out.ok() {
                        parse_diff(&out.stdout)
                    } else {
                        Vec::new()
                    };
                    self.commit_diffs.insert(hash.clone(), diffs);
                }
                self.expanded_commits.insert(hash);
                self.rerender();
            }
            Action::None => {}
        }
    }

    /// Apply a visibility level (1..=4) across the whole tree. Level changes
    /// touch only collapse flags; `expanded_files` is left as the user set it.
    pub fn set_visibility_level(&mut self, level: usize) {
        self.tree.set_visibility_level(level.clamp(1, 4));
        self.collapsed_sections = self
            .tree
            .roots()
            .iter()
            .filter_map(|&id| {
                let node = self.tree.get(id);
                match node.data {
                    SectionData::SectionHeader { status_key } if node.collapsed => Some(status_key),
                    _ => None,
                }
            })
            .collect();
        self.snap_cursor_visible();
    }

    // ── Line selection ──

    /// Anchor a selection at the cursor, or extend an existing one to it.
    pub fn extend_selection(&mut self) {
        match self.selection {
            Some(ref mut sel) => sel.end_line = self.cursor_line,
            None => {
                self.selection = Some(LineSelection {
                    anchor_line: self.cursor_line,
                    end_line: self.cursor_line,
                })
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn tree_is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{new_process_log, parse_status};
    use crate::section::SectionKind;

    fn buffer_with_data() -> StatusBuffer {
        let mut buf = StatusBuffer::new(PathBuf::from("/tmp/x"), DEFAULT_DEBOUNCE, true, true);
        let status = parse_status(
            "# branch.oid a1b2c3d\n\
             # branch.head main\n\
             1 .M N... 100644 100644 100644 aaa bbb one.txt\n\
             ? fresh.txt\n",
        );
        buf.install(GitData {
            status,
            unstaged_diff: crate::git::parse_diff(
                "diff --git a/one.txt b/one.txt\n\
                 --- a/one.txt\n\
                 +++ b/one.txt\n\
                 @@ -1 +1 @@\n\
                 -a\n\
                 +b\n",
            ),
            ..GitData::default()
        });
        buf
    }

    #[test]
    fn install_renders_and_marks_read_only() {
        let buf = buffer_with_data();
        assert!(buf.buffer.read_only());
        assert!(buf.buffer.text().starts_with("Head: main (a1b2c3d)\n"));
        assert!(!buf.tree_is_empty());
    }

    #[test]
    fn toggle_file_expands_and_collapses_inline_diff() {
        let mut buf = buffer_with_data();
        let runner = GitRunner::new(None, new_process_log(100));
        let file_line = buf
            .buffer
            .text()
            .lines()
            .position(|l| l.ends_with("one.txt") && l.contains("modified"))
            .unwrap();
        buf.cursor_line = file_line;

        buf.toggle_at_cursor(&runner);
        assert!(buf.buffer.text().contains("    @@ -1 +1 @@"));
        assert_eq!(buf.expanded_files.len(), 1);

        buf.toggle_at_cursor(&runner);
        assert!(!buf.buffer.text().contains("    @@"));
        assert!(buf.expanded_files.is_empty());
    }

    #[test]
    fn cursor_survives_rerender_clamped() {
        let mut buf = buffer_with_data();
        buf.cursor_line = buf.buffer.line_count() - 1;
        let keep = buf.cursor_line;
        buf.rerender();
        assert_eq!(buf.cursor_line, keep);
    }

    #[test]
    fn collapsing_header_snaps_cursor_out_of_hidden_range() {
        let mut buf = buffer_with_data();
        let runner = GitRunner::new(None, new_process_log(100));
        let header_line = buf
            .buffer
            .text()
            .lines()
            .position(|l| l.starts_with("Unstaged changes"))
            .unwrap();

        buf.cursor_line = header_line;
        buf.toggle_at_cursor(&runner);
        assert!(buf.collapsed_sections.contains(&StatusKey::Unstaged));
        assert!(!buf.tree.is_line_visible(header_line + 1));

        // collapsed state survives a re-render from the same data
        buf.rerender();
        let id = buf.tree.section_at_line(header_line).unwrap();
        assert!(buf.tree.get(id).collapsed);
        assert_eq!(buf.tree.get(id).kind, SectionKind::SectionHeader);
    }

    #[test]
    fn selection_anchors_then_extends() {
        let mut buf = buffer_with_data();
        buf.cursor_line = 3;
        buf.extend_selection();
        assert_eq!(
            buf.selection,
            Some(LineSelection {
                anchor_line: 3,
                end_line: 3
            })
        );
        buf.cursor_line = 1;
        buf.extend_selection();
        assert_eq!(buf.selection.unwrap().ordered(), (1, 3));
        buf.clear_selection();
        assert!(buf.selection.is_none());
    }

    #[test]
    fn visibility_level_one_collapses_roots_and_records_keys() {
        let mut buf = buffer_with_data();
        buf.set_visibility_level(1);
        assert!(buf.collapsed_sections.contains(&StatusKey::Unstaged));
        assert!(buf.collapsed_sections.contains(&StatusKey::Untracked));
        buf.set_visibility_level(4);
        assert!(buf.collapsed_sections.is_empty());
    }
}
