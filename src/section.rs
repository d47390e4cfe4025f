//! Section model: the hierarchical tree behind the status buffer. Nodes live
//! in a per-tree arena indexed by position; `parent` is an index, never an
//! owning reference. The whole arena is rebuilt on every refresh.

use crate::buffer::Face;
use crate::git::{Commit, FileDiff, Hunk, Stash, StatusEntry};

pub type SectionId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    SectionHeader,
    File,
    Hunk,
    Commit,
    Stash,
}

/// Which top-level group a section header or file row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKey {
    Untracked,
    Unstaged,
    Staged,
    Unpushed,
    Unpulled,
    Log,
    Stash,
}

impl StatusKey {
    pub fn title(self) -> &'static str {
        match self {
            StatusKey::Untracked => "Untracked files",
            StatusKey::Unstaged => "Unstaged changes",
            StatusKey::Staged => "Staged changes",
            StatusKey::Unpushed => "Unpushed commits",
            StatusKey::Unpulled => "Unpulled commits",
            StatusKey::Log => "Recent commits",
            StatusKey::Stash => "Stashes",
        }
    }

    /// Stable key prefix for `expand_key` values
    pub fn key(self) -> &'static str {
        match self {
            StatusKey::Untracked => "untracked",
            StatusKey::Unstaged => "unstaged",
            StatusKey::Staged => "staged",
            StatusKey::Unpushed => "unpushed",
            StatusKey::Unpulled => "unpulled",
            StatusKey::Log => "log",
            StatusKey::Stash => "stash",
        }
    }
}

/// Identifies the expanded-diff state of a file uniquely between the Staged
/// and Unstaged sections.
pub fn expand_key(status_key: StatusKey, path: &str) -> String {
    format!("{}:{}", status_key.key(), path)
}

/// Kind-specific payload
#[derive(Debug, Clone)]
pub enum SectionData {
    Header,
    SectionHeader {
        status_key: StatusKey,
    },
    File {
        path: String,
        status_key: StatusKey,
        /// Absent for file rows inside an expanded commit diff
        entry: Option<StatusEntry>,
        file_diff: Option<FileDiff>,
    },
    Hunk {
        hunk: Hunk,
        file_diff: FileDiff,
    },
    Commit {
        commit: Commit,
    },
    Stash {
        stash: Stash,
    },
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub data: SectionData,
    /// 0-indexed inclusive span in the rendered buffer
    pub start_line: usize,
    pub end_line: usize,
    pub collapsed: bool,
    pub face: Face,
    pub children: Vec<SectionId>,
    pub parent: Option<SectionId>,
}

#[derive(Default)]
pub struct SectionTree {
    nodes: Vec<Section>,
    roots: Vec<SectionId>,
}

impl SectionTree {
    pub fn new() -> Self {
        SectionTree::default()
    }

    /// Insert a node under `parent` (or as a root) and wire both directions.
    pub fn add(&mut self, mut section: Section, parent: Option<SectionId>) -> SectionId {
        let id = self.nodes.len();
        section.parent = parent;
        section.children = Vec::new();
        self.nodes.push(section);
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn get(&self, id: SectionId) -> &Section {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.nodes[id]
    }

    pub fn roots(&self) -> &[SectionId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn contains(&self, id: SectionId, line: usize) -> bool {
        let node = &self.nodes[id];
        node.start_line <= line && line <= node.end_line
    }

    /// Deepest node whose span contains `line`, without descending into
    /// collapsed nodes (their contents are not addressable while hidden).
    pub fn section_at_line(&self, line: usize) -> Option<SectionId> {
        let mut current = *self.roots.iter().find(|&&r| self.contains(r, line))?;
        loop {
            if self.nodes[current].collapsed {
                return Some(current);
            }
            match self.nodes[current]
                .children
                .iter()
                .find(|&&c| self.contains(c, line))
            {
                Some(&child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Pre-order flatten omitting descendants of collapsed nodes
    pub fn visible_sections(&self) -> Vec<SectionId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<SectionId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = &self.nodes[id];
            if !node.collapsed {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Line ranges hidden by collapsed nodes, for display and cursor motion
    pub fn hidden_ranges(&self) -> Vec<(usize, usize)> {
        self.visible_sections()
            .into_iter()
            .filter_map(|id| {
                let node = &self.nodes[id];
                if node.collapsed
                    && !node.children.is_empty()
                    && node.end_line > node.start_line
                {
                    Some((node.start_line + 1, node.end_line))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn is_line_visible(&self, line: usize) -> bool {
        !self
            .hidden_ranges()
            .iter()
            .any(|&(start, end)| start <= line && line <= end)
    }

    // ── Navigation over the visible flatten ──

    pub fn next_section_line(&self, line: usize) -> Option<usize> {
        self.visible_sections()
            .into_iter()
            .map(|id| self.nodes[id].start_line)
            .find(|&start| start > line)
    }

    pub fn prev_section_line(&self, line: usize) -> Option<usize> {
        self.visible_sections()
            .into_iter()
            .map(|id| self.nodes[id].start_line)
            .filter(|&start| start < line)
            .last()
    }

    fn siblings_of(&self, id: SectionId) -> &[SectionId] {
        match self.nodes[id].parent {
            Some(p) => &self.nodes[p].children,
            None => &self.roots,
        }
    }

    pub fn next_sibling_line(&self, line: usize) -> Option<usize> {
        let id = self.section_at_line(line)?;
        self.siblings_of(id)
            .iter()
            .map(|&s| self.nodes[s].start_line)
            .find(|&start| start > line)
    }

    pub fn prev_sibling_line(&self, line: usize) -> Option<usize> {
        let id = self.section_at_line(line)?;
        self.siblings_of(id)
            .iter()
            .map(|&s| self.nodes[s].start_line)
            .filter(|&start| start < line)
            .last()
    }

    pub fn parent_section_line(&self, line: usize) -> Option<usize> {
        let id = self.section_at_line(line)?;
        let parent = self.nodes[id].parent?;
        Some(self.nodes[parent].start_line)
    }

    // ── Collapse state ──

    /// Flip `collapsed` on the node at `line` if it has children. Returns
    /// whether anything changed.
    pub fn toggle(&mut self, line: usize) -> bool {
        let Some(id) = self.section_at_line(line) else {
            return false;
        };
        if self.nodes[id].children.is_empty() {
            return false;
        }
        self.nodes[id].collapsed = !self.nodes[id].collapsed;
        true
    }

    /// Level 1 collapses all top-level headings; level 4 expands everything.
    /// A node at depth `d` (roots are depth 1) is collapsed iff `d >= level`.
    pub fn set_visibility_level(&mut self, level: usize) {
        let roots = self.roots.clone();
        for root in roots {
            self.apply_level(root, 1, level);
        }
    }

    fn apply_level(&mut self, id: SectionId, depth: usize, level: usize) {
        if !self.nodes[id].children.is_empty() {
            self.nodes[id].collapsed = depth >= level;
        }
        let children = self.nodes[id].children.clone();
        for child in children {
            self.apply_level(child, depth + 1, level);
        }
    }

    /// IDs of all nodes, for invariant checks
    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = SectionId> {
        0..self.nodes.len()
    }
}
