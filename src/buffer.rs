//! Minimal byte-oriented text buffer with face overlays: the host-editor
//! surface the status and process-log panes render into.

use anyhow::{bail, Result};

/// Abstract face keys; `ui::styles` maps them to terminal styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Heading,
    SectionHeading,
    FileRow,
    UntrackedRow,
    HunkHeader,
    DiffAdd,
    DiffRemove,
    DiffContext,
    CommitRow,
    StashRow,
    LogCommand,
}

/// Overlay groups, cleared wholesale before a re-render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTag {
    /// Non-diff status faces
    GitFace,
    /// Diff line faces
    GitDiff,
}

/// A face span over `[start, end)` bytes
#[derive(Debug, Clone)]
pub struct Overlay {
    pub start: usize,
    pub end: usize,
    pub face: Face,
    pub tag: OverlayTag,
    pub priority: i32,
}

#[derive(Default)]
pub struct TextBuffer {
    text: String,
    /// Byte offset of each line start; always at least one entry
    line_starts: Vec<usize>,
    overlays: Vec<Overlay>,
    read_only: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        let mut buf = TextBuffer::default();
        buf.reindex();
        buf
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Replace the whole buffer text
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        if self.read_only {
            bail!("buffer is read-only");
        }
        self.text = text.to_string();
        self.reindex();
        Ok(())
    }

    /// Byte-oriented splice; the basis for insert and delete
    #[allow(dead_code)]
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) -> Result<()> {
        if self.read_only {
            bail!("buffer is read-only");
        }
        if start > end || end > self.text.len() {
            bail!("replace range {start}..{end} out of bounds");
        }
        self.text.replace_range(start..end, replacement);
        self.reindex();
        Ok(())
    }

    fn reindex(&mut self) {
        self.line_starts.clear();
        self.line_starts.push(0);
        for (i, b) in self.text.bytes().enumerate() {
            if b == b'\n' && i + 1 < self.text.len() {
                self.line_starts.push(i + 1);
            }
        }
    }

    /// Byte offset of the start of `line` (clamped to the last line)
    pub fn line_to_byte(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        self.line_starts[line]
    }

    /// Byte offset just past the content of `line`, excluding the newline
    pub fn line_end_byte(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len() - 1);
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        }
    }

    pub fn byte_to_line(&self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        self.line_starts.partition_point(|&s| s <= byte) - 1
    }

    pub fn line_text(&self, line: usize) -> &str {
        &self.text[self.line_to_byte(line)..self.line_end_byte(line)]
    }

    #[allow(dead_code)]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.text.len());
        let start = start.min(end);
        &self.text[start..end]
    }

    /// Clamp a saved cursor offset into the buffer, per the render contract
    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.text.len().saturating_sub(1))
    }

    // ── Overlays ──

    pub fn add_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    pub fn clear_overlays_by_tag(&mut self, tag: OverlayTag) {
        self.overlays.retain(|o| o.tag != tag);
    }

    #[allow(dead_code)]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Highest-priority face covering the start of `line`, if any
    pub fn face_at_line(&self, line: usize) -> Option<Face> {
        let byte = self.line_to_byte(line);
        self.overlays
            .iter()
            .filter(|o| o.start <= byte && byte < o.end)
            .max_by_key(|o| o.priority)
            .map(|o| o.face)
    }
}
