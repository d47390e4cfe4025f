//! Builds standalone patches from parsed diffs: whole hunks, arbitrary line
//! ranges within a hunk, and the reversed variants used to unstage and
//! discard. Patches are fed to `git apply` on stdin.

use crate::git::{FileDiff, Hunk};

/// `a/`–`b/` file header triplet. Sides that were normalized away during
/// parsing (additions/deletions) substitute the opposite-side path; git
/// accepts this where `/dev/null` bookkeeping would otherwise be needed.
fn file_header(diff: &FileDiff) -> String {
    let old = if diff.old_file.is_empty() {
        &diff.file
    } else {
        &diff.old_file
    };
    let new = if diff.file.is_empty() {
        &diff.old_file
    } else {
        &diff.file
    };
    format!("diff --git a/{old} b/{new}\n--- a/{old}\n+++ b/{new}\n")
}

/// Standalone patch containing one hunk, byte-for-byte as parsed.
pub fn hunk_patch(diff: &FileDiff, hunk: &Hunk) -> String {
    let mut patch = file_header(diff);
    patch.push_str(&hunk.header);
    patch.push('\n');
    for line in &hunk.lines {
        patch.push_str(line);
        patch.push('\n');
    }
    patch
}

/// Patch for a sub-range of a hunk's lines, 0-indexed inclusive offsets into
/// `hunk.lines`. Unselected additions are dropped; unselected deletions are
/// rewritten as context so the hunk still aligns on both sides.
///
/// With `reverse`, the keep/drop roles swap (unselected additions become
/// context, unselected deletions vanish): the result is the patch whose
/// `git apply --reverse` un-applies exactly the selected lines. The same
/// sense flag must be used consistently across stage, unstage and discard.
pub fn region_patch(
    diff: &FileDiff,
    hunk: &Hunk,
    start: usize,
    end: usize,
    reverse: bool,
) -> String {
    let mut old_count = 0usize;
    let mut new_count = 0usize;
    let mut lines: Vec<String> = Vec::with_capacity(hunk.lines.len());

    for (offset, line) in hunk.lines.iter().enumerate() {
        let selected = offset >= start && offset <= end;
        if let Some(rest) = line.strip_prefix('+') {
            if selected {
                lines.push(line.clone());
                new_count += 1;
            } else if reverse {
                lines.push(format!(" {rest}"));
                old_count += 1;
                new_count += 1;
            }
        } else if let Some(rest) = line.strip_prefix('-') {
            if selected {
                lines.push(line.clone());
                old_count += 1;
            } else if !reverse {
                lines.push(format!(" {rest}"));
                old_count += 1;
                new_count += 1;
            }
        } else if line.starts_with('\\') {
            lines.push(line.clone());
        } else {
            lines.push(line.clone());
            old_count += 1;
            new_count += 1;
        }
    }

    let mut patch = file_header(diff);
    patch.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        hunk.old_start, old_count, hunk.new_start, new_count
    ));
    for line in &lines {
        patch.push_str(line);
        patch.push('\n');
    }
    patch
}

/// Line-wise sense swap: leading `+` ↔ `-`. The `+++ `/`--- ` file markers
/// are left untouched.
pub fn reverse_patch(patch: &str) -> String {
    let mut out = String::with_capacity(patch.len());
    for line in patch.lines() {
        if line.starts_with("+++ ") || line.starts_with("--- ") {
            out.push_str(line);
        } else if let Some(rest) = line.strip_prefix('+') {
            out.push('-');
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix('-') {
            out.push('+');
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parse_diff;

    fn fixture() -> Vec<FileDiff> {
        let raw = "diff --git a/file.txt b/file.txt\n\
                   --- a/file.txt\n\
                   +++ b/file.txt\n\
                   @@ -10,2 +10,4 @@\n \
                   ctx\n\
                   +add1\n\
                   +add2\n \
                   ctx\n\
                   @@ -30,2 +31,2 @@\n\
                   -old\n\
                   +new\n \
                   tail\n";
        parse_diff(raw)
    }

    #[test]
    fn whole_hunk_patch_round_trips_through_parser() {
        let files = fixture();
        let diff = &files[0];
        let patch: String = diff
            .hunks
            .iter()
            .map(|h| hunk_patch(diff, h))
            .collect();

        let reparsed = parse_diff(&patch);
        assert_eq!(reparsed.len(), 2); // one file header per hunk
        let hunks: Vec<_> = reparsed.iter().flat_map(|f| f.hunks.clone()).collect();
        assert_eq!(hunks.len(), diff.hunks.len());
        for (orig, back) in diff.hunks.iter().zip(&hunks) {
            assert_eq!(orig.old_start, back.old_start);
            assert_eq!(orig.old_count, back.old_count);
            assert_eq!(orig.new_start, back.new_start);
            assert_eq!(orig.new_count, back.new_count);
            assert_eq!(orig.lines, back.lines);
        }
    }

    #[test]
    fn region_over_full_range_equals_whole_hunk() {
        let files = fixture();
        let diff = &files[0];
        let hunk = &diff.hunks[0];
        let whole = hunk_patch(diff, hunk);
        let region = region_patch(diff, hunk, 0, hunk.lines.len() - 1, false);
        assert_eq!(whole, region);
    }

    #[test]
    fn region_keeps_selected_addition_and_contextualizes_nothing() {
        // Stage only "+add1"; the unselected "+add2" must vanish entirely
        let files = fixture();
        let diff = &files[0];
        let hunk = &diff.hunks[0];
        let patch = region_patch(diff, hunk, 1, 1, false);

        assert!(patch.contains("@@ -10,2 +10,3 @@\n"));
        assert!(patch.contains("+add1\n"));
        assert!(!patch.contains("+add2"));
        assert!(!patch.contains(" add2"));
    }

    #[test]
    fn region_converts_unselected_deletion_to_context() {
        let files = fixture();
        let diff = &files[0];
        let hunk = &diff.hunks[1]; // [-old, +new, " tail"]
        let patch = region_patch(diff, hunk, 1, 1, false);

        // "-old" outside the range reappears on both sides as " old"
        assert!(patch.contains("@@ -30,3 +31,3 @@\n"));
        assert!(patch.contains(" old\n"));
        assert!(patch.contains("+new\n"));
    }

    #[test]
    fn region_counts_match_selection_arithmetic() {
        let files = fixture();
        let diff = &files[0];
        let hunk = &diff.hunks[0]; // [" ctx", "+add1", "+add2", " ctx"]
        let patch = region_patch(diff, hunk, 1, 1, false);
        // context 2, selected '+' 1, unselected '-' 0
        assert!(patch.contains("@@ -10,2 +10,3 @@"));

        let patch = region_patch(diff, hunk, 0, 0, false);
        // nothing selected among +/- lines: both counts are pure context
        assert!(patch.contains("@@ -10,2 +10,2 @@"));
    }

    #[test]
    fn reverse_region_swaps_keep_and_drop_roles() {
        // hunk 1: [" ctx", "+add1", "+add2", " ctx"]; un-apply only "+add1"
        let files = fixture();
        let diff = &files[0];
        let hunk = &diff.hunks[0];
        let patch = region_patch(diff, hunk, 1, 1, true);

        // unselected "+add2" must survive as context on both sides
        assert!(patch.contains("@@ -10,3 +10,4 @@\n"));
        assert!(patch.contains("+add1\n"));
        assert!(patch.contains(" add2\n"));
    }

    #[test]
    fn reverse_swaps_senses_but_not_file_markers() {
        let patch = "diff --git a/f b/f\n\
                     --- a/f\n\
                     +++ b/f\n\
                     @@ -1,2 +1,3 @@\n \
                     ctx\n\
                     +new\n \
                     ctx\n";
        let reversed = reverse_patch(patch);
        assert!(reversed.contains("--- a/f\n"));
        assert!(reversed.contains("+++ b/f\n"));
        assert!(reversed.contains("-new\n"));
        assert!(!reversed.contains("+new\n"));
    }

    #[test]
    fn reverse_is_an_involution() {
        let files = fixture();
        let diff = &files[0];
        let patch = hunk_patch(diff, &diff.hunks[1]);
        assert_eq!(reverse_patch(&reverse_patch(&patch)), patch);
    }

    #[test]
    fn deletion_only_file_substitutes_opposite_path() {
        let raw = "diff --git a/gone.rs b/gone.rs\n\
                   deleted file mode 100644\n\
                   --- a/gone.rs\n\
                   +++ /dev/null\n\
                   @@ -1 +0,0 @@\n\
                   -fn gone() {}\n";
        let files = parse_diff(raw);
        let patch = hunk_patch(&files[0], &files[0].hunks[0]);
        // never /dev/null: the old path stands in on the new side
        assert!(patch.starts_with("diff --git a/gone.rs b/gone.rs\n"));
        assert!(patch.contains("+++ b/gone.rs\n"));
    }
}
