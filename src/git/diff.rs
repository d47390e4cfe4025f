/// A diff hunk: parsed `@@` header plus the raw content lines, each kept
/// verbatim with its `' '`/`'+'`/`'-'` prefix so patches can re-emit them.
#[derive(Debug, Clone, PartialEq)]
pub struct Hunk {
    pub header: String,
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub context: Option<String>,
    pub lines: Vec<String>,
}

/// One file's worth of a unified diff
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDiff {
    /// The raw `diff --git …` line
    pub header: String,
    /// New path; empty for deletions
    pub file: String,
    /// Old path; empty for additions
    pub old_file: String,
    pub binary: bool,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Path to show for this diff: the new path, or the old one for deletions
    pub fn display_path(&self) -> &str {
        if self.file.is_empty() {
            &self.old_file
        } else {
            &self.file
        }
    }
}

/// Parse `git diff` output into structured file diffs. Unknown lines are
/// skipped; a truncated final hunk is kept with the lines seen so far.
pub fn parse_diff(raw: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current_file: Option<FileDiff> = None;
    let mut current_hunk: Option<Hunk> = None;

    let flush_hunk = |file: &mut Option<FileDiff>, hunk: &mut Option<Hunk>| {
        if let (Some(file), Some(hunk)) = (file.as_mut(), hunk.take()) {
            file.hunks.push(hunk);
        }
    };

    for line in raw.lines() {
        if line.starts_with("diff --git ") {
            flush_hunk(&mut current_file, &mut current_hunk);
            if let Some(file) = current_file.take() {
                files.push(file);
            }

            let (old_file, file) = parse_git_header_paths(line);
            current_file = Some(FileDiff {
                header: line.to_string(),
                file,
                old_file,
                binary: false,
                hunks: Vec::new(),
            });
            continue;
        }

        let in_file = current_file.is_some();
        if in_file && current_hunk.is_none() {
            if let Some(rest) = line.strip_prefix("--- ") {
                if let Some(file) = current_file.as_mut() {
                    file.old_file = strip_side_prefix(rest, "a/");
                }
                continue;
            }
            if let Some(rest) = line.strip_prefix("+++ ") {
                if let Some(file) = current_file.as_mut() {
                    file.file = strip_side_prefix(rest, "b/");
                }
                continue;
            }
            if line.starts_with("Binary files ") {
                if let Some(file) = current_file.as_mut() {
                    file.binary = true;
                }
                continue;
            }
            // Metadata lines carry no information the model keeps
            if line.starts_with("index ")
                || line.starts_with("new file mode")
                || line.starts_with("deleted file mode")
                || line.starts_with("old mode")
                || line.starts_with("new mode")
                || line.starts_with("similarity index")
                || line.starts_with("rename from")
                || line.starts_with("rename to")
                || line.starts_with("copy from")
                || line.starts_with("copy to")
            {
                continue;
            }
        }

        if line.starts_with("@@") {
            flush_hunk(&mut current_file, &mut current_hunk);
            current_hunk = parse_hunk_header(line);
            continue;
        }

        if let Some(ref mut hunk) = current_hunk {
            if line.starts_with(' ')
                || line.starts_with('+')
                || line.starts_with('-')
                || line.starts_with('\\')
            {
                hunk.lines.push(line.to_string());
            } else if line.is_empty() {
                // Some producers emit bare empty lines for empty context
                hunk.lines.push(" ".to_string());
            }
        }
    }

    flush_hunk(&mut current_file, &mut current_hunk);
    if let Some(file) = current_file {
        files.push(file);
    }

    files
}

/// Best-effort old/new paths from `diff --git a/<old> b/<new>`; refined by
/// the `---`/`+++` lines when present (binary diffs have neither).
fn parse_git_header_paths(line: &str) -> (String, String) {
    let rest = line.strip_prefix("diff --git ").unwrap_or(line);
    match rest.split_once(" b/") {
        Some((left, right)) => {
            let old = left.strip_prefix("a/").unwrap_or(left);
            (old.to_string(), right.to_string())
        }
        None => (String::new(), String::new()),
    }
}

/// Strip the `a/` or `b/` side prefix; `/dev/null` means the side is absent.
fn strip_side_prefix(path: &str, prefix: &str) -> String {
    if path == "/dev/null" {
        return String::new();
    }
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

/// Parse `"@@ -a[,b] +c[,d] @@[ context]"`, defaulting missing counts to 1
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let after = line.strip_prefix("@@ ")?;
    let end = after.find(" @@")?;
    let range_str = &after[..end];
    let context = after[end + 3..].trim();

    let mut parts = range_str.split_whitespace();
    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;

    Some(Hunk {
        header: line.to_string(),
        old_start,
        old_count,
        new_start,
        new_count,
        context: if context.is_empty() {
            None
        } else {
            Some(context.to_string())
        },
        lines: Vec::new(),
    })
}

/// Parse "start,count" or just "start" (count defaults to 1)
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
