/// Log format fed to `git log --format=`: NUL-delimited fields so subjects
/// containing any printable character parse unambiguously.
pub const LOG_FORMAT: &str = "%h%x00%s%x00%ar%x00%an%x00%D";

/// Field list for `git branch --all --format=`
pub const BRANCH_FORMAT: &str = "%(refname:short)%00%(objectname:short)%00%(HEAD)";

/// One commit from the NUL-delimited log output
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
    pub date: String,
    #[allow(dead_code)]
    pub author: String,
    /// Decorations (`%D`); absent when the commit carries none
    pub refs: Option<String>,
}

/// Parse `git log --format=<LOG_FORMAT>` output, one commit per line.
pub fn parse_log(output: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    for line in output.lines() {
        let parts: Vec<&str> = line.split('\0').collect();
        if parts.len() < 4 {
            continue;
        }
        let refs = parts.get(4).filter(|r| !r.is_empty());
        commits.push(Commit {
            hash: parts[0].to_string(),
            subject: parts[1].to_string(),
            date: parts[2].to_string(),
            author: parts[3].to_string(),
            refs: refs.map(|r| r.to_string()),
        });
    }
    commits
}

/// One entry of `git stash list`
#[derive(Debug, Clone, PartialEq)]
pub struct Stash {
    pub stash_ref: String,
    pub message: String,
}

/// Parse `git stash list` output; each line is `<ref>: <message>`.
pub fn parse_stash_list(output: &str) -> Vec<Stash> {
    output
        .lines()
        .filter_map(|line| {
            let (stash_ref, message) = line.split_once(": ")?;
            Some(Stash {
                stash_ref: stash_ref.to_string(),
                message: message.to_string(),
            })
        })
        .collect()
}

/// One entry of `git branch --all --format=<BRANCH_FORMAT>`
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: String,
    #[allow(dead_code)]
    pub oid: String,
    pub current: bool,
    pub remote: bool,
}

impl Branch {
    /// Name without the `remotes/` prefix, for pickers
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("remotes/").unwrap_or(&self.name)
    }
}

/// Parse branch-list output: three NUL-delimited fields per line.
pub fn parse_branch_list(output: &str) -> Vec<Branch> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\0').collect();
            if parts.len() < 3 || parts[0].is_empty() {
                return None;
            }
            Some(Branch {
                name: parts[0].to_string(),
                oid: parts[1].to_string(),
                current: parts[2] == "*",
                remote: parts[0].starts_with("remotes/"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_with_and_without_refs() {
        let output = "abc1234\0Fix parser\02 hours ago\0Alice\0HEAD -> main, origin/main\n\
                      def5678\0Add tests\03 days ago\0Bob\0\n";
        let commits = parse_log(output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc1234");
        assert_eq!(commits[0].subject, "Fix parser");
        assert_eq!(commits[0].date, "2 hours ago");
        assert_eq!(commits[0].author, "Alice");
        assert_eq!(commits[0].refs.as_deref(), Some("HEAD -> main, origin/main"));
        assert!(commits[1].refs.is_none());
    }

    #[test]
    fn parse_log_skips_short_lines() {
        let commits = parse_log("not a log line\n\nabc\0subject only\n");
        assert!(commits.is_empty());
    }

    #[test]
    fn parse_log_subject_may_contain_separator_lookalikes() {
        let output = "abc1234\0fix(auth): handle 401: retry\01 hour ago\0Carol\0\n";
        let commits = parse_log(output);
        assert_eq!(commits[0].subject, "fix(auth): handle 401: retry");
    }

    #[test]
    fn parse_stash_entries() {
        let output = "stash@{0}: WIP on main: abc1234 subject\n\
                      stash@{1}: On feature: saved: with colon\n";
        let stashes = parse_stash_list(output);
        assert_eq!(stashes.len(), 2);
        assert_eq!(stashes[0].stash_ref, "stash@{0}");
        assert_eq!(stashes[0].message, "WIP on main: abc1234 subject");
        assert_eq!(stashes[1].message, "On feature: saved: with colon");
    }

    #[test]
    fn parse_branches_marks_current_and_remote() {
        let output = "main\0abc1234\0*\n\
                      feature/x\0def5678\0 \n\
                      remotes/origin/main\0abc1234\0 \n";
        let branches = parse_branch_list(output);
        assert_eq!(branches.len(), 3);
        assert!(branches[0].current);
        assert!(!branches[0].remote);
        assert!(!branches[1].current);
        assert!(branches[2].remote);
        assert_eq!(branches[2].short_name(), "origin/main");
    }
}
