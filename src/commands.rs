//! Declarative command/flag matrix. Each transient menu is a set of infix
//! switches and suffix commands; the app marshals the enabled switches plus
//! a positional source into one git invocation. Adding a command means
//! adding a table row, not writing a wrapper.

use std::collections::{HashMap, HashSet};
use std::thread;

use crate::git::{GitOutput, GitRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Commit,
    Push,
    Pull,
    Fetch,
    Stash,
    Merge,
    Rebase,
    CherryPick,
    Reset,
    Tag,
    Log,
    Diff,
    Branch,
}

/// An infix switch: `key` toggles `arg` into the command line. Switches with
/// `takes_value` prompt for a value; a trailing `=` glues the value on.
#[derive(Debug, Clone, Copy)]
pub struct Switch {
    pub key: char,
    pub arg: &'static str,
    pub desc: &'static str,
    pub takes_value: bool,
}

const fn flag(key: char, arg: &'static str, desc: &'static str) -> Switch {
    Switch {
        key,
        arg,
        desc,
        takes_value: false,
    }
}

const fn opt(key: char, arg: &'static str, desc: &'static str) -> Switch {
    Switch {
        key,
        arg,
        desc,
        takes_value: true,
    }
}

/// Where a suffix command's positional arguments come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positional {
    None,
    /// Commit message prompt → `-m <msg>`
    CommitMessage,
    /// Resolved push-remote / upstream, else a remote prompt
    PushTarget,
    /// Upstream remote, else a remote prompt
    UpstreamRemote,
    /// Full upstream tracking ref (rebase target), else a rev prompt
    UpstreamRef,
    /// Free-form `<remote> <branch>` prompt
    RemoteBranch,
    /// Branch picker over the branch-list snapshot
    BranchPick,
    /// Revision prompt
    Rev,
    /// Optional stash message prompt → `-m <msg>` when non-empty
    OptionalMessage,
    /// Stash at point, else `stash@{0}`
    StashAtPoint,
    /// Tag name prompt, then optional annotation message
    TagName,
    /// Tag picker over `git tag` output
    TagPick,
    /// File path prompt
    FilePath,
    /// Revision or range prompt
    RevOrRange,
}

/// How the result is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Mutates the repository; refresh afterwards
    Mutate,
    /// Long-running mutation: background thread + post-operation refresh
    MutateBackground,
    /// Read-only; show stdout in a view pane
    View,
}

/// One suffix row of the matrix
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub category: Category,
    pub key: char,
    pub label: &'static str,
    pub subcommand: &'static [&'static str],
    pub positional: Positional,
    pub outcome: Outcome,
    /// Supply `GIT_EDITOR=:` because the command could go interactive
    pub no_editor: bool,
}

const fn cmd(
    category: Category,
    key: char,
    label: &'static str,
    subcommand: &'static [&'static str],
    positional: Positional,
    outcome: Outcome,
) -> CommandSpec {
    CommandSpec {
        category,
        key,
        label,
        subcommand,
        positional,
        outcome,
        no_editor: false,
    }
}

const fn cmd_no_editor(
    category: Category,
    key: char,
    label: &'static str,
    subcommand: &'static [&'static str],
    positional: Positional,
    outcome: Outcome,
) -> CommandSpec {
    CommandSpec {
        category,
        key,
        label,
        subcommand,
        positional,
        outcome,
        no_editor: true,
    }
}

pub struct Transient {
    pub title: &'static str,
    pub category: Category,
    pub switches: &'static [Switch],
    pub suffixes: &'static [CommandSpec],
}

use Category::*;
use Outcome::*;

pub static TRANSIENTS: &[Transient] = &[
    Transient {
        title: "Commit",
        category: Commit,
        switches: &[
            flag('a', "--all", "stage all modified"),
            flag('e', "--allow-empty", "allow empty"),
            flag('n', "--no-verify", "skip hooks"),
            flag('s', "--signoff", "signoff"),
            flag('R', "--reset-author", "reset author"),
            flag('v', "--verbose", "verbose"),
        ],
        suffixes: &[
            cmd(Commit, 'c', "commit", &["commit"], Positional::CommitMessage, Mutate),
            cmd_no_editor(
                Commit,
                'A',
                "amend",
                &["commit", "--amend", "--no-edit"],
                Positional::None,
                Mutate,
            ),
            cmd(
                Commit,
                'w',
                "reword",
                &["commit", "--amend"],
                Positional::CommitMessage,
                Mutate,
            ),
        ],
    },
    Transient {
        title: "Push",
        category: Push,
        switches: &[
            flag('f', "--force-with-lease", "force with lease"),
            flag('F', "--force", "force"),
            flag('n', "--no-verify", "skip hooks"),
            flag('u', "--set-upstream", "set upstream"),
            flag('h', "--dry-run", "dry run"),
        ],
        suffixes: &[
            cmd(Push, 'p', "push", &["push"], Positional::PushTarget, MutateBackground),
            cmd(Push, 'e', "push elsewhere", &["push"], Positional::RemoteBranch, MutateBackground),
        ],
    },
    Transient {
        title: "Pull",
        category: Pull,
        switches: &[
            flag('f', "--ff-only", "fast-forward only"),
            flag('r', "--rebase", "rebase"),
            flag('A', "--autostash", "autostash"),
            flag('n', "--no-ff", "no fast-forward"),
            flag('N', "--no-rebase", "no rebase"),
        ],
        suffixes: &[
            cmd_no_editor(Pull, 'p', "pull", &["pull"], Positional::UpstreamRemote, MutateBackground),
            cmd_no_editor(
                Pull,
                'e',
                "pull elsewhere",
                &["pull"],
                Positional::RemoteBranch,
                MutateBackground,
            ),
        ],
    },
    Transient {
        title: "Fetch",
        category: Fetch,
        switches: &[
            flag('p', "--prune", "prune"),
            flag('t', "--tags", "tags"),
            flag('v', "--verbose", "verbose"),
        ],
        suffixes: &[
            cmd(Fetch, 'f', "fetch", &["fetch"], Positional::UpstreamRemote, MutateBackground),
            cmd(Fetch, 'a', "fetch all", &["fetch", "--all"], Positional::None, MutateBackground),
            cmd(Fetch, 'e', "fetch elsewhere", &["fetch"], Positional::RemoteBranch, MutateBackground),
        ],
    },
    Transient {
        title: "Stash",
        category: Stash,
        switches: &[
            flag('u', "--include-untracked", "include untracked"),
            flag('a', "--all", "all files"),
            flag('k', "--keep-index", "keep index"),
        ],
        suffixes: &[
            cmd(Stash, 'z', "stash", &["stash", "push"], Positional::OptionalMessage, Mutate),
            cmd(
                Stash,
                's',
                "stash staged",
                &["stash", "push", "--staged"],
                Positional::OptionalMessage,
                Mutate,
            ),
            cmd(Stash, 'p', "pop", &["stash", "pop"], Positional::StashAtPoint, MutateBackground),
            cmd(Stash, 'A', "apply", &["stash", "apply"], Positional::StashAtPoint, Mutate),
            cmd(Stash, 'x', "drop", &["stash", "drop"], Positional::StashAtPoint, Mutate),
            cmd(Stash, 'w', "show", &["stash", "show", "-p"], Positional::StashAtPoint, View),
        ],
    },
    Transient {
        title: "Merge",
        category: Merge,
        switches: &[
            flag('f', "--ff-only", "fast-forward only"),
            flag('n', "--no-ff", "no fast-forward"),
            flag('s', "--squash", "squash"),
            flag('c', "--no-commit", "no commit"),
        ],
        suffixes: &[
            cmd_no_editor(Merge, 'm', "merge", &["merge"], Positional::BranchPick, MutateBackground),
            cmd(Merge, 'a', "abort", &["merge", "--abort"], Positional::None, Mutate),
        ],
    },
    Transient {
        title: "Rebase",
        category: Rebase,
        switches: &[
            flag('A', "--autostash", "autostash"),
            flag('i', "--interactive", "interactive"),
            flag('a', "--autosquash", "autosquash"),
        ],
        suffixes: &[
            cmd_no_editor(Rebase, 'u', "onto upstream", &["rebase"], Positional::UpstreamRef, MutateBackground),
            cmd_no_editor(Rebase, 'b', "onto branch", &["rebase"], Positional::BranchPick, MutateBackground),
            cmd_no_editor(Rebase, 'e', "onto rev", &["rebase"], Positional::Rev, MutateBackground),
            cmd_no_editor(Rebase, 'c', "continue", &["rebase", "--continue"], Positional::None, MutateBackground),
            cmd_no_editor(Rebase, 's', "skip", &["rebase", "--skip"], Positional::None, MutateBackground),
            cmd(Rebase, 'x', "abort", &["rebase", "--abort"], Positional::None, Mutate),
        ],
    },
    Transient {
        title: "Cherry-pick",
        category: CherryPick,
        switches: &[
            flag('n', "--no-commit", "no commit"),
            flag('e', "--edit", "edit message"),
        ],
        suffixes: &[
            cmd_no_editor(CherryPick, 'A', "pick", &["cherry-pick"], Positional::Rev, MutateBackground),
            cmd_no_editor(
                CherryPick,
                'c',
                "continue",
                &["cherry-pick", "--continue"],
                Positional::None,
                MutateBackground,
            ),
            cmd(CherryPick, 'x', "abort", &["cherry-pick", "--abort"], Positional::None, Mutate),
        ],
    },
    Transient {
        title: "Reset",
        category: Reset,
        switches: &[],
        suffixes: &[
            cmd(Reset, 's', "soft", &["reset", "--soft"], Positional::Rev, Mutate),
            cmd(Reset, 'm', "mixed", &["reset", "--mixed"], Positional::Rev, Mutate),
            cmd(Reset, 'h', "hard", &["reset", "--hard"], Positional::Rev, Mutate),
        ],
    },
    Transient {
        title: "Tag",
        category: Tag,
        switches: &[],
        suffixes: &[
            cmd(Tag, 't', "create", &["tag"], Positional::TagName, Mutate),
            cmd(Tag, 'x', "delete", &["tag", "-d"], Positional::TagPick, Mutate),
            cmd(Tag, 'l', "list", &["tag", "--list"], Positional::None, View),
        ],
    },
    Transient {
        title: "Log",
        category: Log,
        switches: &[
            opt('N', "-n", "limit count"),
            flag('a', "--all", "all refs"),
            flag('d', "--decorate", "decorate"),
            flag('g', "--graph", "graph"),
            opt('A', "--author=", "author"),
            opt('S', "--since=", "since"),
            opt('G', "--grep=", "grep"),
        ],
        suffixes: &[
            cmd(Log, 'l', "log current", &["log", "--oneline"], Positional::None, View),
            cmd(Log, 'b', "log branch", &["log", "--oneline"], Positional::BranchPick, View),
            cmd(Log, 'f', "log file", &["log", "--oneline", "--follow", "--"], Positional::FilePath, View),
            cmd(Log, 'r', "reflog", &["reflog"], Positional::None, View),
        ],
    },
    Transient {
        title: "Diff",
        category: Diff,
        switches: &[
            flag('w', "-w", "ignore whitespace"),
            flag('s', "--stat", "stat"),
            flag('c', "--cached", "cached"),
        ],
        suffixes: &[cmd(Diff, 'd', "diff", &["diff"], Positional::RevOrRange, View)],
    },
    Transient {
        title: "Branch",
        category: Branch,
        switches: &[],
        suffixes: &[
            cmd(Branch, 'b', "checkout", &["checkout"], Positional::BranchPick, MutateBackground),
            cmd(Branch, 'c', "create", &["checkout", "-b"], Positional::Rev, MutateBackground),
        ],
    },
];

pub fn transient_for(category: Category) -> &'static Transient {
    TRANSIENTS
        .iter()
        .find(|t| t.category == category)
        .expect("every category has a transient")
}

/// Live flag state of one open transient
pub struct TransientState {
    pub category: Category,
    enabled: HashSet<char>,
    values: HashMap<char, String>,
}

impl TransientState {
    pub fn new(category: Category) -> Self {
        TransientState {
            category,
            enabled: HashSet::new(),
            values: HashMap::new(),
        }
    }

    pub fn is_enabled(&self, key: char) -> bool {
        self.enabled.contains(&key)
    }

    /// Toggle a plain switch off/on
    pub fn toggle(&mut self, key: char) {
        if !self.enabled.remove(&key) {
            self.enabled.insert(key);
        } else {
            self.values.remove(&key);
        }
    }

    /// Enable a value-bearing switch with its prompted value
    pub fn set_value(&mut self, key: char, value: String) {
        if value.is_empty() {
            self.enabled.remove(&key);
            self.values.remove(&key);
        } else {
            self.enabled.insert(key);
            self.values.insert(key, value);
        }
    }

    pub fn value(&self, key: char) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// The enabled switches as git arguments, in table order
    pub fn args(&self) -> Vec<String> {
        let transient = transient_for(self.category);
        let mut out = Vec::new();
        for switch in transient.switches {
            if !self.enabled.contains(&switch.key) {
                continue;
            }
            if switch.takes_value {
                let value = self.values.get(&switch.key).cloned().unwrap_or_default();
                if switch.arg.ends_with('=') {
                    out.push(format!("{}{}", switch.arg, value));
                } else {
                    out.push(switch.arg.to_string());
                    out.push(value);
                }
            } else {
                out.push(switch.arg.to_string());
            }
        }
        out
    }
}

/// Final argument vector: subcommand, then switches, then positionals.
pub fn build_args(spec: &CommandSpec, switches: &[String], positional: &[String]) -> Vec<String> {
    let mut args: Vec<String> = spec.subcommand.iter().map(|a| a.to_string()).collect();
    args.extend(switches.iter().cloned());
    args.extend(positional.iter().cloned());
    args
}

/// Completion record handed back to the event loop
#[derive(Debug, Clone)]
pub struct OpResult {
    pub op: String,
    pub args: Vec<String>,
    pub exit: i32,
    pub message: String,
}

impl OpResult {
    fn from_output(op: &str, args: &[String], out: &GitOutput) -> Self {
        let message = if out.ok() {
            format!("{op}: done")
        } else {
            format!("{op}: {}", out.first_error_line())
        };
        OpResult {
            op: op.to_string(),
            args: args.to_vec(),
            exit: out.exit,
            message,
        }
    }
}

/// Run a long-running mutation on a worker thread; `on_done` fires with the
/// result (the app schedules the post-operation refresh there).
pub fn spawn_op<F>(runner: &GitRunner, op: &str, args: Vec<String>, no_editor: bool, on_done: F)
where
    F: FnOnce(OpResult) + Send + 'static,
{
    let runner = runner.clone();
    let op = op.to_string();
    thread::spawn(move || {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let out = if no_editor {
            runner.run_no_editor(&arg_refs)
        } else {
            runner.run(&arg_refs)
        };
        on_done(OpResult::from_output(&op, &args, &out));
    });
}

/// Run a quick mutation inline and report the result.
pub fn run_op(runner: &GitRunner, op: &str, args: &[String], no_editor: bool) -> OpResult {
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = if no_editor {
        runner.run_no_editor(&arg_refs)
    } else {
        runner.run(&arg_refs)
    };
    OpResult::from_output(op, args, &out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_transient_has_unique_keys() {
        for transient in TRANSIENTS {
            // switch keys shadow suffix keys at dispatch, so all keys in a
            // menu share one namespace
            let mut seen = HashSet::new();
            for switch in transient.switches {
                assert!(
                    seen.insert(switch.key),
                    "duplicate switch {} in {}",
                    switch.key,
                    transient.title
                );
            }
            for suffix in transient.suffixes {
                assert!(
                    seen.insert(suffix.key),
                    "suffix {} shadowed in {}",
                    suffix.key,
                    transient.title
                );
                assert_eq!(suffix.category, transient.category);
            }
        }
    }

    #[test]
    fn matrix_matches_flag_table() {
        let push = transient_for(Category::Push);
        let args: Vec<&str> = push.switches.iter().map(|s| s.arg).collect();
        assert_eq!(
            args,
            vec!["--force-with-lease", "--force", "--no-verify", "--set-upstream", "--dry-run"]
        );

        let pull = transient_for(Category::Pull);
        assert!(pull.switches.iter().any(|s| s.key == 'r' && s.arg == "--rebase"));
        assert!(pull.suffixes.iter().all(|s| s.no_editor));

        let reset = transient_for(Category::Reset);
        assert!(reset.switches.is_empty());
        assert_eq!(reset.suffixes.len(), 3);
    }

    #[test]
    fn switch_state_toggles_and_orders_args() {
        let mut state = TransientState::new(Category::Push);
        state.toggle('u');
        state.toggle('f');
        // order follows the table, not toggle order
        assert_eq!(state.args(), vec!["--force-with-lease", "--set-upstream"]);
        state.toggle('f');
        assert_eq!(state.args(), vec!["--set-upstream"]);
    }

    #[test]
    fn value_switches_glue_or_separate() {
        let mut state = TransientState::new(Category::Log);
        state.set_value('N', "5".into());
        state.set_value('A', "alice".into());
        assert_eq!(state.args(), vec!["-n", "5", "--author=alice"]);
        state.set_value('A', String::new());
        assert_eq!(state.args(), vec!["-n", "5"]);
    }

    #[test]
    fn build_args_composes_subcommand_switches_positional() {
        let commit = transient_for(Category::Commit);
        let spec = commit.suffixes.iter().find(|s| s.key == 'c').unwrap();
        let args = build_args(
            spec,
            &["--signoff".to_string()],
            &["-m".to_string(), "msg".to_string()],
        );
        assert_eq!(args, vec!["commit", "--signoff", "-m", "msg"]);
    }

    #[test]
    fn rebase_continue_suppresses_editor() {
        let rebase = transient_for(Category::Rebase);
        let cont = rebase.suffixes.iter().find(|s| s.key == 'c').unwrap();
        assert!(cont.no_editor);
        assert_eq!(cont.subcommand, &["rebase", "--continue"]);
    }
}
