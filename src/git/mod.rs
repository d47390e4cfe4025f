mod diff;
mod log;
mod process;
mod status;

pub use diff::{parse_diff, FileDiff, Hunk};
pub use log::{
    parse_branch_list, parse_log, parse_stash_list, Branch, Commit, Stash, BRANCH_FORMAT,
    LOG_FORMAT,
};
pub use process::{new_process_log, GitOutput, GitRunner, ProcessLog, ProcessLogHandle};
pub use status::{
    current_branch, git_available, in_progress_op, parse_status, push_remote_ref, repo_root,
    upstream_ref, BranchInfo, NotARepository, StatusEntry, StatusSnapshot,
};
