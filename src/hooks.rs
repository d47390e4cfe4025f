//! Minimal hook bus. The core raises `status-refreshed`, `commit-finished`
//! and `post-operation`; it consumes `after-save` to drive the debounced
//! refresh. An embedding host hangs its own handlers here (e.g. reverting
//! file buffers after tree-changing operations).

use std::collections::HashMap;

/// Events raised by the core
pub const STATUS_REFRESHED: &str = "status-refreshed";
pub const COMMIT_FINISHED: &str = "commit-finished";
pub const POST_OPERATION: &str = "post-operation";
/// Event consumed by the core
pub const AFTER_SAVE: &str = "after-save";

/// Payload passed to handlers
#[derive(Debug, Clone, Default)]
pub struct HookArgs {
    pub op: Option<String>,
    pub args: Vec<String>,
    pub exit: Option<i32>,
}

impl HookArgs {
    pub fn operation(op: &str, args: &[String], exit: i32) -> Self {
        HookArgs {
            op: Some(op.to_string()),
            args: args.to_vec(),
            exit: Some(exit),
        }
    }
}

type Handler = Box<dyn Fn(&HookArgs) + Send>;

#[derive(Default)]
pub struct HookBus {
    handlers: HashMap<&'static str, Vec<Handler>>,
}

impl HookBus {
    pub fn new() -> Self {
        HookBus::default()
    }

    pub fn add<F>(&mut self, event: &'static str, handler: F)
    where
        F: Fn(&HookArgs) + Send + 'static,
    {
        self.handlers.entry(event).or_default().push(Box::new(handler));
    }

    pub fn fire(&self, event: &str, args: &HookArgs) {
        if let Some(handlers) = self.handlers.get(event) {
            for handler in handlers {
                handler(args);
            }
        }
    }
}
