use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub process_log: ProcessLogConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub confirm: ConfirmConfig,
}

/// [log] section — the recent/unpushed/unpulled commit snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_max_count")]
    pub max_count: usize,
}

/// [process_log] section — the bounded command record ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessLogConfig {
    #[serde(default = "default_process_log_max_lines")]
    pub max_lines: usize,
}

/// [refresh] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Post-save debounce in milliseconds; the last save in a burst wins
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// [display] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_recent: bool,
    #[serde(default = "default_true")]
    pub show_stashes: bool,
}

/// [confirm] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConfig {
    #[serde(default = "default_true")]
    pub discard: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_max_count() -> usize {
    20
}

fn default_process_log_max_lines() -> usize {
    5_000
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_count: default_log_max_count(),
        }
    }
}

impl Default for ProcessLogConfig {
    fn default() -> Self {
        Self {
            max_lines: default_process_log_max_lines(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_recent: true,
            show_stashes: true,
        }
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self { discard: true }
    }
}

/// Config files in ascending precedence: the global file, then the per-repo
/// override. Built-in defaults sit below both.
fn config_layers(repo_root: &str) -> Vec<PathBuf> {
    let mut layers = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        layers.push(dir.join("gitdeck").join("config.toml"));
    }
    layers.push(Path::new(repo_root).join(".gitdeck.toml"));
    layers
}

/// Read one layer as a TOML table. A missing file is normal; a file that
/// exists but fails to parse is logged, so a broken override does not
/// silently vanish into defaults.
fn read_layer(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match content.parse::<toml::Table>() {
        Ok(table) => Some(table),
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unparsable config file");
            None
        }
    }
}

/// Fold `overlay` into `base`: tables merge key by key, scalar values are
/// replaced, so fields within a section override independently.
fn merge_into(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_into(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            scalar => {
                base.insert(key, scalar);
            }
        }
    }
}

/// Load config by folding the layers over the built-in defaults.
pub fn load_config(repo_root: &str) -> DeckConfig {
    let mut merged = toml::Table::new();
    for path in config_layers(repo_root) {
        if let Some(layer) = read_layer(&path) {
            merge_into(&mut merged, layer);
        }
    }
    if merged.is_empty() {
        return DeckConfig::default();
    }

    match toml::Value::Table(merged).try_into() {
        Ok(config) => config,
        Err(err) => {
            warn!(%err, "config did not deserialize; falling back to defaults");
            DeckConfig::default()
        }
    }
}
