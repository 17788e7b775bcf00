//! Runtime tunables read from the environment.

use std::time::Duration;

use crate::error::{ResurrectError, Result};

pub const ENV_RESTORE_DELAY_MS: &str = "TMUX_ASSISTANT_RESURRECT_RESTORE_DELAY_MS";
pub const ENV_LOG_LINES: &str = "TMUX_ASSISTANT_RESURRECT_LOG_LINES";
pub const ENV_PRUNE_PANE_CONTENTS: &str = "TMUX_ASSISTANT_RESURRECT_PRUNE_PANE_CONTENTS";
pub const ENV_DEBUG_LOG: &str = "TMUX_ASSISTANT_RESURRECT_DEBUG_LOG";
pub const ENV_CAPTURE_VARS: &str = "TMUX_ASSISTANT_RESURRECT_ENV_VARS";

const DEFAULT_RESTORE_DELAY_MS: u64 = 1500;
const DEFAULT_LOG_LINES: usize = 1000;
const DEFAULT_CAPTURE_VARS: &[&str] = &["CLAUDE_CONFIG_DIR"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Pause between two restored panes.
    pub restore_delay: Duration,
    /// Lines kept in each diagnostic log after a run.
    pub log_max_lines: usize,
    /// Drop captured pane text for panes that will be resumed.
    pub prune_pane_contents: bool,
    pub debug_log: bool,
    /// Environment variables a hook captures for replay at restore.
    pub capture_vars: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restore_delay: Duration::from_millis(DEFAULT_RESTORE_DELAY_MS),
            log_max_lines: DEFAULT_LOG_LINES,
            prune_pane_contents: true,
            debug_log: false,
            capture_vars: DEFAULT_CAPTURE_VARS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Read tunables from the process environment. See [`Settings::from_lookup`].
    pub fn from_env() -> (Self, Vec<ResurrectError>) {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from `lookup`. A value that does not parse keeps its
    /// default and is returned alongside, so one typo never stops a run.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ResurrectError>) {
        let mut settings = Settings::default();
        let mut rejected = Vec::new();

        if let Some(value) = lookup(ENV_RESTORE_DELAY_MS) {
            match parse_number(ENV_RESTORE_DELAY_MS, &value) {
                Ok(ms) => settings.restore_delay = Duration::from_millis(ms),
                Err(err) => rejected.push(err),
            }
        }
        if let Some(value) = lookup(ENV_LOG_LINES) {
            match parse_number(ENV_LOG_LINES, &value) {
                Ok(lines) => settings.log_max_lines = lines,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(value) = lookup(ENV_PRUNE_PANE_CONTENTS) {
            match parse_flag(ENV_PRUNE_PANE_CONTENTS, &value) {
                Ok(flag) => settings.prune_pane_contents = flag,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(value) = lookup(ENV_DEBUG_LOG) {
            match parse_flag(ENV_DEBUG_LOG, &value) {
                Ok(flag) => settings.debug_log = flag,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(value) = lookup(ENV_CAPTURE_VARS) {
            settings.capture_vars = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        (settings, rejected)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ResurrectError::InvalidSetting {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a non-negative integer".to_string(),
        })
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" | "on" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "off" | "" => Ok(false),
        _ => Err(ResurrectError::InvalidSetting {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
