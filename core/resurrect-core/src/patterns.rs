//! Compiled regex patterns.
//!
//! Compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

/// Environment variable names that are safe to emit as `NAME=value` prefixes.
pub static RE_ENV_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Pane targets as written by tmux-resurrect: `session:window.pane`.
pub static RE_PANE_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+:\d+\.\d+$").unwrap());
