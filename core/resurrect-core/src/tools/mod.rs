//! Supported assistant tools and the per-tool knowledge the engine needs.
//!
//! Add a new tool by extending [`Tool`], adding a row to
//! [`classify::DETECT_TABLE`], and teaching [`command`] how to resume it.

pub mod classify;
pub mod command;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResurrectError;

pub use classify::{classify, DetectDef, DETECT_TABLE};
pub use command::{build_resume_line, resume_command};

/// Closed set of assistant CLIs the engine knows how to save and resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Claude,
    OpenCode,
    Codex,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Claude, Tool::OpenCode, Tool::Codex];

    /// Stable identifier used in file names and session records.
    pub fn id(self) -> &'static str {
        match self {
            Tool::Claude => "claude",
            Tool::OpenCode => "opencode",
            Tool::Codex => "codex",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Claude => "Claude Code",
            Tool::OpenCode => "OpenCode",
            Tool::Codex => "Codex",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tool {
    type Err = ResurrectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.id() == s)
            .ok_or_else(|| ResurrectError::UnsupportedTool(s.to_string()))
    }
}
