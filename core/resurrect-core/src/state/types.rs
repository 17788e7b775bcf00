//! Serialized state types written by native hooks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::Tool;

/// Key of one state document: the tool plus the pid of the tool process
/// itself (never the pid of a shell that launched it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub tool: Tool,
    pub pid: u32,
}

impl StateKey {
    pub fn new(tool: Tool, pid: u32) -> Self {
        Self { tool, pid }
    }

    /// `claude-4242.json`
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.tool.id(), self.pid)
    }

    /// Inverse of [`StateKey::file_name`]; `None` for foreign files.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".json")?;
        let (tool, pid) = stem.rsplit_once('-')?;
        Some(Self {
            tool: tool.parse().ok()?,
            pid: pid.parse().ok().filter(|pid| *pid > 0)?,
        })
    }
}

/// One tool instance's current session, as recorded by its hook or plugin.
///
/// Unknown fields are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub tool: String,
    pub session_id: String,
    #[serde(default, alias = "process_identity")]
    pub pid: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StateDocument {
    pub fn new(tool: Tool, session_id: impl Into<String>, pid: u32) -> Self {
        Self {
            tool: tool.id().to_string(),
            session_id: session_id.into(),
            pid: Some(pid),
            created_at: Some(Utc::now()),
            model: None,
            env: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// A document only counts when it names a session.
    pub fn has_session(&self) -> bool {
        !self.session_id.trim().is_empty()
    }
}
