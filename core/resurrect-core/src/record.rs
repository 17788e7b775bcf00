//! The session-record document shared by the save and restore paths.
//!
//! # File Format
//!
//! ```json
//! {
//!   "timestamp": "2026-10-19T09:12:44Z",
//!   "sessions": [
//!     { "pane": "work:1.0", "tool": "claude", "session_id": "…",
//!       "cwd": "/home/u/project", "pid": 4242,
//!       "cli_args": ["--dangerously-skip-permissions"] }
//!   ]
//! }
//! ```
//!
//! One writer (save) and one reader (restore). The writer replaces the file
//! with temp file + rename so the reader never sees a partial document. A
//! missing, empty or corrupt file reads as "nothing to restore".

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{ResurrectError, Result};

/// One pane's assistant, as captured at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// tmux target, `session:window.pane`.
    pub pane: String,
    /// Tool identifier. Kept as a string so unknown tools survive a round trip
    /// and are reported at restore time instead of failing the whole parse.
    pub tool: String,
    pub session_id: String,
    pub cwd: String,
    pub pid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cli_args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsFile {
    pub timestamp: DateTime<Utc>,
    pub sessions: Vec<SessionRecord>,
}

impl SessionsFile {
    pub fn new(sessions: Vec<SessionRecord>) -> Self {
        Self {
            timestamp: Utc::now(),
            sessions,
        }
    }

    /// Load the document, treating absence and corruption as empty.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read session records");
                return None;
            }
        };

        if content.trim().is_empty() {
            tracing::warn!(path = %path.display(), "Session record file is empty");
            return None;
        }

        match serde_json::from_str(&content) {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Session record file is corrupt; ignoring"
                );
                None
            }
        }
    }

    /// Atomically replace the document at `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|err| ResurrectError::json("serialize session records", err))?;
        write_file_atomic(path, content.as_bytes())
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        ResurrectError::io(
            format!("{} has no parent directory", path.display()),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    fs::create_dir_all(parent).map_err(|err| ResurrectError::io("create parent directory", err))?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|err| ResurrectError::io("create temp file", err))?;
    temp.write_all(bytes)
        .and_then(|()| temp.write_all(b"\n"))
        .and_then(|()| temp.flush())
        .map_err(|err| ResurrectError::io("write temp file", err))?;
    temp.persist(path).map_err(|err| ResurrectError::Persist {
        path: path.to_path_buf(),
        source: err,
    })?;
    Ok(())
}
