//! File-backed state store.
//!
//! One JSON document per tool process in a private directory:
//!
//! ```text
//! $TMUX_ASSISTANT_RESURRECT_DIR/
//! ├── claude-4242.json     # { tool, session_id, pid, created_at, ... }
//! └── opencode-5150.json
//! ```
//!
//! Native hooks are the writers; the engine only reads, except for the
//! reaper, which deletes documents whose owning process has exited.
//!
//! # Defensive Design
//!
//! Hooks write asynchronously and may be killed mid-write, so:
//! - Missing files read as absent
//! - Empty files read as absent
//! - Corrupt JSON reads as absent (debug log, no error)
//! - Documents with a blank `session_id` read as absent

use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::{ResurrectError, Result};
use crate::record::write_file_atomic;
use crate::tools::Tool;

use super::types::{StateDocument, StateKey};

/// Results from a reap pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapStats {
    /// Documents inspected.
    pub scanned: u32,
    /// Documents removed because their pid is dead.
    pub removed: u32,
    /// Errors encountered while removing.
    pub errors: Vec<String>,
}

pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StateKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Look up the document for `(tool, pid)`.
    pub fn get(&self, tool: Tool, pid: u32) -> Option<StateDocument> {
        let key = StateKey::new(tool, pid);
        let path = self.path_for(key);

        let content = fs::read_to_string(&path).ok()?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Empty state document");
            return None;
        }

        let doc: StateDocument = match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Corrupt state document");
                return None;
            }
        };

        if !doc.has_session() {
            tracing::debug!(path = %path.display(), "State document has no session id");
            return None;
        }
        if doc.tool != tool.id() {
            tracing::debug!(
                path = %path.display(),
                found = %doc.tool,
                expected = %tool,
                "State document tool mismatch"
            );
            return None;
        }

        Some(doc)
    }

    /// Create or replace the document for `(tool, pid)`.
    pub fn put(&self, tool: Tool, pid: u32, doc: &StateDocument) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(StateKey::new(tool, pid));
        let content = serde_json::to_vec_pretty(doc)
            .map_err(|err| ResurrectError::json("serialize state document", err))?;
        write_file_atomic(&path, &content)?;
        Ok(path)
    }

    /// Remove the document for `(tool, pid)`. Absence is not an error.
    pub fn remove(&self, tool: Tool, pid: u32) -> Result<bool> {
        let path = self.path_for(StateKey::new(tool, pid));
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ResurrectError::io("remove state document", err)),
        }
    }

    /// All keys currently present, sorted.
    pub fn keys(&self) -> Vec<StateKey> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return vec![];
        };

        let mut keys: Vec<StateKey> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| StateKey::from_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        keys.sort();
        keys
    }

    /// Delete documents whose owning pid no longer runs.
    pub fn reap_stale(&self, is_alive: impl Fn(u32) -> bool) -> ReapStats {
        let mut stats = ReapStats::default();

        for key in self.keys() {
            stats.scanned += 1;
            if is_alive(key.pid) {
                continue;
            }
            match self.remove(key.tool, key.pid) {
                Ok(true) => {
                    stats.removed += 1;
                    tracing::debug!(tool = %key.tool, pid = key.pid, "Reaped stale state document");
                }
                Ok(false) => {}
                Err(err) => stats.errors.push(err.to_string()),
            }
        }

        stats
    }

    /// Create the store directory with owner-only permissions.
    pub fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)
            .map_err(|err| ResurrectError::io("create state directory", err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|err| ResurrectError::io("restrict state directory", err))?;
        }
        Ok(())
    }
}
