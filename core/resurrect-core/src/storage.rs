//! Storage configuration and path management.
//!
//! Every path the engine touches is decided here:
//!
//! - the private state directory that hooks write into
//! - the tmux-resurrect directory holding session records, logs and the
//!   pane-contents archive
//! - the read-only, tool-owned codex PID log and opencode database
//!
//! Production code uses [`StorageConfig::from_env`]; tests use
//! [`StorageConfig::with_dirs`] to point everything at a temp directory.

use std::path::{Path, PathBuf};

use crate::error::{ResurrectError, Result};

pub const ENV_STATE_DIR: &str = "TMUX_ASSISTANT_RESURRECT_DIR";
pub const ENV_RESURRECT_DIR: &str = "TMUX_ASSISTANT_RESURRECT_RESURRECT_DIR";
pub const ENV_CODEX_LOG: &str = "TMUX_ASSISTANT_RESURRECT_CODEX_LOG";
pub const ENV_OPENCODE_DB: &str = "TMUX_ASSISTANT_RESURRECT_OPENCODE_DB";

const STATE_DIR_NAME: &str = "tmux-assistant-resurrect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    state_dir: PathBuf,
    resurrect_dir: PathBuf,
    codex_log: PathBuf,
    opencode_db: PathBuf,
}

impl StorageConfig {
    /// Resolve paths from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// Resolve paths from an arbitrary variable lookup and home directory.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let home = home.ok_or(ResurrectError::HomeDirNotFound)?;

        let state_dir = match var(ENV_STATE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_state_dir(var("XDG_RUNTIME_DIR")),
        };

        let data_home = var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("share"));

        let resurrect_dir = match var(ENV_RESURRECT_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let legacy = home.join(".tmux").join("resurrect");
                if legacy.is_dir() {
                    legacy
                } else {
                    data_home.join("tmux").join("resurrect")
                }
            }
        };

        let codex_log = match var(ENV_CODEX_LOG) {
            Some(path) => PathBuf::from(path),
            None => var("CODEX_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".codex"))
                .join("pid-sessions.jsonl"),
        };

        let opencode_db = match var(ENV_OPENCODE_DB) {
            Some(path) => PathBuf::from(path),
            None => data_home.join("opencode").join("opencode.db"),
        };

        Ok(Self {
            state_dir,
            resurrect_dir,
            codex_log,
            opencode_db,
        })
    }

    /// Point every path below `root`. Used for testing with temp directories.
    pub fn with_dirs(root: &Path) -> Self {
        Self {
            state_dir: root.join("state"),
            resurrect_dir: root.join("resurrect"),
            codex_log: root.join("codex").join("pid-sessions.jsonl"),
            opencode_db: root.join("opencode").join("opencode.db"),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn resurrect_dir(&self) -> &Path {
        &self.resurrect_dir
    }

    pub fn codex_log(&self) -> &Path {
        &self.codex_log
    }

    pub fn opencode_db(&self) -> &Path {
        &self.opencode_db
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files in the resurrect directory
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to assistant-sessions.json (save output, restore input).
    pub fn sessions_file(&self) -> PathBuf {
        self.resurrect_dir.join("assistant-sessions.json")
    }

    pub fn save_log(&self) -> PathBuf {
        self.resurrect_dir.join("assistant-save.log")
    }

    pub fn restore_log(&self) -> PathBuf {
        self.resurrect_dir.join("assistant-restore.log")
    }

    /// Diagnostic log of the native hook, kept beside the documents it writes.
    pub fn hook_log(&self) -> PathBuf {
        self.state_dir.join("hook.log")
    }

    /// Pane text archive written by tmux-resurrect.
    pub fn pane_contents_archive(&self) -> PathBuf {
        self.resurrect_dir.join("pane_contents.tar.gz")
    }
}

fn default_state_dir(runtime_dir: Option<String>) -> PathBuf {
    if let Some(runtime) = runtime_dir {
        return PathBuf::from(runtime).join(STATE_DIR_NAME);
    }
    std::env::temp_dir().join(format!("{}-{}", STATE_DIR_NAME, current_uid()))
}

fn current_uid() -> u32 {
    #[cfg(unix)]
    {
        // SAFETY: getuid has no failure modes.
        #[allow(unsafe_code)]
        unsafe {
            libc::getuid()
        }
    }
    #[cfg(not(unix))]
    {
        0
    }
}
