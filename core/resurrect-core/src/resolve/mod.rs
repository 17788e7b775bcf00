//! Session resolution: from a detected assistant process to its session id.
//!
//! Each tool has an ordered chain of sources and the first one that answers
//! wins:
//!
//! | Tool     | Chain                                        |
//! |----------|----------------------------------------------|
//! | claude   | state store → command line                   |
//! | opencode | state store → command line → session database |
//! | codex    | PID log → command line                       |
//!
//! The state store is written by the tool's own hook and follows in-process
//! session switches, so it outranks the launch flags, which go stale the
//! moment the user switches.

pub mod args;
pub mod database;
pub mod pid_log;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::process::Detection;
use crate::state::StateStore;
use crate::storage::StorageConfig;
use crate::tools::Tool;

/// Where a resolved session id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    StateStore,
    CommandLine,
    PidLog,
    Database,
}

impl fmt::Display for SessionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionSource::StateStore => "state_store",
            SessionSource::CommandLine => "command_line",
            SessionSource::PidLog => "pid_log",
            SessionSource::Database => "database",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSession {
    pub session_id: String,
    pub source: SessionSource,
    pub model: Option<String>,
    pub env: BTreeMap<String, String>,
    /// Launch flags to replay on resume.
    pub cli_args: Vec<String>,
}

impl ResolvedSession {
    fn bare(session_id: String, source: SessionSource) -> Self {
        Self {
            session_id,
            source,
            model: None,
            env: BTreeMap::new(),
            cli_args: Vec::new(),
        }
    }
}

pub struct SessionResolver {
    store: StateStore,
    codex_log: PathBuf,
    opencode_db: PathBuf,
    host_name: Option<String>,
}

impl SessionResolver {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            store: StateStore::new(config.state_dir()),
            codex_log: config.codex_log().to_path_buf(),
            opencode_db: config.opencode_db().to_path_buf(),
            host_name: sysinfo::System::host_name(),
        }
    }

    /// Override the host name used to filter PID log lines.
    pub fn with_host(mut self, host_name: Option<String>) -> Self {
        self.host_name = host_name;
        self
    }

    /// Resolve the session of `detection`, running in pane directory `cwd`.
    pub fn resolve(&self, detection: &Detection, cwd: &str) -> Option<ResolvedSession> {
        let tool = detection.tool;
        let argv = &detection.process.argv;

        let mut resolved = match tool {
            Tool::Claude => self
                .from_store(detection)
                .or_else(|| from_command_line(tool, argv)),
            Tool::OpenCode => self
                .from_store(detection)
                .or_else(|| from_command_line(tool, argv))
                .or_else(|| self.from_database(cwd)),
            Tool::Codex => self
                .from_pid_log(detection)
                .or_else(|| from_command_line(tool, argv)),
        }?;

        resolved.cli_args = args::replay_args(tool, argv);
        tracing::debug!(
            tool = %tool,
            pid = detection.process.pid,
            source = %resolved.source,
            session_id = %resolved.session_id,
            "Resolved session"
        );
        Some(resolved)
    }

    fn from_store(&self, detection: &Detection) -> Option<ResolvedSession> {
        let doc = self.store.get(detection.tool, detection.process.pid)?;
        Some(ResolvedSession {
            session_id: doc.session_id,
            source: SessionSource::StateStore,
            model: doc.model.filter(|model| !model.is_empty()),
            env: doc.env,
            cli_args: Vec::new(),
        })
    }

    fn from_pid_log(&self, detection: &Detection) -> Option<ResolvedSession> {
        pid_log::lookup(
            &self.codex_log,
            detection.process.pid,
            self.host_name.as_deref(),
        )
        .map(|id| ResolvedSession::bare(id, SessionSource::PidLog))
    }

    fn from_database(&self, cwd: &str) -> Option<ResolvedSession> {
        database::lookup(&self.opencode_db, cwd)
            .map(|id| ResolvedSession::bare(id, SessionSource::Database))
    }
}

fn from_command_line(tool: Tool, argv: &[String]) -> Option<ResolvedSession> {
    args::session_from_args(tool, argv)
        .map(|id| ResolvedSession::bare(id, SessionSource::CommandLine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessRecord;
    use crate::state::StateDocument;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn detection(tool: Tool, pid: u32, cmd: &str) -> Detection {
        Detection {
            tool,
            process: ProcessRecord::new(pid, 1, cmd),
        }
    }

    fn resolver(root: &std::path::Path) -> SessionResolver {
        SessionResolver::new(&StorageConfig::with_dirs(root)).with_host(Some("here".into()))
    }

    #[test]
    fn claude_state_store_beats_stale_resume_flag() {
        let tmp = tempdir().unwrap();
        let config = StorageConfig::with_dirs(tmp.path());
        let mut doc = StateDocument::new(Tool::Claude, "switched", 4242);
        doc.model = Some("opus".into());
        doc.env.insert("CLAUDE_CONFIG_DIR".into(), "/cfg".into());
        StateStore::new(config.state_dir())
            .put(Tool::Claude, 4242, &doc)
            .unwrap();

        let found = resolver(tmp.path())
            .resolve(
                &detection(Tool::Claude, 4242, "claude --dangerously-skip-permissions --resume launch"),
                "/w",
            )
            .unwrap();
        assert_eq!(found.session_id, "switched");
        assert_eq!(found.source, SessionSource::StateStore);
        assert_eq!(found.model.as_deref(), Some("opus"));
        assert_eq!(found.env.get("CLAUDE_CONFIG_DIR").map(String::as_str), Some("/cfg"));
        assert_eq!(found.cli_args, vec!["--dangerously-skip-permissions"]);
    }

    #[test]
    fn claude_falls_back_to_command_line() {
        let tmp = tempdir().unwrap();
        let found = resolver(tmp.path())
            .resolve(&detection(Tool::Claude, 7, "claude --resume abc"), "/w")
            .unwrap();
        assert_eq!(found.session_id, "abc");
        assert_eq!(found.source, SessionSource::CommandLine);
    }

    #[test]
    fn corrupt_or_empty_document_falls_through_to_command_line() {
        let tmp = tempdir().unwrap();
        let config = StorageConfig::with_dirs(tmp.path());
        let store = StateStore::new(config.state_dir());
        store.ensure_dir().unwrap();
        let path = store.path_for(crate::state::StateKey::new(Tool::Claude, 7));

        for content in ["{\"tool\": \"claude\", \"session_", "", "{\"tool\":\"claude\",\"session_id\":\"\"}"] {
            std::fs::write(&path, content).unwrap();
            let found = resolver(tmp.path())
                .resolve(&detection(Tool::Claude, 7, "claude --resume from-flag"), "/w")
                .unwrap();
            assert_eq!(found.session_id, "from-flag");
            assert_eq!(found.source, SessionSource::CommandLine);
        }
    }

    #[test]
    fn fresh_claude_without_hook_is_unresolved() {
        let tmp = tempdir().unwrap();
        assert!(resolver(tmp.path())
            .resolve(&detection(Tool::Claude, 7, "claude"), "/w")
            .is_none());
    }

    #[test]
    fn state_document_for_other_pid_is_ignored() {
        let tmp = tempdir().unwrap();
        let config = StorageConfig::with_dirs(tmp.path());
        StateStore::new(config.state_dir())
            .put(Tool::Claude, 1, &StateDocument::new(Tool::Claude, "x", 1))
            .unwrap();
        assert!(resolver(tmp.path())
            .resolve(&detection(Tool::Claude, 2, "claude"), "/w")
            .is_none());
    }

    #[test]
    fn codex_prefers_pid_log() {
        let tmp = tempdir().unwrap();
        let config = StorageConfig::with_dirs(tmp.path());
        std::fs::create_dir_all(config.codex_log().parent().unwrap()).unwrap();
        std::fs::write(
            config.codex_log(),
            "{\"pid\": 5150, \"session\": \"from-log\", \"host\": \"here\"}\n",
        )
        .unwrap();

        let r = resolver(tmp.path());
        let found = r
            .resolve(&detection(Tool::Codex, 5150, "codex resume from-args"), "/w")
            .unwrap();
        assert_eq!(found.session_id, "from-log");
        assert_eq!(found.source, SessionSource::PidLog);

        let found = r
            .resolve(&detection(Tool::Codex, 6000, "codex resume from-args"), "/w")
            .unwrap();
        assert_eq!(found.session_id, "from-args");
        assert_eq!(found.source, SessionSource::CommandLine);
    }

    #[test]
    fn opencode_chain_ends_at_database() {
        let tmp = tempdir().unwrap();
        let config = StorageConfig::with_dirs(tmp.path());
        std::fs::create_dir_all(config.opencode_db().parent().unwrap()).unwrap();
        let conn = Connection::open(config.opencode_db()).unwrap();
        conn.execute_batch(
            "CREATE TABLE session (id TEXT, directory TEXT, time_updated INTEGER);
             INSERT INTO session VALUES ('ses_db', '/proj', 10);",
        )
        .unwrap();
        drop(conn);

        let r = resolver(tmp.path());
        let found = r
            .resolve(&detection(Tool::OpenCode, 9, "opencode -m a/b"), "/proj")
            .unwrap();
        assert_eq!(found.session_id, "ses_db");
        assert_eq!(found.source, SessionSource::Database);
        assert_eq!(found.cli_args, vec!["--model", "a/b"]);

        let found = r
            .resolve(&detection(Tool::OpenCode, 9, "opencode -s ses_flag"), "/proj")
            .unwrap();
        assert_eq!(found.source, SessionSource::CommandLine);

        StateStore::new(config.state_dir())
            .put(Tool::OpenCode, 9, &StateDocument::new(Tool::OpenCode, "ses_plugin", 9))
            .unwrap();
        let found = r
            .resolve(&detection(Tool::OpenCode, 9, "opencode -s ses_flag"), "/proj")
            .unwrap();
        assert_eq!(found.session_id, "ses_plugin");
        assert_eq!(found.source, SessionSource::StateStore);
    }

    #[test]
    fn source_names_match_serde() {
        for source in [
            SessionSource::StateStore,
            SessionSource::CommandLine,
            SessionSource::PidLog,
            SessionSource::Database,
        ] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{source}\""));
        }
    }
}
