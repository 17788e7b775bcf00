//! Restore path: type each recorded resume command back into its pane.
//!
//! Records are handled one at a time. Before anything is typed a pane must
//! pass two guards:
//!
//! 1. its foreground command is a known interactive shell, so keystrokes
//!    land at a prompt and not inside some other program
//! 2. no assistant runs anywhere under the pane, so running restore twice
//!    never starts a second copy
//!
//! Every skip carries a reason and nothing aborts the run.

use std::fmt;
use std::thread;

use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::process::{ProcessSnapshot, ProcessSource};
use crate::record::{SessionRecord, SessionsFile};
use crate::storage::StorageConfig;
use crate::tmux::{is_shell, Multiplexer};
use crate::tools::{build_resume_line, Tool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    PaneMissing,
    /// Guard 1: the pane's foreground is not a shell.
    ForegroundNotShell(String),
    /// Guard 2: an assistant already runs under the pane.
    AlreadyRunning(Tool),
    UnknownTool(String),
    EmptySessionId,
    InjectFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PaneMissing => write!(f, "pane no longer exists"),
            SkipReason::ForegroundNotShell(cmd) => write!(f, "foreground is not a shell ({cmd})"),
            SkipReason::AlreadyRunning(tool) => write!(f, "{tool} already running"),
            SkipReason::UnknownTool(tool) => write!(f, "unknown tool {tool}"),
            SkipReason::EmptySessionId => write!(f, "record has no session id"),
            SkipReason::InjectFailed(err) => write!(f, "injection failed: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPane {
    pub pane: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Panes that received a resume command.
    pub restored: Vec<String>,
    pub skipped: Vec<SkippedPane>,
}

pub struct RestoreCoordinator<M, P> {
    mux: M,
    processes: P,
    config: StorageConfig,
    settings: Settings,
}

impl<M: Multiplexer, P: ProcessSource> RestoreCoordinator<M, P> {
    pub fn new(mux: M, processes: P, config: StorageConfig, settings: Settings) -> Self {
        Self {
            mux,
            processes,
            config,
            settings,
        }
    }

    /// Restore every record in the session-record document.
    pub fn run(&self) -> Result<RestoreReport> {
        let path = self.config.sessions_file();
        let Some(file) = SessionsFile::load(&path) else {
            tracing::info!(path = %path.display(), "No session records to restore");
            return Ok(RestoreReport::default());
        };
        tracing::info!(
            path = %path.display(),
            saved_at = %file.timestamp.to_rfc3339(),
            records = file.sessions.len(),
            "Restoring sessions"
        );

        let snapshot = self.processes.snapshot();
        let mut report = RestoreReport::default();

        for record in &file.sessions {
            let outcome = self.check(record, &snapshot).and_then(|line| {
                if !report.restored.is_empty() && !self.settings.restore_delay.is_zero() {
                    thread::sleep(self.settings.restore_delay);
                }
                self.inject(&record.pane, &line)
            });

            match outcome {
                Ok(()) => {
                    tracing::info!(
                        pane = %record.pane,
                        tool = %record.tool,
                        session_id = %record.session_id,
                        "Restored session"
                    );
                    report.restored.push(record.pane.clone());
                }
                Err(reason) => {
                    tracing::info!(pane = %record.pane, tool = %record.tool, reason = %reason, "Skipped pane");
                    report.skipped.push(SkippedPane {
                        pane: record.pane.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            restored = report.restored.len(),
            skipped = report.skipped.len(),
            "Restore complete"
        );
        Ok(report)
    }

    /// Run the record through both guards and build the line to type.
    fn check(
        &self,
        record: &SessionRecord,
        snapshot: &ProcessSnapshot,
    ) -> std::result::Result<String, SkipReason> {
        let tool: Tool = record
            .tool
            .parse()
            .map_err(|_| SkipReason::UnknownTool(record.tool.clone()))?;
        if record.session_id.trim().is_empty() {
            return Err(SkipReason::EmptySessionId);
        }

        let pane = self
            .mux
            .describe_pane(&record.pane)
            .ok_or(SkipReason::PaneMissing)?;

        if !is_shell(&pane.foreground_command) {
            return Err(SkipReason::ForegroundNotShell(pane.foreground_command));
        }
        if let Some(running) = snapshot.find_assistant(pane.pid) {
            return Err(SkipReason::AlreadyRunning(running.tool));
        }

        Ok(build_resume_line(tool, record))
    }

    fn inject(&self, pane: &str, line: &str) -> std::result::Result<(), SkipReason> {
        tracing::debug!(pane = %pane, line = %line, "Injecting resume command");
        self.mux
            .clear_pane(pane)
            .and_then(|()| self.mux.send_line(pane, line))
            .map_err(|err| SkipReason::InjectFailed(err.to_string()))
    }
}
