//! Save path: capture every pane's assistant session into the session-record
//! document.
//!
//! One process snapshot is taken per run and shared by all panes. A pane
//! that fails to resolve is logged and skipped; it never stops the others.

use serde::Serialize;

use crate::archive;
use crate::config::Settings;
use crate::error::Result;
use crate::process::{Detection, ProcessSnapshot, ProcessSource};
use crate::record::{SessionRecord, SessionsFile};
use crate::resolve::{ResolvedSession, SessionResolver, SessionSource};
use crate::storage::StorageConfig;
use crate::tmux::{Multiplexer, PaneInfo};
use crate::tools::Tool;

/// Summary of one save run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub panes_scanned: usize,
    pub recorded: usize,
    /// Panes with a detected assistant whose session could not be resolved.
    pub unresolved: usize,
    pub archive_pruned: usize,
}

/// What a pane holds right now, without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneInspection {
    pub pane: String,
    pub cwd: String,
    pub tool: Option<Tool>,
    pub pid: Option<u32>,
    pub session_id: Option<String>,
    pub source: Option<SessionSource>,
}

pub struct SaveCoordinator<M, P> {
    mux: M,
    processes: P,
    resolver: SessionResolver,
    config: StorageConfig,
    settings: Settings,
}

impl<M: Multiplexer, P: ProcessSource> SaveCoordinator<M, P> {
    pub fn new(mux: M, processes: P, config: StorageConfig, settings: Settings) -> Self {
        Self {
            mux,
            processes,
            resolver: SessionResolver::new(&config),
            config,
            settings,
        }
    }

    pub fn with_resolver(mut self, resolver: SessionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Detect and resolve every pane, then replace the session-record
    /// document.
    pub fn run(&self) -> Result<SaveReport> {
        let panes = self.mux.list_panes()?;
        let snapshot = self.processes.snapshot();

        let mut report = SaveReport {
            panes_scanned: panes.len(),
            ..SaveReport::default()
        };
        let mut records = Vec::new();

        for pane in &panes {
            let Some((detection, resolved)) = self.scan_pane(&snapshot, pane) else {
                continue;
            };
            let Some(resolved) = resolved else {
                report.unresolved += 1;
                tracing::warn!(
                    pane = %pane.address,
                    tool = %detection.tool,
                    pid = detection.process.pid,
                    command = %detection.process.command_line(),
                    "Assistant found but no session id could be resolved"
                );
                continue;
            };

            tracing::info!(
                pane = %pane.address,
                tool = %detection.tool,
                session_id = %resolved.session_id,
                source = %resolved.source,
                "Recorded session"
            );
            records.push(to_record(pane, &detection, resolved));
        }

        report.recorded = records.len();
        let sessions_file = self.config.sessions_file();
        let file = SessionsFile::new(records);
        file.write_atomic(&sessions_file)?;
        tracing::info!(
            path = %sessions_file.display(),
            panes = report.panes_scanned,
            recorded = report.recorded,
            unresolved = report.unresolved,
            "Saved session records"
        );

        if self.settings.prune_pane_contents && !file.sessions.is_empty() {
            let archive = self.config.pane_contents_archive();
            let panes = file.sessions.iter().map(|record| record.pane.as_str());
            match archive::prune_pane_contents(&archive, panes) {
                Ok(pruned) => report.archive_pruned = pruned,
                Err(err) => {
                    tracing::warn!(archive = %archive.display(), error = %err, "Failed to prune pane contents");
                }
            }
        }

        Ok(report)
    }

    /// Per-pane detection and resolution, for display.
    pub fn inspect(&self) -> Result<Vec<PaneInspection>> {
        let panes = self.mux.list_panes()?;
        let snapshot = self.processes.snapshot();

        Ok(panes
            .iter()
            .map(|pane| {
                let scanned = self.scan_pane(&snapshot, pane);
                let detection = scanned.as_ref().map(|(detection, _)| detection);
                let resolved = scanned.as_ref().and_then(|(_, resolved)| resolved.as_ref());
                PaneInspection {
                    pane: pane.address.clone(),
                    cwd: pane.cwd.clone(),
                    tool: detection.map(|d| d.tool),
                    pid: detection.map(|d| d.process.pid),
                    session_id: resolved.map(|r| r.session_id.clone()),
                    source: resolved.map(|r| r.source),
                }
            })
            .collect())
    }

    fn scan_pane(
        &self,
        snapshot: &ProcessSnapshot,
        pane: &PaneInfo,
    ) -> Option<(Detection, Option<ResolvedSession>)> {
        let detection = snapshot.find_assistant(pane.pid)?;
        let resolved = self.resolver.resolve(&detection, &pane.cwd);
        Some((detection, resolved))
    }
}

fn to_record(pane: &PaneInfo, detection: &Detection, resolved: ResolvedSession) -> SessionRecord {
    SessionRecord {
        pane: pane.address.clone(),
        tool: detection.tool.id().to_string(),
        session_id: resolved.session_id,
        cwd: pane.cwd.clone(),
        pid: detection.process.pid,
        model: resolved.model,
        cli_args: resolved.cli_args,
        env: resolved.env,
    }
}
