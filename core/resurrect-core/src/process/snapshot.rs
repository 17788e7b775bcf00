//! Point-in-time process table.
//!
//! One [`ProcessSnapshot`] is captured per save or restore cycle and shared
//! by every pane, so the number of full process-table scans stays constant no
//! matter how many panes exist. The snapshot indexes the flat table into a
//! parent → children map once, at construction.

use std::collections::HashMap;

use sysinfo::{ProcessRefreshKind, System, UpdateKind};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// 0 when the process has no visible parent.
    pub parent_pid: u32,
    pub argv: Vec<String>,
}

impl ProcessRecord {
    pub fn new(pid: u32, parent_pid: u32, command_line: &str) -> Self {
        Self {
            pid,
            parent_pid,
            argv: command_line.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Space-joined argv, the same shape `ps -o args` prints.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// Source of process snapshots. Production uses [`SystemProcessSource`];
/// tests supply a fixed table.
pub trait ProcessSource {
    fn snapshot(&self) -> ProcessSnapshot;
}

#[derive(Debug, Clone, Default)]
pub struct ProcessSnapshot {
    processes: HashMap<u32, ProcessRecord>,
    children: HashMap<u32, Vec<u32>>,
}

impl ProcessSnapshot {
    pub fn from_records(records: impl IntoIterator<Item = ProcessRecord>) -> Self {
        let mut processes = HashMap::new();
        for record in records {
            if record.pid == 0 {
                continue;
            }
            processes.insert(record.pid, record);
        }

        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for record in processes.values() {
            if record.parent_pid != record.pid {
                children.entry(record.parent_pid).or_default().push(record.pid);
            }
        }
        // Deterministic walk order regardless of table order.
        for kids in children.values_mut() {
            kids.sort_unstable();
        }

        Self {
            processes,
            children,
        }
    }

    pub fn get(&self, pid: u32) -> Option<&ProcessRecord> {
        self.processes.get(&pid)
    }

    pub fn children(&self, pid: u32) -> &[u32] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Process table read through `sysinfo`, one full refresh per snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessSource;

impl ProcessSource for SystemProcessSource {
    fn snapshot(&self) -> ProcessSnapshot {
        let mut sys = System::new();
        sys.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));

        let records = sys.processes().iter().map(|(pid, process)| {
            let mut argv = process.cmd().to_vec();
            if argv.is_empty() {
                // Kernel threads and processes we may not read report no argv.
                argv.push(process.name().to_string());
            }
            ProcessRecord {
                pid: pid.as_u32(),
                parent_pid: process.parent().map(|parent| parent.as_u32()).unwrap_or(0),
                argv,
            }
        });

        let snapshot = ProcessSnapshot::from_records(records);
        tracing::debug!(processes = snapshot.len(), "Captured process snapshot");
        snapshot
    }
}
