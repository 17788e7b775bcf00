//! In-memory tmux server and process table shared by the integration suites.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::time::Duration;

use resurrect_core::{
    Multiplexer, PaneInfo, PaneState, ProcessRecord, ProcessSnapshot, ProcessSource, Result,
    Settings, StorageConfig,
};

#[derive(Default)]
pub struct World {
    pub panes: Vec<PaneInfo>,
    /// Foreground command per pane address; defaults to `zsh`.
    pub foreground: HashMap<String, String>,
    pub processes: Vec<ProcessRecord>,
    pub sent: Vec<(String, String)>,
    pub cleared: Vec<String>,
    next_pid: u32,
}

impl World {
    pub fn shared() -> Rc<RefCell<World>> {
        Rc::new(RefCell::new(World {
            next_pid: 10_000,
            ..World::default()
        }))
    }

    /// Add a pane whose shell runs as `pid`.
    pub fn add_pane(&mut self, address: &str, pid: u32, cwd: &str) {
        self.panes.push(PaneInfo {
            address: address.to_string(),
            pid,
            cwd: cwd.to_string(),
        });
        self.processes.push(ProcessRecord::new(pid, 1, "-zsh"));
    }

    pub fn spawn(&mut self, pid: u32, parent: u32, command: &str) {
        self.processes.push(ProcessRecord::new(pid, parent, command));
    }
}

#[derive(Clone)]
pub struct FakeTmux(pub Rc<RefCell<World>>);

impl Multiplexer for FakeTmux {
    fn list_panes(&self) -> Result<Vec<PaneInfo>> {
        Ok(self.0.borrow().panes.clone())
    }

    fn describe_pane(&self, target: &str) -> Option<PaneState> {
        let world = self.0.borrow();
        let pane = world.panes.iter().find(|pane| pane.address == target)?;
        Some(PaneState {
            pid: pane.pid,
            foreground_command: world
                .foreground
                .get(target)
                .cloned()
                .unwrap_or_else(|| "zsh".to_string()),
        })
    }

    fn clear_pane(&self, target: &str) -> Result<()> {
        self.0.borrow_mut().cleared.push(target.to_string());
        Ok(())
    }

    /// Records the line and starts the typed command under the pane shell,
    /// the way a real shell would once Enter is pressed.
    fn send_line(&self, target: &str, line: &str) -> Result<()> {
        let mut world = self.0.borrow_mut();
        world.sent.push((target.to_string(), line.to_string()));

        let shell_pid = world
            .panes
            .iter()
            .find(|pane| pane.address == target)
            .map(|pane| pane.pid);
        if let Some(shell_pid) = shell_pid {
            let command: Vec<&str> = line
                .rsplit("&& ")
                .next()
                .unwrap_or(line)
                .split_whitespace()
                .skip_while(|token| token.contains('='))
                .collect();
            let pid = world.next_pid;
            world.next_pid += 1;
            world.spawn(pid, shell_pid, &command.join(" "));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeProcesses(pub Rc<RefCell<World>>);

impl ProcessSource for FakeProcesses {
    fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot::from_records(self.0.borrow().processes.clone())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        restore_delay: Duration::ZERO,
        ..Settings::default()
    }
}

pub fn tar_available() -> bool {
    Command::new("tar")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Write a tmux-resurrect style `pane_contents.tar.gz` holding one captured
/// text file per pane address.
pub fn write_pane_archive(config: &StorageConfig, scratch: &Path, panes: &[&str]) -> PathBuf {
    let src = scratch.join("capture");
    std::fs::create_dir_all(src.join("pane_contents")).unwrap();
    for pane in panes {
        std::fs::write(src.join("pane_contents").join(format!("pane-{pane}")), "$ ls\n").unwrap();
    }

    let archive = config.pane_contents_archive();
    std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
    let status = Command::new("tar")
        .arg("-czf")
        .arg(&archive)
        .arg("-C")
        .arg(&src)
        .arg("./pane_contents/")
        .status()
        .unwrap();
    assert!(status.success());
    archive
}

/// File names of the pane captures in `archive`, sorted.
pub fn archived_panes(archive: &Path) -> Vec<String> {
    let out = Command::new("tar").arg("-tzf").arg(archive).output().unwrap();
    let mut names: Vec<String> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter_map(|line| line.rsplit('/').next())
        .filter(|name| name.starts_with("pane-"))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}
