//! Multiplexer access.
//!
//! The engine only needs four things from tmux: enumerate panes, look at one
//! pane's foreground, clear a pane, and type a line into it. They sit behind
//! [`Multiplexer`] so the save and restore paths can be driven by a fake.

use std::process::Command;

use crate::error::{ResurrectError, Result};

const LIST_PANES_FORMAT: &str = "#{session_name}:#{window_index}.#{pane_index}\t#{pane_pid}\t#{pane_current_path}";
const DESCRIBE_PANE_FORMAT: &str = "#{pane_pid}\t#{pane_current_command}";

/// Shells a restore may type into.
const SHELLS: &[&str] = &[
    "bash", "zsh", "fish", "sh", "dash", "ksh", "mksh", "tcsh", "csh", "nu", "elvish", "xonsh",
];

/// One pane as listed by the multiplexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    /// `session:window.pane`
    pub address: String,
    /// Pid of the process the pane was started with.
    pub pid: u32,
    pub cwd: String,
}

/// Live view of a single pane at restore time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneState {
    pub pid: u32,
    pub foreground_command: String,
}

pub trait Multiplexer {
    fn list_panes(&self) -> Result<Vec<PaneInfo>>;

    /// `None` when the pane does not exist.
    fn describe_pane(&self, target: &str) -> Option<PaneState>;

    /// Clear the visible screen and the scrollback.
    fn clear_pane(&self, target: &str) -> Result<()>;

    /// Type `line` literally, then press Enter.
    fn send_line(&self, target: &str, line: &str) -> Result<()>;
}

/// [`Multiplexer`] backed by the `tmux` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TmuxMultiplexer;

impl Multiplexer for TmuxMultiplexer {
    fn list_panes(&self) -> Result<Vec<PaneInfo>> {
        let output = run_tmux(&["list-panes", "-a", "-F", LIST_PANES_FORMAT])?;
        Ok(parse_pane_list(&output))
    }

    fn describe_pane(&self, target: &str) -> Option<PaneState> {
        match run_tmux(&["display-message", "-p", "-t", target, DESCRIBE_PANE_FORMAT]) {
            Ok(output) => parse_pane_state(&output),
            Err(err) => {
                tracing::debug!(pane = %target, error = %err, "Pane lookup failed");
                None
            }
        }
    }

    fn clear_pane(&self, target: &str) -> Result<()> {
        run_tmux(&["send-keys", "-t", target, "C-l"])?;
        run_tmux(&["clear-history", "-t", target])?;
        Ok(())
    }

    fn send_line(&self, target: &str, line: &str) -> Result<()> {
        run_tmux(&["send-keys", "-t", target, "-l", line])?;
        run_tmux(&["send-keys", "-t", target, "Enter"])?;
        Ok(())
    }
}

fn run_tmux(args: &[&str]) -> Result<String> {
    let command = format!("tmux {}", args.first().copied().unwrap_or_default());
    let output = Command::new("tmux")
        .args(args)
        .output()
        .map_err(|err| ResurrectError::io(format!("spawn {command}"), err))?;

    if !output.status.success() {
        return Err(ResurrectError::CommandFailed {
            command,
            details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn parse_pane_list(output: &str) -> Vec<PaneInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let address = parts.next()?.trim();
            let pid = parts.next()?.trim().parse::<u32>().ok()?;
            let cwd = parts.next().unwrap_or_default();
            if address.is_empty() || pid == 0 {
                return None;
            }
            Some(PaneInfo {
                address: address.to_string(),
                pid,
                cwd: cwd.to_string(),
            })
        })
        .collect()
}

fn parse_pane_state(output: &str) -> Option<PaneState> {
    let line = output.lines().next()?;
    let (pid, command) = line.split_once('\t')?;
    Some(PaneState {
        pid: pid.trim().parse().ok().filter(|pid| *pid > 0)?,
        foreground_command: command.trim().to_string(),
    })
}

/// Whether `command` names an interactive shell; a leading `-` (login shell)
/// and any directory prefix are ignored.
pub fn is_shell(command: &str) -> bool {
    let command = command.trim();
    let command = command.strip_prefix('-').unwrap_or(command);
    let name = command.rsplit('/').next().unwrap_or(command);
    SHELLS.contains(&name)
}
