//! resurrect-hook: records assistant session ids for tmux-assistant-resurrect.
//!
//! Configured in the assistant's own hook or plugin system, so the session
//! id is known the moment a session starts or switches:
//!
//! ```json
//! { "hooks": { "SessionStart": [{ "hooks": [{ "type": "command", "command": "resurrect-hook claude" }] }],
//!              "SessionEnd":   [{ "hooks": [{ "type": "command", "command": "resurrect-hook claude" }] }] } }
//! ```
//!
//! ## Subcommands
//!
//! - `claude`: claude hook handler, reads the event JSON from stdin
//! - `record`: Store a session id for a tool process (plugins)
//! - `clear`: Drop the stored session of a tool process (plugins)

mod error;
mod handle;
mod logging;
mod owner;
mod plugin;

use std::io::Read;

use clap::{Parser, Subcommand};
use resurrect_core::{trim_log, ResurrectError, Settings, StateStore, StorageConfig, Tool};

use crate::error::HookError;

#[derive(Parser)]
#[command(name = "resurrect-hook")]
#[command(about = "Records assistant session ids for tmux-assistant-resurrect")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a claude hook event (reads JSON from stdin)
    Claude,

    /// Record the current session of a tool process
    Record {
        #[arg(long)]
        tool: Tool,

        #[arg(long)]
        session_id: String,

        /// Tool process pid; defaults to the nearest ancestor running the tool
        #[arg(long)]
        pid: Option<u32>,

        #[arg(long)]
        model: Option<String>,
    },

    /// Forget the session of a tool process
    Clear {
        #[arg(long)]
        tool: Tool,

        /// Tool process pid; defaults to the nearest ancestor running the tool
        #[arg(long)]
        pid: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();
    let status = execute(
        cli.command,
        StorageConfig::from_env(),
        Settings::from_env(),
        std::io::stdin(),
    );
    if status != 0 {
        std::process::exit(status);
    }
}

/// Run one invocation and return the process exit status.
///
/// The claude hook runs inside the assistant: it exits 0 and writes nothing
/// to stdout or stderr whatever happens, including when paths cannot be
/// resolved. Problems end up in `hook.log` when it can be opened.
fn execute(
    command: Commands,
    config: resurrect_core::Result<StorageConfig>,
    (settings, rejected): (Settings, Vec<ResurrectError>),
    stdin: impl Read,
) -> i32 {
    let is_claude_hook = matches!(command, Commands::Claude);

    let config = match config {
        Ok(config) => config,
        Err(_) if is_claude_hook => return 0,
        Err(err) => {
            eprintln!("resurrect-hook: {err}");
            return 1;
        }
    };

    let store = StateStore::new(config.state_dir());
    let guard = match store.ensure_dir() {
        Ok(()) => logging::init(&config.hook_log(), settings.debug_log),
        Err(_) => None,
    };
    for err in &rejected {
        tracing::warn!(error = %err, "Ignoring invalid setting, using its default");
    }

    let result = run(command, &store, &settings, stdin);
    if let Err(err) = &result {
        tracing::error!(error = %err, "resurrect-hook failed");
    }

    drop(guard);
    let _ = trim_log(&config.hook_log(), settings.log_max_lines);

    if result.is_err() && !is_claude_hook {
        1
    } else {
        0
    }
}

fn run(
    command: Commands,
    store: &StateStore,
    settings: &Settings,
    stdin: impl Read,
) -> Result<(), HookError> {
    match command {
        Commands::Claude => {
            let Some(pid) = owner::owner_pid(Tool::Claude) else {
                tracing::warn!("Cannot determine owning claude process; skipping");
                return Ok(());
            };
            let action = handle::run(stdin, store, pid, &settings.capture_vars)?;
            tracing::debug!(pid, action = ?action, "Handled claude hook");
        }
        Commands::Record {
            tool,
            session_id,
            pid,
            model,
        } => {
            let Some(pid) = pid.or_else(|| owner::owner_pid(tool)) else {
                tracing::warn!(tool = %tool, "Cannot determine owning process; skipping");
                return Ok(());
            };
            plugin::record(store, tool, pid, &session_id, model, &settings.capture_vars)?;
        }
        Commands::Clear { tool, pid } => {
            let Some(pid) = pid.or_else(|| owner::owner_pid(tool)) else {
                tracing::warn!(tool = %tool, "Cannot determine owning process; skipping");
                return Ok(());
            };
            plugin::clear(store, tool, pid)?;
        }
    }
    Ok(())
}
