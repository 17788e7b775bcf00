//! tmux-assistant-resurrect: save and restore assistant sessions in tmux panes.
//!
//! Wired into tmux-resurrect's hooks:
//!
//! ```text
//! set -g @resurrect-hook-post-save-all 'tmux-assistant-resurrect save'
//! set -g @resurrect-hook-post-restore-all 'tmux-assistant-resurrect restore'
//! ```
//!
//! ## Subcommands
//!
//! - `save`: Record the assistant session of every pane
//! - `restore`: Resume recorded sessions in their panes
//! - `reap`: Delete state documents whose process has exited
//! - `inspect`: Show what `save` would record, without writing

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use resurrect_core::{
    is_pid_alive, trim_log, RestoreCoordinator, SaveCoordinator, Settings, StateStore,
    StorageConfig, SystemProcessSource, TmuxMultiplexer,
};

#[derive(Parser)]
#[command(name = "tmux-assistant-resurrect")]
#[command(about = "Save and restore assistant CLI sessions across tmux restarts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the assistant session running in every pane
    Save {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resume recorded sessions in their panes
    Restore {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Pause between two restored panes, in milliseconds
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
    },

    /// Delete state documents whose owning process has exited
    Reap,

    /// Show per pane what a save would record, without writing anything
    Inspect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn log_file(&self, config: &StorageConfig) -> Option<PathBuf> {
        match self {
            Commands::Save { .. } => Some(config.save_log()),
            Commands::Restore { .. } => Some(config.restore_log()),
            Commands::Reap | Commands::Inspect { .. } => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorageConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tmux-assistant-resurrect: {err}");
            return ExitCode::FAILURE;
        }
    };
    let (settings, rejected) = Settings::from_env();

    let log_file = cli.command.log_file(&config);
    let guard = logging::init(log_file.as_deref(), settings.debug_log);
    for err in &rejected {
        tracing::warn!(error = %err, "Ignoring invalid setting, using its default");
    }

    let result = run(cli.command, config, &settings);
    if let Err(err) = &result {
        tracing::error!(error = %err, "tmux-assistant-resurrect failed");
    }

    // Flush before trimming so the lines of this run are counted.
    drop(guard);
    if let Some(path) = log_file {
        if let Err(err) = trim_log(&path, settings.log_max_lines) {
            eprintln!("tmux-assistant-resurrect: failed to trim {}: {err}", path.display());
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tmux-assistant-resurrect: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: StorageConfig, settings: &Settings) -> Result<(), String> {
    match command {
        Commands::Save { json } => {
            let report =
                SaveCoordinator::new(TmuxMultiplexer, SystemProcessSource, config, settings.clone())
                    .run()?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "saved {} session(s) from {} pane(s); {} unresolved; {} pane capture(s) pruned",
                    report.recorded, report.panes_scanned, report.unresolved, report.archive_pruned
                );
            }
        }
        Commands::Restore { json, delay_ms } => {
            let mut settings = settings.clone();
            if let Some(ms) = delay_ms {
                settings.restore_delay = Duration::from_millis(ms);
            }
            let report =
                RestoreCoordinator::new(TmuxMultiplexer, SystemProcessSource, config, settings)
                    .run()?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "restored {} pane(s), skipped {}",
                    report.restored.len(),
                    report.skipped.len()
                );
                for skipped in &report.skipped {
                    println!("  {}: {}", skipped.pane, skipped.reason);
                }
            }
        }
        Commands::Reap => {
            let stats = StateStore::new(config.state_dir()).reap_stale(is_pid_alive);
            tracing::info!(
                scanned = stats.scanned,
                removed = stats.removed,
                errors = stats.errors.len(),
                "Reaped state documents"
            );
            println!(
                "scanned {} state document(s), removed {}",
                stats.scanned, stats.removed
            );
            for error in &stats.errors {
                eprintln!("  {error}");
            }
        }
        Commands::Inspect { json } => {
            let panes =
                SaveCoordinator::new(TmuxMultiplexer, SystemProcessSource, config, settings.clone())
                    .inspect()?;
            if json {
                print_json(&panes)?;
            } else {
                for pane in &panes {
                    let Some(tool) = pane.tool else {
                        continue;
                    };
                    let session = match (&pane.session_id, pane.source) {
                        (Some(id), Some(source)) => format!("{id} (from {source})"),
                        _ => "unresolved".to_string(),
                    };
                    println!(
                        "{}\t{}\tpid {}\t{}",
                        pane.pane,
                        tool,
                        pane.pid.unwrap_or_default(),
                        session
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}
