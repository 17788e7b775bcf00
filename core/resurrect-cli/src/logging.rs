//! Tracing setup for one CLI run.
//!
//! `save` and `restore` append to their own log in the resurrect directory;
//! the interactive subcommands log to stderr.

use std::path::Path;

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Flushes the log file when dropped. Keep it alive for the whole run.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init(log_file: Option<&Path>, debug: bool) -> LoggingGuard {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (writer, guard) = match log_file.and_then(open_appender) {
        Some((non_blocking, guard)) => (BoxMakeWriter::new(non_blocking), Some(guard)),
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    LoggingGuard { _guard: guard }
}

fn open_appender(
    path: &Path,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent()?;
    let file_name = path.file_name()?;
    if let Err(err) = fs::create_dir_all(dir) {
        eprintln!("tmux-assistant-resurrect: cannot create log directory: {err}");
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
