//! File logging for the hook. stdout and stderr belong to the assistant, so
//! when the log file cannot be opened the hook stays silent.

use std::path::Path;

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn init(log_file: &Path, debug: bool) -> Option<WorkerGuard> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let dir = log_file.parent()?;
    let file_name = log_file.file_name()?;
    if fs::create_dir_all(dir).is_err() {
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    Some(guard)
}
