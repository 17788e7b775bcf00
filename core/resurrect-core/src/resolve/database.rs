//! Lookup in the opencode session database.
//!
//! opencode keeps its sessions in SQLite. The only columns read are
//! `session.id`, `session.directory` and `session.time_updated`. The file is
//! opened read-only; the tool may be writing to it at the same moment.
//!
//! Two opencode instances in the same directory cannot be told apart here:
//! both resolve to the most recently updated session.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::error::{ResurrectError, Result};

const BUSY_TIMEOUT: Duration = Duration::from_millis(500);

/// Most recently updated session whose directory is `cwd`.
pub fn lookup(db_path: &Path, cwd: &str) -> Option<String> {
    if cwd.is_empty() || !db_path.is_file() {
        return None;
    }

    match query_latest(db_path, cwd) {
        Ok(found) => found,
        Err(err) => {
            tracing::debug!(db = %db_path.display(), error = %err, "opencode database lookup failed");
            None
        }
    }
}

fn query_latest(db_path: &Path, cwd: &str) -> Result<Option<String>> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(db_path, flags).map_err(|source| {
        ResurrectError::Sqlite {
            context: "open opencode database".to_string(),
            source,
        }
    })?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|source| ResurrectError::Sqlite {
            context: "set busy timeout".to_string(),
            source,
        })?;

    let directory = normalize_dir(cwd);
    let id: Option<String> = conn
        .query_row(
            "SELECT id FROM session WHERE directory = ?1 OR directory = ?2 \
             ORDER BY time_updated DESC LIMIT 1",
            params![directory, format!("{directory}/")],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| ResurrectError::Sqlite {
            context: "query latest session".to_string(),
            source,
        })?;

    Ok(id.filter(|id| !id.trim().is_empty()))
}

fn normalize_dir(cwd: &str) -> &str {
    match cwd.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
