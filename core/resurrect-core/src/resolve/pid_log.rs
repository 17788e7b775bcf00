//! Lookup in the codex PID log.
//!
//! The log is append-only newline-delimited JSON owned by the tool:
//!
//! ```json
//! {"pid": 5150, "session": "0199a3…", "host": "laptop", "started_at": "2026-10-19T08:00:00Z"}
//! ```
//!
//! The newest line for a pid wins. Only the tail of the file is read so a
//! long-lived log cannot stall a save.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use fs_err as fs;
use serde::Deserialize;

/// Upper bound on bytes read from the end of the log.
pub const MAX_TAIL_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct PidLogLine {
    pid: PidField,
    session: String,
    #[serde(default)]
    host: Option<String>,
}

/// Writers disagree on whether the pid is a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PidField {
    Number(u64),
    Text(String),
}

impl PidField {
    fn matches(&self, pid: u32) -> bool {
        match self {
            PidField::Number(n) => *n == u64::from(pid),
            PidField::Text(s) => s.trim().parse::<u32>().ok() == Some(pid),
        }
    }
}

/// Most recent session recorded for `pid`, if any.
///
/// Lines naming a different host are ignored when the local host name is
/// known; lines without a host always count.
pub fn lookup(path: &Path, pid: u32, local_host: Option<&str>) -> Option<String> {
    let tail = read_tail(path, MAX_TAIL_BYTES)?;

    tail.lines().rev().find_map(|line| {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let entry: PidLogLine = serde_json::from_str(line).ok()?;
        if !entry.pid.matches(pid) || entry.session.trim().is_empty() {
            return None;
        }
        if let (Some(theirs), Some(ours)) = (entry.host.as_deref(), local_host) {
            if !theirs.is_empty() && theirs != ours {
                return None;
            }
        }
        Some(entry.session)
    })
}

fn read_tail(path: &Path, max_bytes: u64) -> Option<String> {
    let mut file = fs::File::open(path).ok()?;
    let len = file.metadata().ok()?.len();

    let skip_partial = len > max_bytes;
    if skip_partial {
        file.seek(SeekFrom::Start(len - max_bytes)).ok()?;
    }

    let mut bytes = Vec::with_capacity(len.min(max_bytes) as usize);
    file.take(max_bytes).read_to_end(&mut bytes).ok()?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if skip_partial {
        // The first line was cut by the seek.
        return Some(text.split_once('\n').map(|(_, rest)| rest.to_string()).unwrap_or_default());
    }
    Some(text)
}
