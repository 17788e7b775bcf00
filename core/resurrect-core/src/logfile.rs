//! Size control for the append-only diagnostic logs.

use std::path::Path;

use fs_err as fs;

use crate::error::{ResurrectError, Result};
use crate::record::write_file_atomic;

/// Keep only the last `max_lines` lines of the log at `path`.
///
/// Returns the number of lines dropped. A missing log is left alone.
pub fn trim_log(path: &Path, max_lines: usize) -> Result<usize> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(ResurrectError::io("read log", err)),
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return Ok(0);
    }

    let dropped = lines.len() - max_lines;
    if max_lines == 0 {
        fs::write(path, "").map_err(|err| ResurrectError::io("truncate log", err))?;
        return Ok(dropped);
    }
    let kept = lines[dropped..].join("\n");
    // write_file_atomic appends the final newline.
    write_file_atomic(path, kept.as_bytes())?;
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keeps_most_recent_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("assistant-save.log");
        let content: String = (1..=10).map(|n| format!("line {n}\n")).collect();
        std::fs::write(&path, content).unwrap();

        assert_eq!(trim_log(&path, 3).unwrap(), 7);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "line 8\nline 9\nline 10\n"
        );
        assert_eq!(trim_log(&path, 3).unwrap(), 0);
    }

    #[test]
    fn missing_log_is_ignored() {
        let tmp = tempdir().unwrap();
        assert_eq!(trim_log(&tmp.path().join("absent.log"), 5).unwrap(), 0);
    }

    #[test]
    fn zero_cap_empties_the_log() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("log");
        std::fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(trim_log(&path, 0).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
