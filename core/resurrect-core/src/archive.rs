//! Pruning of the layout plugin's pane-contents archive.
//!
//! tmux-resurrect can capture each pane's visible text into
//! `pane_contents.tar.gz` and paint it back on restore. For a pane that is
//! about to be resumed that replay is noise: the assistant redraws itself.
//! After a save, the entries of panes that received a record are removed.
//!
//! ```text
//! pane_contents.tar.gz
//! └── ./pane_contents/
//!     ├── pane-work:1.0      # removed when work:1.0 has a record
//!     └── pane-notes:0.0
//! ```
//!
//! The archive format belongs to the plugin; it is unpacked and repacked with
//! the system `tar` so whatever it wrote round-trips unchanged.

use std::path::Path;
use std::process::Command;

use fs_err as fs;
use tempfile::NamedTempFile;

use crate::error::{ResurrectError, Result};
use crate::patterns::RE_PANE_ADDRESS;

const CONTENTS_DIR: &str = "pane_contents";

/// Remove the entries for `panes` from the archive at `archive`.
///
/// Returns the number of entries removed. A missing archive, an empty pane
/// list, or an archive holding none of the panes leaves the file untouched.
pub fn prune_pane_contents<'a>(
    archive: &Path,
    panes: impl IntoIterator<Item = &'a str>,
) -> Result<usize> {
    let targets: Vec<&str> = panes
        .into_iter()
        .filter(|pane| {
            let valid = is_safe_address(pane);
            if !valid {
                tracing::warn!(pane = %pane, "Not pruning pane with unexpected address");
            }
            valid
        })
        .collect();

    if targets.is_empty() || !archive.is_file() {
        return Ok(0);
    }

    let parent = archive.parent().unwrap_or_else(|| Path::new("."));
    let scratch = tempfile::Builder::new()
        .prefix(".pane-contents-")
        .tempdir_in(parent)
        .map_err(|err| ResurrectError::io("create scratch directory", err))?;

    run_tar(
        Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(scratch.path()),
    )?;

    let contents = scratch.path().join(CONTENTS_DIR);
    let mut removed = 0;
    for pane in &targets {
        let entry = contents.join(format!("pane-{pane}"));
        if entry.is_file() {
            fs::remove_file(&entry).map_err(|err| ResurrectError::io("remove pane entry", err))?;
            removed += 1;
        }
    }

    if removed == 0 {
        return Ok(0);
    }

    let mut members: Vec<String> = fs::read_dir(scratch.path())
        .map_err(|err| ResurrectError::io("list scratch directory", err))?
        .filter_map(|entry| entry.ok())
        .map(|entry| format!("./{}", entry.file_name().to_string_lossy()))
        .collect();
    members.sort();

    let packed = NamedTempFile::new_in(parent)
        .map_err(|err| ResurrectError::io("create temp archive", err))?;
    run_tar(
        Command::new("tar")
            .arg("-czf")
            .arg(packed.path())
            .arg("-C")
            .arg(scratch.path())
            .args(&members),
    )?;
    packed.persist(archive).map_err(|err| ResurrectError::Persist {
        path: archive.to_path_buf(),
        source: err,
    })?;

    tracing::info!(archive = %archive.display(), removed, "Pruned pane contents");
    Ok(removed)
}

/// A pane address becomes part of a path inside the scratch directory, so
/// only the `session:window.pane` shape without separators is accepted.
fn is_safe_address(pane: &str) -> bool {
    RE_PANE_ADDRESS.is_match(pane) && !pane.contains('/') && !pane.contains('\0')
}

fn run_tar(command: &mut Command) -> Result<()> {
    let output = command
        .output()
        .map_err(|err| ResurrectError::io("spawn tar", err))?;
    if !output.status.success() {
        return Err(ResurrectError::CommandFailed {
            command: "tar".to_string(),
            details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
