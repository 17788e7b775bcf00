//! Locating the assistant process a hook belongs to.
//!
//! Hooks are spawned through `sh -c`, so the hook's parent is a throwaway
//! shell. State documents must be keyed by the assistant's own pid, which is
//! found by walking up from the parent.

use resurrect_core::{ProcessSnapshot, ProcessSource, SystemProcessSource, Tool};

/// Pid of the `tool` process this hook runs under, or `None` when no
/// ancestor is one. Documents are never keyed by the hook's own shell.
pub fn owner_pid(tool: Tool) -> Option<u32> {
    let parent = parent_pid()?;
    let snapshot = SystemProcessSource.snapshot();
    owner_in(&snapshot, parent, tool)
}

/// Same walk as the save path: nearest `tool` ancestor of `start`, narrowed
/// to the native binary when it sits behind a launcher.
pub fn owner_in(snapshot: &ProcessSnapshot, start: u32, tool: Tool) -> Option<u32> {
    let owner = snapshot.find_ancestor(start, tool).map(|process| process.pid);
    if owner.is_none() {
        tracing::debug!(start, tool = %tool, "No owning process among ancestors");
    }
    owner
}

fn parent_pid() -> Option<u32> {
    #[cfg(unix)]
    {
        // SAFETY: getppid() has no failure modes.
        #[allow(unsafe_code)]
        Some(unsafe { libc::getppid() } as u32)
    }
    #[cfg(not(unix))]
    {
        None
    }
}
