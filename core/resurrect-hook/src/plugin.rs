//! Explicit record/clear calls for tools whose integration is a plugin
//! rather than a stdin hook (opencode's plugin shells out to these).

use resurrect_core::{StateDocument, StateStore, Tool};

use crate::error::HookError;
use crate::handle::capture_env;

pub fn record(
    store: &StateStore,
    tool: Tool,
    pid: u32,
    session_id: &str,
    model: Option<String>,
    capture_vars: &[String],
) -> Result<(), HookError> {
    let session_id = session_id.trim();
    if session_id.is_empty() {
        tracing::debug!(tool = %tool, pid, "Ignoring record without session id");
        return Ok(());
    }

    let mut doc = StateDocument::new(tool, session_id, pid);
    if let Some(created_at) = store.get(tool, pid).and_then(|prev| prev.created_at) {
        doc.created_at = Some(created_at);
    }
    doc.model = model.filter(|model| !model.is_empty());
    doc.env = capture_env(|name| std::env::var(name).ok(), capture_vars);
    let path = store.put(tool, pid, &doc)?;
    tracing::info!(tool = %tool, pid, session = %session_id, path = %path.display(), "Recorded session");
    Ok(())
}

pub fn clear(store: &StateStore, tool: Tool, pid: u32) -> Result<(), HookError> {
    let removed = store.remove(tool, pid)?;
    tracing::info!(tool = %tool, pid, removed, "Cleared session");
    Ok(())
}
