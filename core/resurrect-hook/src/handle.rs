//! Event handler for claude hooks.
//!
//! Reads the hook JSON from stdin and keeps the state document for the
//! owning claude process current.
//!
//! ## Events
//!
//! ```text
//! SessionStart (startup | resume | clear | compact) → write document
//! SessionEnd                                        → remove document (same session only)
//! any other event carrying a session_id            → write if missing or different
//! ```

use std::collections::BTreeMap;
use std::io::Read;

use resurrect_core::{StateDocument, StateStore, Tool};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::HookError;

/// Document fields that a payload key must never overwrite.
const RESERVED_FIELDS: &[&str] = &[
    "tool",
    "session_id",
    "pid",
    "process_identity",
    "created_at",
    "model",
    "env",
];

#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookInput {
    fn session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// `model` arrives either as a plain id or as `{ "id": ..., "display_name": ... }`.
    fn model(&self) -> Option<String> {
        match self.model.as_ref()? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Written,
    Removed,
    Unchanged,
    Skipped,
}

/// Read the event from `reader` (stdin in production) and apply it for the
/// claude process `pid`.
pub fn run(
    mut reader: impl Read,
    store: &StateStore,
    pid: u32,
    capture_vars: &[String],
) -> Result<Action, HookError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(HookError::Stdin)?;

    if input.trim().is_empty() {
        return Ok(Action::Skipped);
    }

    let hook_input: HookInput = serde_json::from_str(&input).map_err(HookError::Parse)?;
    apply(hook_input, store, pid, |name| std::env::var(name).ok(), capture_vars)
}

pub fn apply(
    input: HookInput,
    store: &StateStore,
    pid: u32,
    env: impl Fn(&str) -> Option<String>,
    capture_vars: &[String],
) -> Result<Action, HookError> {
    let Some(session_id) = input.session_id().map(str::to_string) else {
        tracing::debug!(event = ?input.hook_event_name, "Skipping event (missing session_id)");
        return Ok(Action::Skipped);
    };
    let event = input.hook_event_name.as_deref().unwrap_or_default();

    match event {
        "SessionEnd" => {
            let current = store.get(Tool::Claude, pid);
            if current.is_some_and(|doc| doc.session_id != session_id) {
                tracing::debug!(pid, session = %session_id, "Ignoring end of a superseded session");
                return Ok(Action::Unchanged);
            }
            let removed = store.remove(Tool::Claude, pid)?;
            tracing::info!(pid, session = %session_id, removed, "Session ended");
            Ok(if removed { Action::Removed } else { Action::Unchanged })
        }
        "SessionStart" => {
            write(&input, store, pid, &session_id, env, capture_vars)?;
            tracing::info!(
                pid,
                session = %session_id,
                source = input.source.as_deref().unwrap_or("unknown"),
                "Session started"
            );
            Ok(Action::Written)
        }
        "" => Ok(Action::Skipped),
        other => {
            let current = store.get(Tool::Claude, pid);
            if current.is_some_and(|doc| doc.session_id == session_id) {
                return Ok(Action::Unchanged);
            }
            write(&input, store, pid, &session_id, env, capture_vars)?;
            tracing::info!(pid, session = %session_id, event = other, "Session switched");
            Ok(Action::Written)
        }
    }
}

fn write(
    input: &HookInput,
    store: &StateStore,
    pid: u32,
    session_id: &str,
    env: impl Fn(&str) -> Option<String>,
    capture_vars: &[String],
) -> Result<(), HookError> {
    let mut doc = StateDocument::new(Tool::Claude, session_id, pid);
    // A switch rewrites the document of the same process; it keeps its birth time.
    if let Some(created_at) = store.get(Tool::Claude, pid).and_then(|prev| prev.created_at) {
        doc.created_at = Some(created_at);
    }
    doc.model = input.model();
    doc.env = capture_env(env, capture_vars);
    doc.extra = input
        .extra
        .iter()
        .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if let Some(source) = &input.source {
        doc.extra.insert("source".to_string(), Value::String(source.clone()));
    }
    if let Some(event) = &input.hook_event_name {
        doc.extra
            .insert("hook_event_name".to_string(), Value::String(event.clone()));
    }

    store.put(Tool::Claude, pid, &doc)?;
    Ok(())
}

pub fn capture_env(
    env: impl Fn(&str) -> Option<String>,
    names: &[String],
) -> BTreeMap<String, String> {
    names
        .iter()
        .filter_map(|name| {
            env(name)
                .filter(|value| !value.is_empty())
                .map(|value| (name.clone(), value))
        })
        .collect()
}
