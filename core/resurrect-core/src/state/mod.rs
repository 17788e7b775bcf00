//! State documents written by native hooks.
//!
//! # Architecture: Sidecar Pattern
//!
//! The assistant's own hook (or plugin) is the only writer. It knows the
//! session id the moment one starts or switches, and records it under the
//! assistant's pid. The engine reads the document at save time.
//!
//! ```text
//! claude → hook → claude-<pid>.json → Session Resolver → assistant-sessions.json
//! (tool)  (writer)    (storage)          (reader)           (save output)
//! ```
//!
//! Documents outlive their process when the tool is killed without running
//! its shutdown hook; [`StateStore::reap_stale`] clears those by probing pid
//! liveness.

mod store;
mod types;

pub use store::{ReapStats, StateStore};
pub use types::{StateDocument, StateKey};
