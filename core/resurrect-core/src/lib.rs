//! # resurrect-core
//!
//! Session-continuity engine for assistant CLIs (claude, opencode, codex)
//! running inside tmux panes. On save it records which pane runs which
//! assistant session; on restore it types the matching resume command back
//! into each pane.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. A save or restore is a short
//!   sequential pass over the panes.
//! - **Graceful degradation**: Missing or malformed external data reads as
//!   "not found". One pane's failure never stops the others.
//! - **Read-only towards tools**: The PID log and the opencode database are
//!   owned by the tools and are only ever read. The state directory is
//!   written by hooks, not by the engine.
//! - **Replaceable collaborators**: tmux and the process table sit behind
//!   [`Multiplexer`] and [`ProcessSource`] so both paths run against fakes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resurrect_core::{
//!     SaveCoordinator, Settings, StorageConfig, SystemProcessSource, TmuxMultiplexer,
//! };
//!
//! let config = StorageConfig::from_env()?;
//! let (settings, _rejected) = Settings::from_env();
//! let report = SaveCoordinator::new(TmuxMultiplexer, SystemProcessSource, config, settings).run()?;
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod escape;
pub mod logfile;
pub mod patterns;
pub mod process;
pub mod record;
pub mod resolve;
pub mod restore;
pub mod save;
pub mod state;
pub mod storage;
pub mod tmux;
pub mod tools;

pub use config::Settings;
pub use error::{ResurrectError, Result};
pub use escape::shell_quote;
pub use logfile::trim_log;
pub use process::{
    is_pid_alive, Detection, ProcessRecord, ProcessSnapshot, ProcessSource, SystemProcessSource,
};
pub use record::{SessionRecord, SessionsFile};
pub use resolve::{ResolvedSession, SessionResolver, SessionSource};
pub use restore::{RestoreCoordinator, RestoreReport, SkipReason, SkippedPane};
pub use save::{PaneInspection, SaveCoordinator, SaveReport};
pub use state::{ReapStats, StateDocument, StateKey, StateStore};
pub use storage::StorageConfig;
pub use tmux::{is_shell, Multiplexer, PaneInfo, PaneState, TmuxMultiplexer};
pub use tools::Tool;
