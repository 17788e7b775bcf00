use resurrect_core::ResurrectError;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Failed to parse hook input: {0}")]
    Parse(#[source] serde_json::Error),

    #[error(transparent)]
    Core(#[from] ResurrectError),
}
