use thiserror::Error;

/// Errors raised while planning or executing a synchronization run.
///
/// `Configuration` and `Match` are fatal and surface before any job runs.
/// `ToolInvocation` is recovered per job by the executor, which counts it and
/// moves on to the next job.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed or contradictory configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Source and destination directories cannot be paired
    #[error("matching error: {0}")]
    Match(String),

    /// An external tool could not be started or exited unsuccessfully
    #[error("{tool} failed: {message}")]
    ToolInvocation { tool: String, message: String },

    /// Internal consistency check failed
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Interactive input could not be read
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Configuration(message.into())
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::ToolInvocation {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
