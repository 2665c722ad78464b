/// Unified error type for the replay core.
///
/// Every public entry point either returns a record count or one of these
/// kinds with a descriptive message. Presentation (printing, exit codes)
/// belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Source file or configuration file absent. Never retried.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Malformed content for the detected format. Fails the whole parse.
    #[error("{0}")]
    Format(String),

    /// Job is missing a protocol-required field, or names an unsupported
    /// protocol. Raised before any I/O is attempted.
    #[error("{0}")]
    Validation(String),

    /// Transport-level failure, with target address context.
    #[error("failed to send to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReplayError {
    pub fn format_err(msg: impl Into<String>) -> Self {
        ReplayError::Format(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ReplayError::Validation(msg.into())
    }

    pub fn connection(target: impl Into<String>, source: std::io::Error) -> Self {
        ReplayError::Connection { target: target.into(), source }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        ReplayError::Format(e.to_string())
    }
}
