use thiserror::Error;

/// Errors produced anywhere in the Gridview workspace.
///
/// The taxonomy is deliberately flat: every failure mode a caller may want
/// to branch on has its own variant. Nothing here is retried internally;
/// each error is returned to the immediate caller.
#[derive(Error, Debug)]
pub enum GridviewError {
    /// Bad column directives; fatal to sampler initialization.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Delta computation across incompatible field types; fatal to that
    /// sample call.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The remote view is unexpectedly absent (the peer may purge views
    /// out-of-band, e.g. when the monitored process restarts).
    #[error("View gone: {0}")]
    ViewGone(String),

    /// Network or HTTP failure, surfaced as-is.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A fault reported by the remote agent, formatted as "<code> <message>".
    #[error("{code} {message}")]
    Fault { code: i32, message: String },

    /// Unsupported argument kind, raised before any network I/O.
    #[error("Marshal error: {0}")]
    Marshal(String),

    /// Unknown parameter or sampler on the remote side.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The reply was well-formed but did not carry the requested kind.
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// A sampler lifecycle operation was invoked in the wrong state.
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// JSON encoding/decoding of the envelope failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridviewError>;
