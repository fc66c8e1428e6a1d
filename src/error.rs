//! Error types for the Gaea MCP service

use std::io;

use thiserror::Error;

/// Result type alias for the service
pub type Result<T> = std::result::Result<T, Error>;

/// Service-level errors. Every handler converts one of these into an
/// envelope failure at the boundary (§4.1) — nothing panics past this
/// point.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A path failed the sandbox safety gate
    #[error("path safety violation: {0}")]
    PathSafety(String),

    /// Graph validation failed outright (used only where validation itself
    /// cannot proceed, not for ordinary validator findings)
    #[error("validation error: {0}")]
    Validation(String),

    /// Job store error: missing job, store corruption, etc.
    #[error("job error: {0}")]
    Job(String),

    /// Subprocess orchestration error
    #[error("subprocess error: {0}")]
    Subprocess(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// No tool is registered under the requested name. Message format is
    /// fixed by the envelope contract (§4.1): `"Unknown tool: {name}"`.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl Error {
    /// Construct a `Config` variant from a displayable error.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}
