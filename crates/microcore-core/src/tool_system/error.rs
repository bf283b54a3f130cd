//! # Microcore Tool Errors
//!
//! Errors a tool may report from any of its lifecycle hooks. The kernel
//! never propagates them: setup failures become `FAIL` health, wiring
//! failures become `DEGRADED`, shutdown failures are logged.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("wiring failed: {0}")]
    Wiring(String),

    #[error("shutdown failed: {0}")]
    Shutdown(String),

    #[error("{0}")]
    Other(String),
}

impl ToolError {
    /// Message without the variant prefix, as stored in health records.
    pub fn message(&self) -> &str {
        match self {
            ToolError::Setup(msg)
            | ToolError::Wiring(msg)
            | ToolError::Shutdown(msg)
            | ToolError::Other(msg) => msg,
        }
    }
}
