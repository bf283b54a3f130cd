//! # Microcore Plugin System Errors
//!
//! [`PluginError`] is what plugin factories and plugin hooks return. The
//! kernel never lets it reach a caller verbatim, except for
//! [`PluginError::Rejected`], which carries a message meant for the caller.
use thiserror::Error;

use crate::event::error::EventSystemError;
use crate::tool_system::ToolError;

#[derive(Debug, Error)]
pub enum PluginError {
    /// Business-level refusal; its message is returned to the caller as is.
    #[error("{0}")]
    Rejected(String),

    #[error("missing dependency '{0}'")]
    MissingDependency(String),

    #[error("dependency '{name}' is not a {expected}")]
    DependencyType { name: String, expected: &'static str },

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Boot error: {0}")]
    Boot(String),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Event error: {0}")]
    Event(#[from] EventSystemError),
}

impl PluginError {
    pub fn rejected(message: impl Into<String>) -> Self {
        PluginError::Rejected(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        PluginError::Execution(message.into())
    }
}
