//! # Microcore Kernel Errors
//!
//! Defines the umbrella [`Error`] returned by kernel operations and the
//! [`KernelLifecyclePhase`] a lifecycle error is attributed to. Subsystem
//! errors convert into it with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::event::error::EventSystemError;
use crate::kernel::container::ContainerError;
use crate::plugin_system::error::PluginError;
use crate::tool_system::ToolError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
    },

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    pub fn lifecycle(phase: KernelLifecyclePhase, message: impl Into<String>) -> Self {
        Error::KernelLifecycleError {
            phase,
            message: message.into(),
        }
    }
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Boot")]
    Boot,
    #[error("ToolBoot")]
    ToolBoot,
    #[error("PluginBoot")]
    PluginBoot,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
