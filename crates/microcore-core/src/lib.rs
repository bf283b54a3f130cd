//! # microcore-core
//!
//! A micro-kernel that boots a fixed set of capability providers (tools)
//! into a [`Container`], then boots domain plugins against them with
//! per-unit failure isolation.
//!
//! - [`kernel`]: the [`Kernel`] boot orchestrator, the [`Container`] and the
//!   static [`Catalog`] of units.
//! - [`tool_system`] and [`plugin_system`]: the [`Tool`] and [`Plugin`] contracts.
//! - [`registry`]: copy-on-write health and metadata inventory.
//! - [`event`]: the pub/sub [`EventBus`] with request/reply.
//! - [`tools`]: the built-in tools.
//! - [`config`]: [`KernelConfig`] loading.
pub mod config;
pub mod event;
pub mod kernel;
pub mod plugin_system;
pub mod registry;
pub mod tool_system;
pub mod tools;
pub mod utils;

pub use config::{ConfigError, KernelConfig};
pub use event::{Envelope, EventBus, EventSystemError};
pub use kernel::error::Error as KernelError;
pub use kernel::{BootReport, Catalog, Container, Kernel, KernelState, ShutdownReport};
pub use plugin_system::{
    BootContext, Plugin, PluginArgs, PluginDependency, PluginDescriptor, PluginError,
    PluginResponse, ResolvedDependencies,
};
pub use registry::{HealthStatus, PluginStatus, Registry, SystemSnapshot};
pub use tool_system::{Tool, ToolError};

#[cfg(test)]
mod tests;
