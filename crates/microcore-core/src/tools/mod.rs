//! # Microcore Built-in Tools
//!
//! The tools every microcore deployment ships with, and
//! [`register_builtin`] which adds them to a [`Catalog`] in boot order:
//!
//! | name              | type               |
//! |-------------------|--------------------|
//! | `event_bus`       | [`EventBus`]       |
//! | `logger`          | [`LoggerTool`]     |
//! | `state`           | [`StateTool`]      |
//! | `registry`        | [`RegistryTool`]   |
//! | `config`          | [`ConfigTool`]     |
//! | `context_manager` | [`ManifestTool`]   |
pub mod config;
pub mod logger;
pub mod manifest;
pub mod registry_proxy;
pub mod state;

pub use config::ConfigTool;
pub use logger::LoggerTool;
pub use manifest::ManifestTool;
pub use registry_proxy::RegistryTool;
pub use state::StateTool;

use crate::event::EventBus;
use crate::kernel::catalog::Catalog;
use crate::kernel::constants::{
    CONFIG_TOOL, CONTEXT_MANAGER_TOOL, EVENT_BUS_TOOL, LOGGER_TOOL, REGISTRY_TOOL, STATE_TOOL,
};

/// Add the built-in tools to `catalog`. The event bus needs a Tokio runtime
/// when it is built.
pub fn register_builtin(catalog: &mut Catalog) {
    catalog
        .register_tool(EVENT_BUS_TOOL, |config| {
            Box::new(EventBus::from_config(&config.event_bus))
        })
        .register_tool(LOGGER_TOOL, |_| Box::new(LoggerTool::new()))
        .register_tool(STATE_TOOL, |_| Box::new(StateTool::new()))
        .register_tool(REGISTRY_TOOL, |_| Box::new(RegistryTool::new()))
        .register_tool(CONFIG_TOOL, |config| Box::new(ConfigTool::from_config(config)))
        .register_tool(CONTEXT_MANAGER_TOOL, |config| {
            Box::new(ManifestTool::from_config(config))
        });
}

#[cfg(test)]
mod tests;
