//! # Microcore Plugin System
//!
//! Feature units and the contract the kernel uses to build and drive them.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] capability and the [`BootContext`] handed
//!   to its boot hook.
//! - **[`dependency`]**: typed dependency declarations ([`PluginDependency`])
//!   and their resolution against the container into
//!   [`ResolvedDependencies`].
//! - **[`descriptor`]**: [`PluginDescriptor`], the statically registered
//!   description of a plugin (domain, name, dependencies, factory).
//! - **[`response`]**: the argument bag ([`PluginArgs`]) and the structured
//!   [`PluginResponse`] returned by the kernel's resilient dispatch.
//! - **[`error`]**: [`PluginError`].
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod response;
pub mod traits;

pub use dependency::{
    CONTAINER_DEPENDENCY, Dependency, PluginDependency, Resolution, ResolvedDependencies,
    resolve_dependencies,
};
pub use descriptor::{PluginDescriptor, PluginFactory};
pub use error::PluginError;
pub use response::{PluginArgs, PluginResponse};
pub use traits::{BootContext, Plugin};

// Test module declaration
#[cfg(test)]
mod tests;
