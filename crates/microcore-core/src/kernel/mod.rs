//! # Microcore Kernel
//!
//! The boot orchestrator and the containers it fills.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Boot orchestration**: [`Kernel`](bootstrap::Kernel) drives
//!   `NotBooted → BootingTools → BootingPlugins → Ready → ShuttingDown → Stopped`
//!   ([`KernelState`](lifecycle::KernelState)), isolating every tool and plugin
//!   failure, and exposes [`run_plugin`](bootstrap::Kernel::run_plugin).
//! - **Tool ownership**: [`Container`](container::Container) holds live tool
//!   instances, their health and the [`Registry`](crate::registry::Registry).
//! - **Static discovery**: [`Catalog`](catalog::Catalog) lists every tool
//!   factory and plugin descriptor the kernel may boot.
//! - **Model capture**: the `models` submodule stores domain model files as
//!   registry metadata.
//! - **Error Handling**: kernel [`Error`](error::Error) and `Result` alias.
pub mod bootstrap;
pub mod catalog;
pub mod constants;
pub mod container;
pub mod error;
pub mod lifecycle;
pub mod models;

pub use bootstrap::{BootReport, INTERNAL_PLUGIN_ERROR, Kernel, ShutdownReport};
pub use catalog::Catalog;
pub use container::{Container, ContainerError};
pub use error::{Error, KernelLifecyclePhase, Result};
pub use lifecycle::KernelState;

// Test module declaration
#[cfg(test)]
mod tests;
