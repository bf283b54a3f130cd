//! # Microcore Registry
//!
//! Copy-on-write inventory of system health and metadata. Every component
//! may read it at any time; the kernel writes to it at boot transitions and
//! plugins such as health auditors read it periodically.
//!
//! - [`types`]: the records held in a [`SystemSnapshot`] (tool health,
//!   plugin status, domain metadata).
//! - [`store`]: the [`Registry`] itself, which hands out snapshots without
//!   locking and serializes writers behind a single mutex.
pub mod store;
pub mod types;

pub use store::Registry;
pub use types::{
    DomainMetadata, HealthRecord, HealthStatus, PluginInfo, PluginRecord, PluginStatus,
    SystemSnapshot,
};

// Test module declaration
#[cfg(test)]
mod tests;
