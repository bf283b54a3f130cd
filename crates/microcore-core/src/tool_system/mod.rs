//! # Microcore Tool System
//!
//! The capability contract every tool implements ([`Tool`]) and the error
//! type its hooks report ([`ToolError`]). Concrete tools live in
//! [`crate::tools`] or in external crates registered through the
//! [`Catalog`](crate::kernel::catalog::Catalog).
pub mod error;
pub mod traits;

pub use error::ToolError;
pub use traits::Tool;

/// Factory producing a fresh, not yet set up tool from the kernel config.
pub type ToolFactory =
    Box<dyn Fn(&crate::config::KernelConfig) -> Box<dyn Tool> + Send + Sync>;

// Test module declaration
#[cfg(test)]
mod tests;
