use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::container::Container;
use crate::tool_system::error::ToolError;

/// Capability provider owned by the [`Container`].
///
/// A tool is created once at boot, configured by [`setup`](Tool::setup)
/// while the kernel still owns it exclusively, and shared afterwards. Any
/// state it needs to change after registration (for example a handle to a
/// sibling tool obtained in [`on_boot_complete`](Tool::on_boot_complete))
/// must use interior mutability.
#[async_trait]
pub trait Tool: Any + Send + Sync {
    /// Unique name the tool is registered under (e.g. `event_bus`, `logger`).
    fn name(&self) -> &str;

    /// First-stage initialization. Failure marks the tool `FAIL` and it is
    /// not registered, but boot continues.
    async fn setup(&mut self) -> Result<(), ToolError>;

    /// Second-stage initialization, invoked once every tool has been set up.
    async fn on_boot_complete(&self, _container: &Container) -> Result<(), ToolError> {
        Ok(())
    }

    /// Human and machine readable summary of what the tool offers.
    fn interface_description(&self) -> String;

    async fn shutdown(&self) -> Result<(), ToolError> {
        Ok(())
    }

    /// Upcast used by [`Container::get_typed`] to hand out concrete types.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
