use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;

use crate::kernel::constants::REGISTRY_TOOL;
use crate::kernel::container::Container;
use crate::registry::{DomainMetadata, Registry, SystemSnapshot};
use crate::tool_system::{Tool, ToolError};

/// Read access to the container's registry for plugins, which only ever
/// see tools.
#[derive(Default)]
pub struct RegistryTool {
    registry: ArcSwapOption<Registry>,
}

impl RegistryTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> Result<Arc<Registry>, ToolError> {
        self.registry
            .load_full()
            .ok_or_else(|| ToolError::Other("registry tool is not wired yet".to_string()))
    }

    pub fn system_dump(&self) -> Result<Arc<SystemSnapshot>, ToolError> {
        Ok(self.registry()?.get_system_dump())
    }

    pub fn domain_metadata(&self) -> Result<Arc<DomainMetadata>, ToolError> {
        Ok(self.registry()?.get_domain_metadata())
    }
}

#[async_trait]
impl Tool for RegistryTool {
    fn name(&self) -> &str {
        REGISTRY_TOOL
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        Ok(())
    }

    async fn on_boot_complete(&self, container: &Container) -> Result<(), ToolError> {
        self.registry.store(Some(Arc::clone(container.registry())));
        Ok(())
    }

    fn interface_description(&self) -> String {
        "Registry tool (registry): system_dump() returns tool health, domain metadata and \
         plugin status; domain_metadata() returns {domain: {key: value}}."
            .to_string()
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
