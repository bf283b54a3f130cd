use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::KernelConfig;
use crate::kernel::constants::CONFIG_TOOL;
use crate::tool_system::{Tool, ToolError};

/// Configuration values for plugins: the kernel's `settings` over a snapshot
/// of the process environment taken at setup.
#[derive(Debug, Default)]
pub struct ConfigTool {
    kernel: KernelConfig,
    environment: HashMap<String, String>,
}

impl ConfigTool {
    pub fn new(kernel: KernelConfig) -> Self {
        Self {
            kernel,
            environment: HashMap::new(),
        }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.clone())
    }

    /// The configuration the kernel was started with.
    pub fn kernel_config(&self) -> &KernelConfig {
        &self.kernel
    }

    /// Setting `key`, falling back to the environment variable of that name.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.kernel
            .settings
            .get(key)
            .cloned()
            .or_else(|| self.environment.get(key).cloned().map(Value::String))
    }

    /// Like [`get`](Self::get), rendering non-string values as JSON text.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    /// Number of distinct keys visible.
    pub fn len(&self) -> usize {
        self.kernel.settings.len()
            + self
                .environment
                .keys()
                .filter(|key| !self.kernel.settings.contains_key(*key))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Tool for ConfigTool {
    fn name(&self) -> &str {
        CONFIG_TOOL
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        self.environment = std::env::vars().collect();
        log::debug!("Config tool exposes {} value(s)", self.len());
        Ok(())
    }

    fn interface_description(&self) -> String {
        "Configuration tool (config): get(key) returns the kernel setting of that name, \
         or the environment variable if no setting exists."
            .to_string()
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
