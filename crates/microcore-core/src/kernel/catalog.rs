use std::fmt;

use crate::config::KernelConfig;
use crate::plugin_system::PluginDescriptor;
use crate::tool_system::{Tool, ToolFactory};

/// A tool factory registered under a name.
pub struct ToolEntry {
    name: String,
    factory: ToolFactory,
}

impl ToolEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh, not yet set up instance.
    pub fn build(&self, config: &KernelConfig) -> Box<dyn Tool> {
        (self.factory)(config)
    }
}

/// Static registration table of every tool and plugin the kernel can boot.
///
/// Units add themselves through a `register(&mut Catalog)` function called
/// once at startup. Boot order is registration order.
#[derive(Default)]
pub struct Catalog {
    tools: Vec<ToolEntry>,
    plugins: Vec<PluginDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool factory. Registering a name twice replaces the earlier
    /// factory but keeps its position.
    pub fn register_tool<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&KernelConfig) -> Box<dyn Tool> + Send + Sync + 'static,
    {
        let entry = ToolEntry {
            name: name.to_string(),
            factory: Box::new(factory),
        };
        match self.tools.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => {
                log::warn!("Tool '{}' registered twice; the later factory wins", name);
                *existing = entry;
            }
            None => self.tools.push(entry),
        }
        self
    }

    pub fn register_plugin(&mut self, descriptor: PluginDescriptor) -> &mut Self {
        self.plugins.push(descriptor);
        self
    }

    pub fn tools(&self) -> &[ToolEntry] {
        &self.tools
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.plugins.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("tools", &self.tool_names())
            .field("plugins", &self.plugin_names())
            .finish()
    }
}
