use std::fmt;
use std::sync::Arc;

use crate::plugin_system::dependency::{PluginDependency, ResolvedDependencies};
use crate::plugin_system::error::PluginError;
use crate::plugin_system::traits::Plugin;

/// Builds a plugin from its bound dependencies.
pub type PluginFactory =
    Arc<dyn Fn(&ResolvedDependencies) -> Result<Arc<dyn Plugin>, PluginError> + Send + Sync>;

/// Static description of a plugin: where it belongs, what it needs and how
/// to build it. Registered in the [`Catalog`](crate::kernel::catalog::Catalog).
#[derive(Clone)]
pub struct PluginDescriptor {
    domain: String,
    name: String,
    dependencies: Vec<PluginDependency>,
    factory: PluginFactory,
}

impl PluginDescriptor {
    pub fn new<F>(domain: &str, name: &str, factory: F) -> Self
    where
        F: Fn(&ResolvedDependencies) -> Result<Arc<dyn Plugin>, PluginError> + Send + Sync + 'static,
    {
        Self {
            domain: domain.to_string(),
            name: name.to_string(),
            dependencies: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    pub fn with_dependency(mut self, dependency: PluginDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Shorthand for a required dependency.
    pub fn requires(self, name: &str) -> Self {
        self.with_dependency(PluginDependency::required(name))
    }

    /// Shorthand for an optional dependency.
    pub fn optionally(self, name: &str) -> Self {
        self.with_dependency(PluginDependency::optional(name))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[PluginDependency] {
        &self.dependencies
    }

    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|dep| dep.name.clone()).collect()
    }

    /// Run the factory.
    pub fn build(&self, dependencies: &ResolvedDependencies) -> Result<Arc<dyn Plugin>, PluginError> {
        (self.factory)(dependencies)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
