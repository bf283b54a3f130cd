use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::kernel::container::Container;
use crate::plugin_system::error::PluginError;
use crate::tool_system::Tool;

/// Dependency name that binds the [`Container`] itself instead of a tool.
pub const CONTAINER_DEPENDENCY: &str = "container";

/// A tool (or the container) a plugin needs in order to be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDependency {
    /// Tool name, or [`CONTAINER_DEPENDENCY`].
    pub name: String,

    /// Whether the plugin can be built without it.
    pub required: bool,
}

impl PluginDependency {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
        }
    }

    pub fn is_container(&self) -> bool {
        self.name == CONTAINER_DEPENDENCY
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} (optional)", self.name)
        }
    }
}

/// A bound dependency value.
#[derive(Clone)]
pub enum Dependency {
    Container(Arc<Container>),
    Tool(Arc<dyn Tool>),
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Container(_) => f.write_str("Container"),
            Dependency::Tool(tool) => write!(f, "Tool({})", tool.name()),
        }
    }
}

/// Dependencies bound for one plugin, handed to its factory.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDependencies {
    bound: HashMap<String, Dependency>,
}

impl ResolvedDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, dependency: Dependency) {
        self.bound.insert(name.to_string(), dependency);
    }

    pub fn has(&self, name: &str) -> bool {
        self.bound.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn container(&self) -> Result<Arc<Container>, PluginError> {
        match self.bound.get(CONTAINER_DEPENDENCY) {
            Some(Dependency::Container(container)) => Ok(Arc::clone(container)),
            Some(Dependency::Tool(_)) => Err(PluginError::DependencyType {
                name: CONTAINER_DEPENDENCY.to_string(),
                expected: type_name::<Container>(),
            }),
            None => Err(PluginError::MissingDependency(CONTAINER_DEPENDENCY.to_string())),
        }
    }

    pub fn tool(&self, name: &str) -> Result<Arc<dyn Tool>, PluginError> {
        match self.bound.get(name) {
            Some(Dependency::Tool(tool)) => Ok(Arc::clone(tool)),
            Some(Dependency::Container(_)) => Err(PluginError::DependencyType {
                name: name.to_string(),
                expected: "tool",
            }),
            None => Err(PluginError::MissingDependency(name.to_string())),
        }
    }

    /// Bound tool as its concrete type.
    pub fn tool_typed<T: Tool>(&self, name: &str) -> Result<Arc<T>, PluginError> {
        self.tool(name)?
            .as_any_arc()
            .downcast::<T>()
            .map_err(|_| PluginError::DependencyType {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Like [`tool_typed`](Self::tool_typed), but an absent tool is `Ok(None)`.
    pub fn optional_tool_typed<T: Tool>(&self, name: &str) -> Result<Option<Arc<T>>, PluginError> {
        if self.has(name) {
            self.tool_typed(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Outcome of binding a dependency list against the container.
#[derive(Debug, Default)]
pub struct Resolution {
    pub resolved: ResolvedDependencies,
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty()
    }
}

/// Bind each dependency: `container` to the container itself, any other name
/// to the tool registered under exactly that name. Nothing else is ever bound.
pub fn resolve_dependencies(
    dependencies: &[PluginDependency],
    container: &Arc<Container>,
) -> Resolution {
    let mut resolution = Resolution::default();
    for dependency in dependencies {
        if dependency.is_container() {
            resolution.resolved.insert(
                CONTAINER_DEPENDENCY,
                Dependency::Container(Arc::clone(container)),
            );
            continue;
        }
        match container.get(&dependency.name) {
            Ok(tool) => resolution
                .resolved
                .insert(&dependency.name, Dependency::Tool(tool)),
            Err(_) => {
                if dependency.required {
                    resolution.missing_required.push(dependency.name.clone());
                } else {
                    resolution.missing_optional.push(dependency.name.clone());
                }
            }
        }
    }
    resolution
}
