use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::registry::{HealthRecord, HealthStatus, Registry};
use crate::tool_system::Tool;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Tool '{0}' does not exist")]
    NotFound(String),

    #[error("Tool '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

#[derive(Default)]
struct ContainerState {
    tools: HashMap<String, Arc<dyn Tool>>,
    health: HashMap<String, HealthRecord>,
    /// Every tool name seen, registered or only health-tracked, first-seen order.
    order: Vec<String>,
}

impl ContainerState {
    fn remember(&mut self, name: &str) {
        if !self.order.iter().any(|known| known == name) {
            self.order.push(name.to_string());
        }
    }
}

/// Thread-safe home of the live tool instances and owner of the [`Registry`].
///
/// The tool map and the health map share one lock; it is never held across
/// an `.await` or while calling into a tool.
pub struct Container {
    state: Mutex<ContainerState>,
    registry: Arc<Registry>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::new()))
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            state: Mutex::new(ContainerState::default()),
            registry,
        }
    }

    /// Insert or replace the tool under its own name. The last registration wins.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut state = self.state.lock();
        state.remember(&name);
        if state.tools.insert(name.clone(), tool).is_some() {
            log::debug!("Tool '{}' replaced", name);
        } else {
            log::debug!("Tool '{}' registered", name);
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, ContainerError> {
        self.state
            .lock()
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    /// Fetch a tool as its concrete type.
    pub fn get_typed<T: Tool>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let tool = self.get(name)?;
        tool.as_any_arc()
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.state.lock().tools.contains_key(name)
    }

    /// Names of every tool the container knows about, in the order they were
    /// first registered or first given a health record. A tool whose setup
    /// failed is listed but has no instance; use [`has`](Self::has) for that.
    pub fn list(&self) -> Vec<String> {
        self.state.lock().order.clone()
    }

    /// Live tool instances in registration order.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|name| state.tools.get(name).cloned())
            .collect()
    }

    /// Record the health of a tool and mirror it into the registry.
    ///
    /// The registry write happens under the container lock so concurrent
    /// updates land in both places in the same order.
    pub fn set_health(&self, name: &str, status: HealthStatus, message: Option<String>) {
        let mut state = self.state.lock();
        state.remember(name);
        state
            .health
            .insert(name.to_string(), HealthRecord::new(status, message.clone()));
        self.registry.register_tool(name, status, message);
    }

    /// Health of `name`, `{FAIL, "Not initialized"}` if never recorded.
    pub fn get_health(&self, name: &str) -> HealthRecord {
        self.state
            .lock()
            .health
            .get(name)
            .cloned()
            .unwrap_or_else(HealthRecord::not_initialized)
    }

    pub fn is_healthy(&self, name: &str) -> bool {
        self.get_health(name).is_ok()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Container")
            .field("tools", &state.order)
            .field("live", &state.tools.len())
            .finish()
    }
}
