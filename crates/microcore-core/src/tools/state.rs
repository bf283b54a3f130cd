use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Number, Value};

use crate::kernel::constants::STATE_TOOL;
use crate::tool_system::{Tool, ToolError};

/// Namespace used by callers that do not pick one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Volatile key/value store shared by plugins, partitioned into namespaces.
#[derive(Debug, Default)]
pub struct StateTool {
    state: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl StateTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, namespace: &str, key: &str, value: Value) {
        self.state
            .lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.state
            .lock()
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned()
    }

    /// Add `amount` to a numeric value (absent counts as 0) and return the new value.
    pub fn increment(&self, namespace: &str, key: &str, amount: i64) -> Result<Value, ToolError> {
        let mut state = self.state.lock();
        let ns = state.entry(namespace.to_string()).or_default();
        let current = ns.get(key).cloned().unwrap_or(Value::from(0));
        let next = match &current {
            Value::Number(n) if n.is_i64() => n
                .as_i64()
                .and_then(|v| v.checked_add(amount))
                .map(Value::from)
                .ok_or_else(|| ToolError::Other(format!("Key '{}' would overflow", key)))?,
            Value::Number(n) => n
                .as_f64()
                .and_then(|v| Number::from_f64(v + amount as f64))
                .map(Value::Number)
                .ok_or_else(|| ToolError::Other(format!("Key '{}' is not numeric", key)))?,
            _ => return Err(ToolError::Other(format!("Key '{}' is not numeric", key))),
        };
        ns.insert(key.to_string(), next.clone());
        Ok(next)
    }

    /// Remove a key. Returns whether it existed.
    pub fn delete(&self, namespace: &str, key: &str) -> bool {
        self.state
            .lock()
            .get_mut(namespace)
            .is_some_and(|ns| ns.remove(key).is_some())
    }

    /// Number of keys in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.state.lock().get(namespace).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().values().all(HashMap::is_empty)
    }
}

#[async_trait]
impl Tool for StateTool {
    fn name(&self) -> &str {
        STATE_TOOL
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        Ok(())
    }

    fn interface_description(&self) -> String {
        "State tool (state):\n\
         - set(namespace, key, value): store a value.\n\
         - get(namespace, key): read a value.\n\
         - increment(namespace, key, amount): atomic add, fails on non-numeric values.\n\
         - delete(namespace, key): remove a key.\n\
         Data lives in memory and is cleared on shutdown."
            .to_string()
    }

    async fn shutdown(&self) -> Result<(), ToolError> {
        self.state.lock().clear();
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
