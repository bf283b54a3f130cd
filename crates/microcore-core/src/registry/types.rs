use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Health of a tool as seen by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Fail,
    Degraded,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Ok => write!(f, "OK"),
            HealthStatus::Fail => write!(f, "FAIL"),
            HealthStatus::Degraded => write!(f, "DEGRADED"),
        }
    }
}

/// `{status, message?}` for a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthRecord {
    pub fn new(status: HealthStatus, message: Option<String>) -> Self {
        Self { status, message }
    }

    pub fn ok() -> Self {
        Self::new(HealthStatus::Ok, None)
    }

    /// Record returned for tools the container has never heard of.
    pub fn not_initialized() -> Self {
        Self::new(HealthStatus::Fail, Some("Not initialized".to_string()))
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Lifecycle of a plugin from resolution to the end of its `on_boot` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PluginStatus {
    /// Recorded, dependencies resolved, not yet constructed.
    Booting,
    /// Constructed; `on_boot` is in flight.
    Running,
    /// `on_boot` returned successfully.
    Ready,
    /// Construction or `on_boot` failed.
    Dead,
}

impl PluginStatus {
    /// Whether the plugin can still be invoked.
    pub fn is_alive(&self) -> bool {
        matches!(self, PluginStatus::Running | PluginStatus::Ready)
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PluginStatus::Booting => "BOOTING",
            PluginStatus::Running => "RUNNING",
            PluginStatus::Ready => "READY",
            PluginStatus::Dead => "DEAD",
        };
        f.write_str(label)
    }
}

/// Static facts about a plugin supplied when it is first registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub dependencies: Vec<String>,
    pub domain: String,
    pub class_name: String,
}

/// Per-plugin entry in the system snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub dependencies: Vec<String>,
    pub domain: String,
    pub class_name: String,
    pub status: PluginStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PluginInfo> for PluginRecord {
    fn from(info: PluginInfo) -> Self {
        Self {
            dependencies: info.dependencies,
            domain: info.domain,
            class_name: info.class_name,
            status: PluginStatus::Booting,
            error: None,
        }
    }
}

/// `{domain: {key: value}}`
pub type DomainMetadata = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Immutable point-in-time view of the registry.
///
/// Each section sits behind its own `Arc`, so a write only copies the
/// section it touches while the other two are shared with the previous
/// version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub tools: Arc<BTreeMap<String, HealthRecord>>,
    pub domains: Arc<DomainMetadata>,
    pub plugins: Arc<BTreeMap<String, PluginRecord>>,
}

impl SystemSnapshot {
    pub fn tool(&self, name: &str) -> Option<&HealthRecord> {
        self.tools.get(name)
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginRecord> {
        self.plugins.get(name)
    }

    /// Serialize to a loosely-typed JSON value for callers that want a dump.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
