//! `observability` domain: the health auditor.
//!
//! [`HealthPlugin`] reads the registry snapshot every
//! `health.interval_secs`, classifies failing tools and plugins and publishes
//! the verdict as a `system.health_status` event until the kernel shuts down.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};

use microcore_core::config::HealthConfig;
use microcore_core::kernel::constants::{
    CONFIG_TOOL, EVENT_BUS_TOOL, HEALTH_STATUS_EVENT, LOGGER_TOOL, REGISTRY_TOOL,
};
use microcore_core::registry::{HealthStatus, SystemSnapshot};
use microcore_core::tools::{ConfigTool, LoggerTool, RegistryTool};
use microcore_core::{
    BootContext, Catalog, EventBus, Plugin, PluginArgs, PluginDescriptor, PluginError,
};

pub const DOMAIN: &str = "observability";
pub const PLUGIN_NAME: &str = "health_auditor";

/// Verdict of one audit pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemHealth {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub total_tools: usize,
    pub total_plugins: usize,
    pub failing_tools: Vec<String>,
    pub failing_plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Audit {
    pub status: SystemHealth,
    pub stats: AuditStats,
}

impl Audit {
    /// Tools not `OK` and plugins neither `RUNNING` nor `READY` make the system degraded.
    pub fn of(snapshot: &SystemSnapshot) -> Self {
        let failing_tools: Vec<String> = snapshot
            .tools
            .iter()
            .filter(|(_, record)| record.status != HealthStatus::Ok)
            .map(|(name, _)| name.clone())
            .collect();
        let failing_plugins: Vec<String> = snapshot
            .plugins
            .iter()
            .filter(|(_, record)| !record.status.is_alive())
            .map(|(name, _)| name.clone())
            .collect();
        let status = if failing_tools.is_empty() && failing_plugins.is_empty() {
            SystemHealth::Healthy
        } else {
            SystemHealth::Degraded
        };
        Self {
            status,
            stats: AuditStats {
                total_tools: snapshot.tools.len(),
                total_plugins: snapshot.plugins.len(),
                failing_tools,
                failing_plugins,
            },
        }
    }
}

pub struct HealthPlugin {
    registry: Arc<RegistryTool>,
    bus: Arc<EventBus>,
    logger: Option<Arc<LoggerTool>>,
    interval: Duration,
    last: Mutex<Option<Audit>>,
}

impl HealthPlugin {
    pub fn new(
        registry: Arc<RegistryTool>,
        bus: Arc<EventBus>,
        logger: Option<Arc<LoggerTool>>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            bus,
            logger,
            interval,
            last: Mutex::new(None),
        }
    }

    /// Run one audit and publish it. Returns the verdict.
    pub fn audit_once(&self) -> Result<Audit, PluginError> {
        let snapshot = self.registry.system_dump()?;
        let audit = Audit::of(&snapshot);
        self.bus.publish(HEALTH_STATUS_EVENT, serde_json::to_value(&audit).unwrap_or(Value::Null));
        if audit.status == SystemHealth::Degraded {
            let message = format!(
                "System health DEGRADED: tools {:?}, plugins {:?}",
                audit.stats.failing_tools, audit.stats.failing_plugins
            );
            match &self.logger {
                Some(logger) => logger.warning(&message),
                None => log::warn!("{}", message),
            }
        }
        *self.last.lock() = Some(audit.clone());
        Ok(audit)
    }

    /// Verdict of the most recent audit.
    pub fn last_audit(&self) -> Option<Audit> {
        self.last.lock().clone()
    }

    fn info(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.info(message),
            None => log::info!("{}", message),
        }
    }
}

#[async_trait]
impl Plugin for HealthPlugin {
    async fn on_boot(&self, ctx: BootContext) -> Result<(), PluginError> {
        self.info("HealthPlugin: monitoring system components");
        loop {
            if let Err(e) = self.audit_once() {
                log::error!("HealthPlugin: audit failed: {}", e);
            }
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        self.info("HealthPlugin: monitoring stopped");
        Ok(())
    }

    async fn execute(&self, _args: PluginArgs) -> Result<Value, PluginError> {
        let snapshot = self.registry.system_dump()?;
        Ok(json!({
            "audit": {
                "tools": snapshot.tools,
                "plugins": snapshot.plugins,
            },
            "last": self.last_audit(),
        }))
    }
}

pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(DOMAIN, PLUGIN_NAME, |deps| {
        let interval = match deps.optional_tool_typed::<ConfigTool>(CONFIG_TOOL)? {
            Some(config) => config.kernel_config().health.interval(),
            None => HealthConfig::default().interval(),
        };
        Ok(Arc::new(HealthPlugin::new(
            deps.tool_typed::<RegistryTool>(REGISTRY_TOOL)?,
            deps.tool_typed::<EventBus>(EVENT_BUS_TOOL)?,
            deps.optional_tool_typed::<LoggerTool>(LOGGER_TOOL)?,
            interval,
        )) as Arc<dyn Plugin>)
    })
    .requires(REGISTRY_TOOL)
    .requires(EVENT_BUS_TOOL)
    .optionally(LOGGER_TOOL)
    .optionally(CONFIG_TOOL)
}

pub fn register(catalog: &mut Catalog) {
    catalog.register_plugin(descriptor());
}
