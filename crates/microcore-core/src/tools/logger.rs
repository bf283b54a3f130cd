use std::any::Any;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use serde_json::json;

use crate::event::EventBus;
use crate::kernel::constants::{EVENT_BUS_TOOL, LOGGER_TOOL, SYSTEM_LOG_EVENT};
use crate::kernel::container::{Container, ContainerError};
use crate::tool_system::{Tool, ToolError};

/// Log target used for every line written through the tool.
pub const LOG_TARGET: &str = "microcore::logger";

/// Logging tool for plugins. Lines go to the `log` facade and, once wired to
/// the event bus, are also published as `system.log` events.
#[derive(Default)]
pub struct LoggerTool {
    bus: ArcSwapOption<EventBus>,
}

impl LoggerTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{}", message);
        self.publish("INFO", message);
    }

    pub fn warning(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{}", message);
        self.publish("WARN", message);
    }

    pub fn error(&self, message: &str) {
        log::error!(target: LOG_TARGET, "{}", message);
        self.publish("ERROR", message);
    }

    /// Whether log lines are currently mirrored onto the bus.
    pub fn is_wired(&self) -> bool {
        self.bus.load().is_some()
    }

    fn publish(&self, level: &str, message: &str) {
        if let Some(bus) = self.bus.load_full() {
            let timestamp_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            bus.publish(
                SYSTEM_LOG_EVENT,
                json!({"level": level, "message": message, "timestamp_ms": timestamp_ms}),
            );
        }
    }
}

#[async_trait]
impl Tool for LoggerTool {
    fn name(&self) -> &str {
        LOGGER_TOOL
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        log::debug!("Logger tool initialized");
        Ok(())
    }

    async fn on_boot_complete(&self, container: &Container) -> Result<(), ToolError> {
        match container.get_typed::<EventBus>(EVENT_BUS_TOOL) {
            Ok(bus) => {
                self.bus.store(Some(bus));
                log::debug!("Logger connected to the event bus");
                Ok(())
            }
            Err(ContainerError::NotFound(_)) => {
                log::debug!("No event bus; logger stays local");
                Ok(())
            }
            Err(e) => Err(ToolError::Wiring(e.to_string())),
        }
    }

    fn interface_description(&self) -> String {
        "Logging tool (logger):\n\
         - info(message): general information.\n\
         - warning(message): warnings.\n\
         - error(message): errors.\n\
         Every line is also published on event_bus as 'system.log' {level, message, timestamp_ms}."
            .to_string()
    }

    async fn shutdown(&self) -> Result<(), ToolError> {
        self.bus.store(None);
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
