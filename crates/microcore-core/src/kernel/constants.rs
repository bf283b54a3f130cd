/// Application name
pub const APP_NAME: &str = "microcore";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Built-in tool names.
pub const EVENT_BUS_TOOL: &str = "event_bus";
pub const LOGGER_TOOL: &str = "logger";
pub const STATE_TOOL: &str = "state";
pub const REGISTRY_TOOL: &str = "registry";
pub const CONFIG_TOOL: &str = "config";
pub const CONTEXT_MANAGER_TOOL: &str = "context_manager";

/// Event carrying every line written through the logger tool.
pub const SYSTEM_LOG_EVENT: &str = "system.log";

/// Event published by the health auditor after each pass.
pub const HEALTH_STATUS_EVENT: &str = "system.health_status";
