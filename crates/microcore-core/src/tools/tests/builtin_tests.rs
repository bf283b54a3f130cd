use serde_json::json;

use crate::config::KernelConfig;
use crate::event::EventBus;
use crate::kernel::Kernel;
use crate::kernel::catalog::Catalog;
use crate::registry::HealthStatus;
use crate::tool_system::Tool;
use crate::tools::{ConfigTool, LoggerTool, ManifestTool, RegistryTool, StateTool, register_builtin};

#[test]
fn test_register_builtin_order() {
    let mut catalog = Catalog::new();
    register_builtin(&mut catalog);
    assert_eq!(
        catalog.tool_names(),
        vec!["event_bus", "logger", "state", "registry", "config", "context_manager"]
    );
}

#[tokio::test]
async fn test_builtin_tools_boot_and_wire() {
    let mut catalog = Catalog::new();
    register_builtin(&mut catalog);
    let mut config = KernelConfig::default();
    config.settings.insert("greeting".to_string(), json!("hello"));
    let kernel = Kernel::new(config, catalog);

    let report = kernel.boot().await.unwrap();
    assert!(report.is_clean(), "{}", report.summary());

    let container = kernel.container();
    for name in ["event_bus", "logger", "state", "registry", "config", "context_manager"] {
        assert_eq!(container.get_health(name).status, HealthStatus::Ok, "{}", name);
    }
    assert!(container.get_typed::<EventBus>("event_bus").is_ok());
    assert!(container.get_typed::<LoggerTool>("logger").unwrap().is_wired());
    assert!(container.get_typed::<StateTool>("state").is_ok());

    let registry = container.get_typed::<RegistryTool>("registry").unwrap();
    let dump = registry.system_dump().unwrap();
    assert_eq!(dump.tool("state").unwrap().status, HealthStatus::Ok);

    let config = container.get_typed::<ConfigTool>("config").unwrap();
    assert_eq!(config.get("greeting"), Some(json!("hello")));

    let manifest = container.get_typed::<ManifestTool>("context_manager").unwrap();
    assert!(manifest.manifest().contains("### event_bus (OK)"));

    kernel.shutdown().await.unwrap();
}

#[test]
fn test_registry_tool_requires_wiring() {
    let tool = RegistryTool::new();
    assert!(tool.system_dump().is_err());
    assert!(tool.domain_metadata().is_err());
}

#[tokio::test]
async fn test_config_tool_settings_shadow_environment() {
    let (env_key, env_value) = std::env::vars().next().expect("process has an environment");
    let mut config = KernelConfig::default();
    config.settings.insert("retries".to_string(), json!(3));
    config.settings.insert("region".to_string(), json!("eu"));
    config.health.interval_secs = 7;
    let mut tool = ConfigTool::new(config);
    tool.setup().await.unwrap();

    assert_eq!(tool.get("retries"), Some(json!(3)));
    assert_eq!(tool.get_string("retries").as_deref(), Some("3"));
    assert_eq!(tool.get_string(&env_key), Some(env_value));
    assert_eq!(tool.get_or("surely_not_set_anywhere", "fallback"), "fallback");
    assert!(tool.len() >= 3);
    assert_eq!(tool.kernel_config().health.interval_secs, 7);
}
