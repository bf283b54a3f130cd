use std::sync::Arc;

use serde_json::json;

use crate::config::KernelConfig;
use crate::kernel::catalog::Catalog;
use crate::kernel::{Kernel, KernelState};
use crate::plugin_system::PluginArgs;
use crate::registry::{HealthStatus, PluginStatus};
use crate::tests::fixtures::{EchoPlugin, call_log, register_mock_tool, wait_for_plugin_status};
use crate::plugin_system::{Plugin, PluginDescriptor};

use super::common::{Counter, builtin_kernel};

#[tokio::test]
async fn test_failed_tool_is_listed_but_plugin_on_healthy_tool_runs() {
    let calls = call_log();
    let mut catalog = Catalog::new();
    register_mock_tool(&mut catalog, "a", &calls, |tool| tool);
    register_mock_tool(&mut catalog, "b", &calls, |tool| tool.failing_setup("boom"));
    catalog.register_plugin(
        PluginDescriptor::new("core", "p", |_| Ok(Arc::new(EchoPlugin::default()) as Arc<dyn Plugin>))
            .requires("a"),
    );
    let kernel = Kernel::new(KernelConfig::default(), catalog);

    let report = kernel.boot().await.unwrap();

    let container = kernel.container();
    assert_eq!(container.list(), vec!["a".to_string(), "b".to_string()]);
    assert!(container.has("a"));
    assert!(!container.has("b"));
    let health = container.get_health("b");
    assert_eq!(health.status, HealthStatus::Fail);
    assert_eq!(health.message.as_deref(), Some("boom"));
    assert_eq!(report.tools_failed, vec![("b".to_string(), "boom".to_string())]);

    wait_for_plugin_status(kernel.registry(), "p", PluginStatus::Ready).await;
    let response = kernel.run_plugin("p", PluginArgs::new().with("x", 1)).await;
    assert!(response.is_success());
    assert_eq!(response.data, Some(json!({"echo": {"x": 1}})));

    kernel.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_builtin_stack_serves_plugin_calls_until_shutdown() {
    let kernel = builtin_kernel(KernelConfig::default(), |catalog| {
        catalog.register_plugin(Counter::descriptor());
    });
    let report = kernel.boot().await.unwrap();
    assert!(report.is_clean(), "{}", report.summary());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(kernel.state(), KernelState::Ready);

    wait_for_plugin_status(kernel.registry(), "counter", PluginStatus::Ready).await;
    let first = kernel.run_plugin("counter", PluginArgs::new()).await;
    let second = kernel.run_plugin("counter", PluginArgs::new()).await;
    assert_eq!(first.data, Some(json!({"key": "calls", "value": 1})));
    assert_eq!(second.data, Some(json!({"key": "calls", "value": 2})));

    let dump = kernel.registry().get_system_dump();
    let record = dump.plugin("counter").unwrap();
    assert_eq!(record.domain, "metrics");
    assert_eq!(record.dependencies, vec!["state".to_string(), "logger".to_string()]);

    let shutdown = kernel.shutdown().await.unwrap();
    assert!(shutdown.boot_tasks_drained);
    assert_eq!(
        shutdown.tools_stopped,
        vec!["context_manager", "config", "registry", "state", "logger", "event_bus"]
    );
    assert_eq!(kernel.state(), KernelState::Stopped);

    let late = kernel.run_plugin("counter", PluginArgs::new()).await;
    assert!(!late.is_success());
    assert!(late.error.unwrap().starts_with("Kernel is not running"));
}
