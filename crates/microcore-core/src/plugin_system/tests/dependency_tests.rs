use std::sync::Arc;

use crate::kernel::container::Container;
use crate::plugin_system::dependency::{
    CONTAINER_DEPENDENCY, PluginDependency, resolve_dependencies,
};
use crate::plugin_system::error::PluginError;
use crate::tests::fixtures::{MockTool, call_log};
use crate::tool_system::Tool;

fn container_with(names: &[&str]) -> Arc<Container> {
    let calls = call_log();
    let container = Arc::new(Container::new());
    for name in names {
        container.register(Arc::new(MockTool::new(name, &calls)));
    }
    container
}

#[test]
fn test_dependency_constructors() {
    let required = PluginDependency::required("db");
    assert_eq!(required.name, "db");
    assert!(required.required);
    assert!(!required.is_container());
    assert_eq!(required.to_string(), "db");

    let optional = PluginDependency::optional("logger");
    assert!(!optional.required);
    assert_eq!(optional.to_string(), "logger (optional)");

    assert!(PluginDependency::required(CONTAINER_DEPENDENCY).is_container());
}

#[test]
fn test_resolution_binds_exact_names_only() {
    let container = container_with(&["db", "logger"]);
    let deps = vec![
        PluginDependency::required("db"),
        PluginDependency::required("DB"),
        PluginDependency::required("log"),
    ];

    let resolution = resolve_dependencies(&deps, &container);
    assert!(!resolution.is_complete());
    assert_eq!(resolution.missing_required, vec!["DB".to_string(), "log".to_string()]);
    assert!(resolution.resolved.has("db"));
    assert!(!resolution.resolved.has("log"), "never bound to a different tool");
    assert_eq!(resolution.resolved.len(), 1);
    assert_eq!(resolution.resolved.tool("db").unwrap().name(), "db");
}

#[test]
fn test_resolution_binds_container() {
    let container = container_with(&[]);
    let resolution =
        resolve_dependencies(&[PluginDependency::required(CONTAINER_DEPENDENCY)], &container);
    assert!(resolution.is_complete());
    let bound = resolution.resolved.container().unwrap();
    assert!(Arc::ptr_eq(&bound, &container));
    assert!(matches!(
        resolution.resolved.tool(CONTAINER_DEPENDENCY),
        Err(PluginError::DependencyType { .. })
    ));
}

#[test]
fn test_missing_optional_is_not_fatal() {
    let container = container_with(&["event_bus"]);
    let deps = vec![
        PluginDependency::required("event_bus"),
        PluginDependency::optional("logger"),
    ];
    let resolution = resolve_dependencies(&deps, &container);
    assert!(resolution.is_complete());
    assert_eq!(resolution.missing_optional, vec!["logger".to_string()]);
    assert!(resolution.resolved.optional_tool_typed::<MockTool>("logger").unwrap().is_none());
}

#[test]
fn test_typed_lookup() {
    let container = container_with(&["db"]);
    let resolution = resolve_dependencies(&[PluginDependency::required("db")], &container);

    let tool = resolution.resolved.tool_typed::<MockTool>("db").unwrap();
    assert_eq!(tool.name(), "db");
    assert!(resolution.resolved.optional_tool_typed::<MockTool>("db").unwrap().is_some());

    match resolution.resolved.tool("absent") {
        Err(PluginError::MissingDependency(name)) => assert_eq!(name, "absent"),
        other => panic!("unexpected: {:?}", other.map(|t| t.name().to_string())),
    }
    assert!(matches!(
        resolution.resolved.container(),
        Err(PluginError::MissingDependency(_))
    ));
}

#[tokio::test]
async fn test_typed_lookup_wrong_type() {
    let container = Arc::new(Container::new());
    container.register(Arc::new(crate::event::EventBus::new(1)));
    let resolution = resolve_dependencies(&[PluginDependency::required("event_bus")], &container);
    let err = resolution
        .resolved
        .tool_typed::<MockTool>("event_bus")
        .err()
        .unwrap();
    assert!(matches!(err, PluginError::DependencyType { ref name, .. } if name == "event_bus"));
}
