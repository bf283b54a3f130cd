use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::mpsc;

use crate::config::KernelConfig;
use crate::event::{EventBus, EventSystemError};
use crate::kernel::constants::SYSTEM_LOG_EVENT;
use crate::plugin_system::PluginArgs;
use crate::registry::PluginStatus;
use crate::tests::fixtures::wait_for_plugin_status;

use super::common::{Counter, Responder, builtin_kernel};

#[tokio::test]
async fn test_request_reaches_plugin_responder() {
    let kernel = builtin_kernel(KernelConfig::default(), |catalog| {
        catalog.register_plugin(Responder::descriptor());
    });
    kernel.boot().await.unwrap();
    wait_for_plugin_status(kernel.registry(), "responder", PluginStatus::Ready).await;
    let bus = kernel.container().get_typed::<EventBus>("event_bus").unwrap();

    let started = Instant::now();
    let reply = bus
        .request("ping", json!({"n": 42}), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(reply.payload["pong"], json!(true));
    assert_eq!(reply.payload["seen"], json!(42));

    kernel.shutdown().await.unwrap();
    assert_eq!(bus.subscriber_count("ping"), 0);
}

#[tokio::test]
async fn test_unanswered_request_times_out_without_leaking() {
    let kernel = builtin_kernel(KernelConfig::default(), |_| {});
    kernel.boot().await.unwrap();
    let bus = kernel.container().get_typed::<EventBus>("event_bus").unwrap();
    let topics_before = bus.topics();

    let timeout = Duration::from_millis(100);
    let started = Instant::now();
    let err = bus.request("nobody.home", json!({}), timeout).await.unwrap_err();
    assert!(matches!(err, EventSystemError::RequestTimeout { .. }));
    assert!(started.elapsed() >= timeout);
    assert_eq!(bus.topics(), topics_before);

    kernel.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wildcard_observer_sees_plugin_logging() {
    let kernel = builtin_kernel(KernelConfig::default(), |catalog| {
        catalog.register_plugin(Counter::descriptor());
    });
    kernel.boot().await.unwrap();
    wait_for_plugin_status(kernel.registry(), "counter", PluginStatus::Ready).await;
    let bus = kernel.container().get_typed::<EventBus>("event_bus").unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.subscribe_sync("*", move |envelope| {
        tx.send(envelope).map_err(|e| e.to_string().into())
    });

    let response = kernel
        .run_plugin("counter", PluginArgs::new().with("key", "visits"))
        .await;
    assert!(response.is_success());

    let envelope = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no event observed")
        .expect("channel closed");
    assert_eq!(envelope.event_name, SYSTEM_LOG_EVENT);
    assert_eq!(envelope.payload["level"], json!("INFO"));
    assert_eq!(envelope.payload["message"], json!("counter visits is now 1"));

    kernel.shutdown().await.unwrap();
}
