//! Plugins wired to the built-in tools, used by the end-to-end tests.
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::config::KernelConfig;
use crate::event::{EventBus, HandlerError, SubscriptionId};
use crate::kernel::Kernel;
use crate::kernel::catalog::Catalog;
use crate::plugin_system::{BootContext, Plugin, PluginArgs, PluginDescriptor, PluginError};
use crate::tools::{LoggerTool, StateTool, register_builtin};

/// Kernel over the built-in tools plus whatever `extra` registers.
pub fn builtin_kernel(config: KernelConfig, extra: impl FnOnce(&mut Catalog)) -> Kernel {
    let mut catalog = Catalog::new();
    register_builtin(&mut catalog);
    extra(&mut catalog);
    Kernel::new(config, catalog)
}

/// Answers `ping` requests with `{"pong": true, "seen": <payload n>}`.
pub struct Responder {
    bus: Arc<EventBus>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Responder {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new("diagnostics", "responder", |deps| {
            Ok(Arc::new(Responder {
                bus: deps.tool_typed::<EventBus>("event_bus")?,
                subscription: Mutex::new(None),
            }) as Arc<dyn Plugin>)
        })
        .requires("event_bus")
    }
}

#[async_trait]
impl Plugin for Responder {
    async fn on_boot(&self, _ctx: BootContext) -> Result<(), PluginError> {
        let bus = Arc::downgrade(&self.bus);
        let id = self.bus.subscribe("ping", move |envelope| {
            let bus = bus.clone();
            async move {
                if let Some(bus) = bus.upgrade() {
                    let seen = envelope.payload.get("n").cloned().unwrap_or(Value::Null);
                    bus.reply(&envelope, json!({"pong": true, "seen": seen}))?;
                }
                Ok::<(), HandlerError>(())
            }
        });
        *self.subscription.lock() = Some(id);
        Ok(())
    }

    async fn execute(&self, _args: PluginArgs) -> Result<Value, PluginError> {
        Ok(json!({"subscribed": self.subscription.lock().is_some()}))
    }

    async fn shutdown(&self) -> Result<(), PluginError> {
        if let Some(id) = self.subscription.lock().take() {
            self.bus.unsubscribe(id);
        }
        Ok(())
    }
}

/// Counts invocations in the state tool and logs each one.
pub struct Counter {
    state: Arc<StateTool>,
    logger: Option<Arc<LoggerTool>>,
}

impl Counter {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new("metrics", "counter", |deps| {
            Ok(Arc::new(Counter {
                state: deps.tool_typed::<StateTool>("state")?,
                logger: deps.optional_tool_typed::<LoggerTool>("logger")?,
            }) as Arc<dyn Plugin>)
        })
        .requires("state")
        .optionally("logger")
    }
}

#[async_trait]
impl Plugin for Counter {
    async fn execute(&self, args: PluginArgs) -> Result<Value, PluginError> {
        let key = args.get_str("key").unwrap_or("calls");
        let value = self.state.increment("counter", key, 1)?;
        if let Some(logger) = &self.logger {
            logger.info(&format!("counter {} is now {}", key, value));
        }
        Ok(json!({"key": key, "value": value}))
    }
}
