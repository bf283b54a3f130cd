//! `diagnostics` domain.
//!
//! - [`PingResponder`] answers `ping` requests on the event bus.
//! - [`SystemDumpPlugin`] returns the registry snapshot together with a trace
//!   of recent events.
//! - [`FailingPlugin`] always fails, to probe error translation end to end.
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use microcore_core::event::{SubscriptionId, WILDCARD};
use microcore_core::kernel::constants::EVENT_BUS_TOOL;
use microcore_core::plugin_system::CONTAINER_DEPENDENCY;
use microcore_core::{
    BootContext, Catalog, Container, EventBus, Plugin, PluginArgs, PluginDescriptor, PluginError,
};

pub const DOMAIN: &str = "diagnostics";
pub const PING_RESPONDER: &str = "ping_responder";
pub const SYSTEM_DUMP: &str = "system_dump";
pub const FAILING: &str = "failing";

/// Event the responder answers.
pub const PING_EVENT: &str = "ping";

/// How many events the system dump remembers.
pub const TRACE_CAPACITY: usize = 50;
const TRACE_PAYLOAD_CHARS: usize = 200;

pub struct PingResponder {
    bus: Arc<EventBus>,
    answered: Arc<AtomicU64>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl PingResponder {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            answered: Arc::new(AtomicU64::new(0)),
            subscription: Mutex::new(None),
        }
    }

    pub fn answered(&self) -> u64 {
        self.answered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Plugin for PingResponder {
    async fn on_boot(&self, _ctx: BootContext) -> Result<(), PluginError> {
        let bus = Arc::downgrade(&self.bus);
        let answered = Arc::clone(&self.answered);
        let id = self.bus.subscribe_sync(PING_EVENT, move |request| {
            let Some(bus) = bus.upgrade() else {
                return Ok(());
            };
            bus.reply(&request, json!({"pong": true, "echo": request.body()}))?;
            answered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        *self.subscription.lock() = Some(id);
        log::info!("Ping responder listening on '{}'", PING_EVENT);
        Ok(())
    }

    async fn execute(&self, _args: PluginArgs) -> Result<Value, PluginError> {
        Ok(json!({"answered": self.answered()}))
    }

    async fn shutdown(&self) -> Result<(), PluginError> {
        if let Some(id) = self.subscription.lock().take() {
            self.bus.unsubscribe(id);
        }
        Ok(())
    }
}

/// Returns the registry snapshot, plus the last [`TRACE_CAPACITY`] events
/// seen on the bus when one is available.
pub struct SystemDumpPlugin {
    container: Arc<Container>,
    bus: Option<Arc<EventBus>>,
    trace: Arc<Mutex<VecDeque<Value>>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl SystemDumpPlugin {
    pub fn new(container: Arc<Container>, bus: Option<Arc<EventBus>>) -> Self {
        Self {
            container,
            bus,
            trace: Arc::new(Mutex::new(VecDeque::with_capacity(TRACE_CAPACITY))),
            subscription: Mutex::new(None),
        }
    }

    /// Events traced so far, oldest first.
    pub fn trace(&self) -> Vec<Value> {
        self.trace.lock().iter().cloned().collect()
    }
}

fn truncate(payload: &Value) -> String {
    let text = payload.to_string();
    match text.char_indices().nth(TRACE_PAYLOAD_CHARS) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

#[async_trait]
impl Plugin for SystemDumpPlugin {
    async fn on_boot(&self, _ctx: BootContext) -> Result<(), PluginError> {
        let Some(bus) = &self.bus else {
            return Ok(());
        };
        let trace = Arc::clone(&self.trace);
        let id = bus.subscribe_sync(WILDCARD, move |envelope| {
            let mut trace = trace.lock();
            if trace.len() == TRACE_CAPACITY {
                trace.pop_front();
            }
            trace.push_back(json!({
                "event": envelope.event_name,
                "payload": truncate(&envelope.payload),
            }));
            Ok(())
        });
        *self.subscription.lock() = Some(id);
        Ok(())
    }

    async fn execute(&self, _args: PluginArgs) -> Result<Value, PluginError> {
        let mut dump = self.container.registry().get_system_dump().to_json();
        if let Value::Object(map) = &mut dump {
            map.insert("events".to_string(), Value::Array(self.trace()));
        }
        Ok(dump)
    }

    async fn shutdown(&self) -> Result<(), PluginError> {
        if let (Some(bus), Some(id)) = (&self.bus, self.subscription.lock().take()) {
            bus.unsubscribe(id);
        }
        Ok(())
    }
}

/// Fails every call with an internal error.
#[derive(Debug, Default)]
pub struct FailingPlugin;

#[async_trait]
impl Plugin for FailingPlugin {
    async fn execute(&self, args: PluginArgs) -> Result<Value, PluginError> {
        Err(PluginError::execution(format!(
            "simulated failure (args: {})",
            args.into_value()
        )))
    }
}

pub fn register(catalog: &mut Catalog) {
    catalog
        .register_plugin(
            PluginDescriptor::new(DOMAIN, PING_RESPONDER, |deps| {
                Ok(Arc::new(PingResponder::new(deps.tool_typed::<EventBus>(EVENT_BUS_TOOL)?))
                    as Arc<dyn Plugin>)
            })
            .requires(EVENT_BUS_TOOL),
        )
        .register_plugin(
            PluginDescriptor::new(DOMAIN, SYSTEM_DUMP, |deps| {
                Ok(Arc::new(SystemDumpPlugin::new(
                    deps.container()?,
                    deps.optional_tool_typed::<EventBus>(EVENT_BUS_TOOL)?,
                )) as Arc<dyn Plugin>)
            })
            .requires(CONTAINER_DEPENDENCY)
            .optionally(EVENT_BUS_TOOL),
        )
        .register_plugin(PluginDescriptor::new(DOMAIN, FAILING, |_| {
            Ok(Arc::new(FailingPlugin) as Arc<dyn Plugin>)
        }));
}
