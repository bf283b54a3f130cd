//! # Microcore Event System
//!
//! Lateral communication between booted tools and plugins.
//!
//! - [`bus`]: the [`EventBus`] tool. Fire-and-forget [`publish`](EventBus::publish)
//!   with `*` wildcard subscribers, and [`request`](EventBus::request), which
//!   emulates a synchronous call over pub/sub using a correlation id and an
//!   ephemeral reply topic.
//! - [`pool`]: the fixed-size [`WorkerPool`] every delivery runs on.
//! - [`error`]: [`EventSystemError`].
//!
//! Subscribers receive an [`Envelope`] carrying the event name and the
//! loosely-typed JSON payload. Request metadata travels inside the payload
//! under [`METADATA_KEY`].
pub mod bus;
pub mod error;
pub mod pool;

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subscription name matching every published event.
pub const WILDCARD: &str = "*";

/// Payload key under which request metadata is embedded.
pub const METADATA_KEY: &str = "_metadata";

/// Identifier returned by `subscribe`, used to unsubscribe.
pub type SubscriptionId = u64;

/// Error a subscriber may return; it is logged and goes no further.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single subscriber invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// Type-erased subscriber callback.
pub type EventHandler = Arc<dyn Fn(Envelope) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// What a subscriber receives for every delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub event_name: String,
    pub payload: Value,
}

/// Request/reply routing data embedded into a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub correlation_id: String,
    pub reply_to: String,
}

impl Envelope {
    pub fn new(event_name: impl Into<String>, payload: Value) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
        }
    }

    /// Request metadata, if this envelope carries any.
    pub fn metadata(&self) -> Option<EventMetadata> {
        self.payload
            .get(METADATA_KEY)
            .and_then(|meta| serde_json::from_value(meta.clone()).ok())
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.metadata().map(|meta| meta.correlation_id)
    }

    pub fn reply_to(&self) -> Option<String> {
        self.metadata().map(|meta| meta.reply_to)
    }

    /// Payload with the request metadata stripped off.
    pub fn body(&self) -> Value {
        match &self.payload {
            Value::Object(map) => {
                let mut map = map.clone();
                map.remove(METADATA_KEY);
                Value::Object(map)
            }
            other => other.clone(),
        }
    }
}

/// Attach `metadata` to `payload`. Non-object payloads are wrapped as `{"data": payload}`.
pub fn embed_metadata(payload: Value, metadata: &EventMetadata) -> Value {
    let mut map = match payload {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert(
        METADATA_KEY.to_string(),
        serde_json::to_value(metadata).unwrap_or(Value::Null),
    );
    Value::Object(map)
}

/// Box an async closure into an [`EventHandler`].
pub fn event_handler<F, Fut>(f: F) -> EventHandler
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |envelope| f(envelope).boxed())
}

/// Helper to create synchronous handlers that are compatible with the async bus
pub fn sync_event_handler<F>(f: F) -> EventHandler
where
    F: Fn(Envelope) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(move |envelope| future::ready(f(envelope)).boxed())
}

pub use bus::{EventBus, SubscriptionGuard};
pub use error::EventSystemError;
pub use pool::WorkerPool;

// Test module declaration
#[cfg(test)]
mod tests;
