use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::config::EventBusConfig;
use crate::event::error::EventSystemError;
use crate::event::pool::{DEFAULT_WORKERS, WorkerPool};
use crate::event::{
    Envelope, EventHandler, EventMetadata, HandlerResult, SubscriptionId, WILDCARD,
    embed_metadata, event_handler, sync_event_handler,
};
use crate::tool_system::{Tool, ToolError};

type SubscriberMap = HashMap<String, Vec<Subscription>>;

struct Subscription {
    id: SubscriptionId,
    handler: EventHandler,
    /// Run on the publisher's task when the handler completes without waiting.
    inline: bool,
}

/// Default wait used by [`EventBus::request_default`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Publish/subscribe bus registered as the `event_bus` tool.
///
/// The subscriber map is locked only to add, remove or snapshot subscribers.
/// Callbacks run on the [`WorkerPool`] and never under the lock. The one
/// exception is the reply listener installed by [`request`](EventBus::request),
/// which is delivered on the publisher's task so a reply never waits for a
/// free worker.
pub struct EventBus {
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_id: AtomicU64,
    pool: WorkerPool,
    request_timeout: Duration,
}

impl EventBus {
    /// Create a bus dispatching on `workers` pool workers. Requires a Tokio runtime.
    pub fn new(workers: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            pool: WorkerPool::new(workers),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &EventBusConfig) -> Self {
        Self::new(config.workers).with_request_timeout(config.request_timeout())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Register a type-erased handler under `event_name` (`*` matches every event).
    pub fn subscribe_handler(&self, event_name: &str, handler: EventHandler) -> SubscriptionId {
        self.insert_subscription(event_name, handler, false)
    }

    fn insert_subscription(
        &self,
        event_name: &str,
        handler: EventHandler,
        inline: bool,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .entry(event_name.to_string())
            .or_default()
            .push(Subscription {
                id,
                handler,
                inline,
            });
        log::debug!("Subscribed handler {} to '{}'", id, event_name);
        id
    }

    /// Register an async closure under `event_name`.
    pub fn subscribe<F, Fut>(&self, event_name: &str, f: F) -> SubscriptionId
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.subscribe_handler(event_name, event_handler(f))
    }

    /// Register a synchronous closure under `event_name`.
    pub fn subscribe_sync<F>(&self, event_name: &str, f: F) -> SubscriptionId
    where
        F: Fn(Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_handler(event_name, sync_event_handler(f))
    }

    /// Like [`subscribe_handler`](Self::subscribe_handler), but the subscription
    /// is removed when the returned guard is dropped.
    pub fn subscribe_scoped(&self, event_name: &str, handler: EventHandler) -> SubscriptionGuard {
        self.scoped(event_name, handler, false)
    }

    fn scoped(&self, event_name: &str, handler: EventHandler, inline: bool) -> SubscriptionGuard {
        let id = self.insert_subscription(event_name, handler, inline);
        SubscriptionGuard {
            subscribers: Arc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Remove a subscription. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscription(&mut self.subscribers.lock(), id)
    }

    /// Fire-and-forget delivery to every subscriber of `event_name` and of `*`.
    ///
    /// The delivery set is snapshotted before anything runs. Returns the
    /// number of deliveries made, whether handed to the pool or completed
    /// inline.
    pub fn publish(&self, event_name: &str, payload: Value) -> usize {
        let envelope = Envelope::new(event_name, payload);
        let handlers: Vec<(EventHandler, bool)> = {
            let subscribers = self.subscribers.lock();
            let exact = subscribers.get(event_name).into_iter().flatten();
            let wildcard = if event_name == WILDCARD {
                None
            } else {
                subscribers.get(WILDCARD)
            };
            exact
                .chain(wildcard.into_iter().flatten())
                .map(|sub| (Arc::clone(&sub.handler), sub.inline))
                .collect()
        };

        let mut submitted = 0;
        for (handler, inline) in handlers {
            let job = if inline {
                let mut delivery = handler(envelope.clone());
                match (&mut delivery).now_or_never() {
                    Some(result) => {
                        if let Err(e) = result {
                            log::error!("Subscriber for '{}' failed: {}", event_name, e);
                        }
                        submitted += 1;
                        continue;
                    }
                    None => logged(event_name, delivery),
                }
            } else {
                let envelope = envelope.clone();
                logged(event_name, async move { handler(envelope).await }.boxed())
            };
            match self.pool.submit(job) {
                Ok(()) => submitted += 1,
                Err(e) => log::warn!("Dropping delivery of '{}': {}", event_name, e),
            }
        }
        submitted
    }

    /// Emulate a synchronous call: publish `payload` to `event_name` with a
    /// correlation id and reply topic embedded under `_metadata`, then wait up
    /// to `timeout` for the matching reply.
    ///
    /// The temporary reply subscription is gone when this returns, whatever the
    /// outcome, and also if the returned future is dropped early.
    ///
    /// Called from inside a subscriber, the waiting caller keeps its pool
    /// worker busy until the reply arrives. The reply itself is delivered on
    /// the responder's task, but the responder still needs a free worker: with
    /// every worker parked in a nested `request`, each of them times out.
    pub async fn request(
        &self,
        event_name: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Envelope, EventSystemError> {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let reply_to = reply_topic(event_name, &correlation_id);
        let (sender, receiver) = oneshot::channel::<Envelope>();
        let sender = Mutex::new(Some(sender));

        let expected = correlation_id.clone();
        let _guard = self.scoped(
            &reply_to,
            sync_event_handler(move |envelope| {
                if envelope.correlation_id().as_deref() == Some(expected.as_str()) {
                    if let Some(sender) = sender.lock().take() {
                        let _ = sender.send(envelope);
                    }
                }
                Ok(())
            }),
            true,
        );

        let metadata = EventMetadata {
            correlation_id,
            reply_to,
        };
        self.publish(event_name, embed_metadata(payload, &metadata));

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(EventSystemError::ReplyDropped {
                event_name: event_name.to_string(),
            }),
            Err(_) => Err(EventSystemError::RequestTimeout {
                event_name: event_name.to_string(),
                timeout,
            }),
        }
    }

    /// [`request`](Self::request) with the configured default timeout.
    pub async fn request_default(
        &self,
        event_name: &str,
        payload: Value,
    ) -> Result<Envelope, EventSystemError> {
        self.request(event_name, payload, self.request_timeout).await
    }

    /// Answer a request envelope by publishing `payload` to its reply topic
    /// with the same correlation id.
    pub fn reply(&self, request: &Envelope, payload: Value) -> Result<usize, EventSystemError> {
        let metadata = request
            .metadata()
            .ok_or_else(|| EventSystemError::NotARequest {
                event_name: request.event_name.clone(),
            })?;
        Ok(self.publish(&metadata.reply_to, embed_metadata(payload, &metadata)))
    }

    /// Number of live subscriptions registered under exactly `event_name`.
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers
            .lock()
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Event names with at least one subscriber, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.subscribers.lock().keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscriptions: usize = self.subscribers.lock().values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscriptions", &subscriptions)
            .field("pool", &self.pool)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl Tool for EventBus {
    fn name(&self) -> &str {
        "event_bus"
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        log::debug!("Event bus ready with {} workers", self.pool.size());
        Ok(())
    }

    fn interface_description(&self) -> String {
        format!(
            "Publish/subscribe event bus ({} workers). \
             subscribe(event, handler) where event '*' matches everything; \
             publish(event, payload) is fire-and-forget; \
             request(event, payload, timeout) waits for a reply correlated via \
             payload._metadata {{correlationId, replyTo}}; reply(request, payload).",
            self.pool.size()
        )
    }

    async fn shutdown(&self) -> Result<(), ToolError> {
        self.subscribers.lock().clear();
        self.pool.shutdown().await;
        log::debug!(
            "Event bus stopped after {} deliveries ({} panicked)",
            self.pool.completed(),
            self.pool.panicked()
        );
        Ok(())
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Removes its subscription from the bus when dropped.
#[must_use = "the subscription is removed as soon as the guard is dropped"]
pub struct SubscriptionGuard {
    subscribers: Weak<Mutex<SubscriberMap>>,
    id: SubscriptionId,
}

impl SubscriptionGuard {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard").field("id", &self.id).finish()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            remove_subscription(&mut subscribers.lock(), self.id);
        }
    }
}

fn logged(event_name: &str, delivery: BoxFuture<'static, HandlerResult>) -> BoxFuture<'static, ()> {
    let event_name = event_name.to_string();
    async move {
        if let Err(e) = delivery.await {
            log::error!("Subscriber for '{}' failed: {}", event_name, e);
        }
    }
    .boxed()
}

/// Name of the ephemeral topic a reply to `event_name` is published on.
pub fn reply_topic(event_name: &str, correlation_id: &str) -> String {
    format!("reply.{}.{}", event_name, correlation_id)
}

fn remove_subscription(subscribers: &mut SubscriberMap, id: SubscriptionId) -> bool {
    let mut emptied = None;
    let mut found = false;
    for (event_name, handlers) in subscribers.iter_mut() {
        if let Some(pos) = handlers.iter().position(|sub| sub.id == id) {
            handlers.remove(pos);
            found = true;
            if handlers.is_empty() {
                emptied = Some(event_name.clone());
            }
            break;
        }
    }
    if let Some(event_name) = emptied {
        subscribers.remove(&event_name);
    }
    found
}
