use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::plugin_system::error::PluginError;
use crate::plugin_system::response::PluginArgs;

/// Handed to [`Plugin::on_boot`]. Long-running boot work should stop once
/// the token is cancelled, which happens at kernel shutdown.
#[derive(Debug, Clone)]
pub struct BootContext {
    plugin: String,
    cancellation: CancellationToken,
}

impl BootContext {
    pub fn new(plugin: &str, cancellation: CancellationToken) -> Self {
        Self {
            plugin: plugin.to_string(),
            cancellation,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once shutdown has begun.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}

/// A feature unit built by its descriptor's factory with its dependencies
/// already bound.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Runs on its own task after construction. It may loop until the
    /// context is cancelled; an error or panic marks the plugin `DEAD`.
    async fn on_boot(&self, _ctx: BootContext) -> Result<(), PluginError> {
        Ok(())
    }

    async fn execute(&self, args: PluginArgs) -> Result<Value, PluginError>;

    async fn shutdown(&self) -> Result<(), PluginError> {
        Ok(())
    }
}
