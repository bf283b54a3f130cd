use std::any::Any;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::KernelConfig;
use crate::kernel::constants::{APP_NAME, CONTEXT_MANAGER_TOOL};
use crate::kernel::container::Container;
use crate::kernel::models::MODEL_KEY_PREFIX;
use crate::registry::HealthStatus;
use crate::tool_system::{Tool, ToolError};
use crate::utils::fs::write_creating_parents;

/// Setting naming the file the manifest is written to.
pub const MANIFEST_PATH_SETTING: &str = "manifest_path";

/// Renders a Markdown manifest of the running system (tool health, tool
/// interfaces and domain models) once every tool is wired.
#[derive(Debug, Default)]
pub struct ManifestTool {
    output: Option<PathBuf>,
    manifest: RwLock<String>,
}

impl ManifestTool {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            manifest: RwLock::new(String::new()),
        }
    }

    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(config.setting_str(MANIFEST_PATH_SETTING).map(PathBuf::from))
    }

    /// Last rendered manifest, empty before wiring.
    pub fn manifest(&self) -> String {
        self.manifest.read().clone()
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }

    /// Render the manifest for the current container contents.
    pub fn render(container: &Container) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {} system manifest\n", APP_NAME);
        out.push_str(
            "Plugins receive their tools as resolved dependencies and never talk to \
             the kernel directly.\n\n",
        );
        out.push_str("## Plugin rules\n\n");
        out.push_str("1. Declare every tool the plugin needs as a dependency.\n");
        out.push_str("2. Keep `on_boot` cancellable; long loops must watch the cancellation token.\n");
        out.push_str("3. Return `PluginError::Rejected` for bad input; other errors are hidden from callers.\n\n");

        out.push_str("## Tools\n\n");
        for name in container.list() {
            let health = container.get_health(&name);
            let _ = writeln!(out, "### {} ({})\n", name, health.status);
            if health.status != HealthStatus::Ok {
                let _ = writeln!(
                    out,
                    "> **Alert:** {}\n",
                    health.message.as_deref().unwrap_or("no details")
                );
            }
            if let Ok(tool) = container.get(&name) {
                let _ = writeln!(out, "```text\n{}\n```\n", tool.interface_description());
            }
        }

        let domains = container.registry().get_domain_metadata();
        let mut models: Vec<(String, String, String)> = domains
            .iter()
            .flat_map(|(domain, entries)| {
                entries
                    .iter()
                    .filter(|(key, _)| key.starts_with(MODEL_KEY_PREFIX))
                    .map(move |(key, value)| {
                        let body = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (domain.clone(), key.clone(), body)
                    })
            })
            .collect();
        models.sort();
        if !models.is_empty() {
            out.push_str("## Domain models\n\n");
            for (domain, key, body) in models {
                let _ = writeln!(out, "### {} / {}\n\n```text\n{}\n```\n", domain, key, body);
            }
        }
        out
    }
}

#[async_trait]
impl Tool for ManifestTool {
    fn name(&self) -> &str {
        CONTEXT_MANAGER_TOOL
    }

    async fn setup(&mut self) -> Result<(), ToolError> {
        Ok(())
    }

    async fn on_boot_complete(&self, container: &Container) -> Result<(), ToolError> {
        let rendered = Self::render(container);
        *self.manifest.write() = rendered.clone();
        if let Some(path) = &self.output {
            write_creating_parents(path, &rendered).map_err(|e| {
                ToolError::Wiring(format!("cannot write manifest to {}: {}", path.display(), e))
            })?;
            log::info!("System manifest written to {}", path.display());
        }
        Ok(())
    }

    fn interface_description(&self) -> String {
        "Context manager (context_manager): manifest() returns the Markdown system manifest \
         rendered after boot."
            .to_string()
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
