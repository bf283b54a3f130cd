use std::collections::HashSet;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::KernelConfig;
use crate::kernel::catalog::Catalog;
use crate::kernel::container::Container;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::lifecycle::{KernelState, StateCell};
use crate::kernel::models::capture_models;
use crate::plugin_system::{
    BootContext, Plugin, PluginArgs, PluginDescriptor, PluginError, PluginResponse,
    resolve_dependencies,
};
use crate::registry::{HealthStatus, PluginInfo, PluginStatus, Registry};

/// Message returned for any plugin failure the caller must not see.
pub const INTERNAL_PLUGIN_ERROR: &str = "Internal plugin error";

/// What happened during [`Kernel::boot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    pub models_captured: usize,
    pub tools_ok: Vec<String>,
    /// `(tool, message)` for every tool whose setup failed.
    pub tools_failed: Vec<(String, String)>,
    /// Failed tools listed in `required_tools`.
    pub critical_failures: Vec<String>,
    /// `(tool, message)` for every tool whose second-stage hook failed.
    pub tools_degraded: Vec<(String, String)>,
    pub plugins_started: Vec<String>,
    /// `(plugin, error)` for plugins that could not be constructed.
    pub plugins_dead: Vec<(String, String)>,
    pub warnings: Vec<String>,
}

impl BootReport {
    /// Every tool and plugin came up.
    pub fn is_clean(&self) -> bool {
        self.tools_failed.is_empty()
            && self.tools_degraded.is_empty()
            && self.plugins_dead.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "tools: {} ok, {} failed, {} degraded; plugins: {} started, {} dead; {} warning(s)",
            self.tools_ok.len(),
            self.tools_failed.len(),
            self.tools_degraded.len(),
            self.plugins_started.len(),
            self.plugins_dead.len(),
            self.warnings.len()
        )
    }
}

/// What happened during [`Kernel::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tools shut down cleanly, in shutdown order.
    pub tools_stopped: Vec<String>,
    pub tool_failures: Vec<(String, String)>,
    pub plugin_failures: Vec<(String, String)>,
    /// Whether every plugin boot task finished within the shutdown timeout.
    pub boot_tasks_drained: bool,
}

struct PluginSlot {
    name: String,
    domain: String,
    /// `None` when the plugin could not be constructed.
    instance: Option<Arc<dyn Plugin>>,
}

/// Boot orchestrator: builds tools into the [`Container`], builds and boots
/// plugins, dispatches plugin calls and tears everything down again.
pub struct Kernel {
    config: KernelConfig,
    catalog: Catalog,
    container: Arc<Container>,
    plugins: RwLock<Vec<PluginSlot>>,
    state: StateCell,
    cancellation: CancellationToken,
    boot_tasks: TaskTracker,
}

impl Kernel {
    pub fn new(config: KernelConfig, catalog: Catalog) -> Self {
        Self {
            config,
            catalog,
            container: Arc::new(Container::new()),
            plugins: RwLock::new(Vec::new()),
            state: StateCell::new(),
            cancellation: CancellationToken::new(),
            boot_tasks: TaskTracker::new(),
        }
    }

    /// Boot every tool, wire them, then construct and launch every plugin.
    ///
    /// Individual failures never abort boot; they are recorded in the
    /// container, the registry and the returned report. Plugin `on_boot`
    /// hooks keep running in the background after this returns.
    pub async fn boot(&self) -> Result<BootReport> {
        self.state
            .transition(KernelState::NotBooted, KernelState::BootingTools)
            .map_err(|actual| {
                Error::lifecycle(
                    KernelLifecyclePhase::Boot,
                    format!("boot requires NotBooted, kernel is {}", actual),
                )
            })?;
        log::info!("Kernel booting");

        let mut report = BootReport::default();
        if let Some(root) = &self.config.domains_root {
            report.models_captured = capture_models(root, self.container.registry());
            log::info!("Captured {} model file(s) from {}", report.models_captured, root.display());
        }

        self.boot_tools(&mut report).await;
        self.wire_tools(&mut report).await;

        self.state.set(KernelState::BootingPlugins);
        self.boot_plugins(&mut report);

        self.state.set(KernelState::Ready);
        log::info!("Kernel ready ({})", report.summary());
        Ok(report)
    }

    async fn boot_tools(&self, report: &mut BootReport) {
        for entry in self.catalog.tools() {
            let built = std::panic::catch_unwind(AssertUnwindSafe(|| entry.build(&self.config)));
            let mut tool = match built {
                Ok(tool) => tool,
                Err(_) => {
                    let name = entry.name().to_string();
                    self.record_tool_failure(name, "factory panicked".to_string(), report);
                    continue;
                }
            };
            let name = tool.name().to_string();
            if name != entry.name() {
                log::warn!(
                    "Tool registered as '{}' calls itself '{}'; using '{}'",
                    entry.name(),
                    name,
                    name
                );
            }

            let outcome = AssertUnwindSafe(tool.setup()).catch_unwind().await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.message().to_string()),
                Err(_) => Some("setup panicked".to_string()),
            };

            match failure {
                None => {
                    self.container.register(Arc::from(tool));
                    self.container.set_health(&name, HealthStatus::Ok, None);
                    log::info!("Tool '{}' ready", name);
                    report.tools_ok.push(name);
                }
                Some(message) => self.record_tool_failure(name, message, report),
            }
        }
    }

    fn record_tool_failure(&self, name: String, message: String, report: &mut BootReport) {
        self.container
            .set_health(&name, HealthStatus::Fail, Some(message.clone()));
        if self.config.is_required_tool(&name) {
            log::error!("CRITICAL: required tool '{}' failed: {}", name, message);
            report.critical_failures.push(name.clone());
        } else {
            log::warn!("Optional tool '{}' failed: {}", name, message);
        }
        report.tools_failed.push((name, message));
    }

    async fn wire_tools(&self, report: &mut BootReport) {
        for tool in self.container.tools() {
            let name = tool.name().to_string();
            let outcome = AssertUnwindSafe(tool.on_boot_complete(&self.container))
                .catch_unwind()
                .await;
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.message().to_string(),
                Err(_) => "on_boot_complete panicked".to_string(),
            };
            log::warn!("Tool '{}' degraded: {}", name, failure);
            self.container
                .set_health(&name, HealthStatus::Degraded, Some(failure.clone()));
            report.tools_degraded.push((name, failure));
        }
    }

    fn boot_plugins(&self, report: &mut BootReport) {
        let mut seen = HashSet::new();
        let mut slots = Vec::new();

        for descriptor in self.catalog.plugins() {
            let name = descriptor.name();
            if !seen.insert(name.to_string()) {
                let warning = format!(
                    "Plugin '{}' of domain '{}' is already registered; skipping duplicate",
                    name,
                    descriptor.domain()
                );
                log::warn!("{}", warning);
                report.warnings.push(warning);
                continue;
            }

            let instance = self.start_plugin(descriptor, report);
            slots.push(PluginSlot {
                name: name.to_string(),
                domain: descriptor.domain().to_string(),
                instance,
            });
        }

        *self.plugins.write() = slots;
    }

    /// Resolve, construct and launch one plugin. Returns `None` if it is dead on arrival.
    fn start_plugin(
        &self,
        descriptor: &PluginDescriptor,
        report: &mut BootReport,
    ) -> Option<Arc<dyn Plugin>> {
        let name = descriptor.name();
        let registry = self.container.registry();
        registry.register_plugin(
            name,
            PluginInfo {
                dependencies: descriptor.dependency_names(),
                domain: descriptor.domain().to_string(),
                class_name: name.to_string(),
            },
        );

        let resolution = resolve_dependencies(descriptor.dependencies(), &self.container);
        for missing in &resolution.missing_optional {
            let warning = format!(
                "Plugin '{}': optional dependency '{}' is not available",
                name, missing
            );
            log::warn!("{}", warning);
            report.warnings.push(warning);
        }
        if !resolution.is_complete() {
            let error = format!(
                "missing dependency '{}'",
                resolution.missing_required.join("', '")
            );
            let warning = format!("Plugin '{}' not started: {}", name, error);
            log::warn!("{}", warning);
            report.warnings.push(warning);
            self.mark_dead(name, error, report);
            return None;
        }

        let built =
            std::panic::catch_unwind(AssertUnwindSafe(|| descriptor.build(&resolution.resolved)));
        let plugin = match built {
            Ok(Ok(plugin)) => plugin,
            Ok(Err(e)) => {
                log::error!("Plugin '{}' could not be constructed: {}", name, e);
                self.mark_dead(name, e.to_string(), report);
                return None;
            }
            Err(_) => {
                log::error!("Plugin '{}' factory panicked", name);
                self.mark_dead(name, "factory panicked".to_string(), report);
                return None;
            }
        };

        registry.update_plugin_status(name, PluginStatus::Running, None);
        report.plugins_started.push(name.to_string());
        log::info!("Plugin '{}' ({}) running", name, descriptor.domain());

        self.spawn_boot_task(name, Arc::clone(&plugin), Arc::clone(registry));
        Some(plugin)
    }

    fn mark_dead(&self, name: &str, error: String, report: &mut BootReport) {
        self.container
            .registry()
            .update_plugin_status(name, PluginStatus::Dead, Some(error.clone()));
        report.plugins_dead.push((name.to_string(), error));
    }

    fn spawn_boot_task(&self, name: &str, plugin: Arc<dyn Plugin>, registry: Arc<Registry>) {
        let ctx = BootContext::new(name, self.cancellation.child_token());
        let name = name.to_string();
        self.boot_tasks.spawn(async move {
            let outcome = AssertUnwindSafe(plugin.on_boot(ctx)).catch_unwind().await;
            match outcome {
                Ok(Ok(())) => {
                    registry.update_plugin_status(&name, PluginStatus::Ready, None);
                    log::debug!("Plugin '{}' ready", name);
                }
                Ok(Err(e)) => {
                    log::error!("Plugin '{}' failed to boot: {}", name, e);
                    registry.update_plugin_status(&name, PluginStatus::Dead, Some(e.to_string()));
                }
                Err(_) => {
                    log::error!("Plugin '{}' panicked while booting", name);
                    registry.update_plugin_status(
                        &name,
                        PluginStatus::Dead,
                        Some("on_boot panicked".to_string()),
                    );
                }
            }
        });
    }

    /// Invoke a plugin. Never fails: every outcome is a [`PluginResponse`], and
    /// internal error text is logged rather than returned.
    pub async fn run_plugin(&self, name: &str, args: PluginArgs) -> PluginResponse {
        if self.state() != KernelState::Ready {
            return PluginResponse::failure(format!("Kernel is not running ({})", self.state()));
        }

        let slot = self
            .plugins
            .read()
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.instance.clone());
        let Some(instance) = slot else {
            log::warn!("run_plugin: unknown plugin '{}'", name);
            return PluginResponse::failure(format!("Plugin '{}' not found", name));
        };

        let dead = self
            .registry()
            .get_system_dump()
            .plugin(name)
            .is_some_and(|record| record.status == PluginStatus::Dead);
        let plugin = match instance {
            Some(plugin) if !dead => plugin,
            _ => return PluginResponse::failure(format!("Plugin '{}' is unavailable", name)),
        };

        match AssertUnwindSafe(plugin.execute(args)).catch_unwind().await {
            Ok(Ok(data)) => PluginResponse::ok(data),
            Ok(Err(PluginError::Rejected(message))) => {
                log::debug!("Plugin '{}' rejected the call: {}", name, message);
                PluginResponse::failure(message)
            }
            Ok(Err(e)) => {
                log::error!("Plugin '{}' failed: {}", name, e);
                PluginResponse::failure(INTERNAL_PLUGIN_ERROR)
            }
            Err(_) => {
                log::error!("Plugin '{}' panicked during execute", name);
                PluginResponse::failure(INTERNAL_PLUGIN_ERROR)
            }
        }
    }

    /// Cancel plugin boot tasks, shut plugins down, then shut tools down in
    /// reverse registration order. Failures are isolated and reported.
    pub async fn shutdown(&self) -> Result<ShutdownReport> {
        self.state
            .transition(KernelState::Ready, KernelState::ShuttingDown)
            .map_err(|actual| {
                Error::lifecycle(
                    KernelLifecyclePhase::Shutdown,
                    format!("shutdown requires Ready, kernel is {}", actual),
                )
            })?;
        log::info!("Kernel shutting down");

        let mut report = ShutdownReport::default();
        let timeout = self.config.shutdown_timeout();
        self.cancellation.cancel();

        let plugins: Vec<(String, Arc<dyn Plugin>)> = self
            .plugins
            .read()
            .iter()
            .filter_map(|slot| slot.instance.clone().map(|p| (slot.name.clone(), p)))
            .collect();
        for (name, plugin) in plugins {
            match AssertUnwindSafe(plugin.shutdown()).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::warn!("Plugin '{}' shutdown failed: {}", name, e);
                    report.plugin_failures.push((name, e.to_string()));
                }
                Err(_) => {
                    log::warn!("Plugin '{}' panicked during shutdown", name);
                    report.plugin_failures.push((name, "shutdown panicked".to_string()));
                }
            }
        }

        self.boot_tasks.close();
        report.boot_tasks_drained = tokio::time::timeout(timeout, self.boot_tasks.wait())
            .await
            .is_ok();
        if !report.boot_tasks_drained {
            log::warn!(
                "{} plugin boot task(s) still running after {:?}",
                self.boot_tasks.len(),
                timeout
            );
        }

        for tool in self.container.tools().into_iter().rev() {
            let name = tool.name().to_string();
            let outcome =
                tokio::time::timeout(timeout, AssertUnwindSafe(tool.shutdown()).catch_unwind())
                    .await;
            let failure = match outcome {
                Ok(Ok(Ok(()))) => None,
                Ok(Ok(Err(e))) => Some(e.to_string()),
                Ok(Err(_)) => Some("shutdown panicked".to_string()),
                Err(_) => Some(format!("shutdown timed out after {:?}", timeout)),
            };
            match failure {
                None => {
                    log::info!("Tool '{}' closed", name);
                    report.tools_stopped.push(name);
                }
                Some(message) => {
                    log::error!("Error closing tool '{}': {}", name, message);
                    report.tool_failures.push((name, message));
                }
            }
        }

        self.state.set(KernelState::Stopped);
        log::info!("Kernel stopped");
        Ok(report)
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.container.registry()
    }

    pub fn state(&self) -> KernelState {
        self.state.get()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Plugins in the plugin table (including dead ones), registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.read().iter().map(|slot| slot.name.clone()).collect()
    }

    /// Domain each plugin in the table belongs to, as `(plugin, domain)`.
    pub fn plugin_domains(&self) -> Vec<(String, String)> {
        self.plugins
            .read()
            .iter()
            .map(|slot| (slot.name.clone(), slot.domain.clone()))
            .collect()
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("state", &self.state())
            .field("catalog", &self.catalog)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
