use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::registry::types::{
    DomainMetadata, HealthRecord, HealthStatus, PluginInfo, PluginRecord, PluginStatus,
    SystemSnapshot,
};

/// Copy-on-write observability store.
///
/// Readers load the current [`SystemSnapshot`] without taking any lock and
/// always see a fully-formed version. Writers serialize on a single mutex,
/// build the next version from the current one and swap it in atomically.
pub struct Registry {
    current: ArcSwap<SystemSnapshot>,
    write_lock: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(SystemSnapshot::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Apply `mutate` to a private copy of the current state and publish it.
    fn write<R>(&self, mutate: impl FnOnce(&mut SystemSnapshot) -> R) -> R {
        let _guard = self.write_lock.lock();
        let mut next = SystemSnapshot::clone(&self.current.load());
        let result = mutate(&mut next);
        self.current.store(Arc::new(next));
        result
    }

    /// Record (or overwrite) the health of a tool.
    pub fn register_tool(&self, name: &str, status: HealthStatus, message: Option<String>) {
        self.write(|state| {
            Arc::make_mut(&mut state.tools)
                .insert(name.to_string(), HealthRecord::new(status, message));
        });
    }

    /// Attach `value` under `key` in the metadata of `domain`.
    pub fn register_domain_metadata(&self, domain: &str, key: &str, value: serde_json::Value) {
        self.write(|state| {
            Arc::make_mut(&mut state.domains)
                .entry(domain.to_string())
                .or_default()
                .insert(key.to_string(), value);
        });
    }

    /// Record a plugin. Whatever the caller knows, it starts out BOOTING with no error.
    pub fn register_plugin(&self, name: &str, info: PluginInfo) {
        self.write(|state| {
            Arc::make_mut(&mut state.plugins).insert(name.to_string(), PluginRecord::from(info));
        });
    }

    /// Move a plugin to `status`. Returns `false` if the plugin was never registered.
    pub fn update_plugin_status(
        &self,
        name: &str,
        status: PluginStatus,
        error: Option<String>,
    ) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.current.load_full();
        if !current.plugins.contains_key(name) {
            log::warn!("Status update for unregistered plugin '{}' ignored", name);
            return false;
        }
        let mut next = SystemSnapshot::clone(&current);
        if let Some(record) = Arc::make_mut(&mut next.plugins).get_mut(name) {
            record.status = status;
            record.error = error;
        }
        self.current.store(Arc::new(next));
        true
    }

    /// Current snapshot. Never blocks on writers.
    pub fn get_system_dump(&self) -> Arc<SystemSnapshot> {
        self.current.load_full()
    }

    /// Domain metadata section of the current snapshot.
    pub fn get_domain_metadata(&self) -> Arc<DomainMetadata> {
        Arc::clone(&self.current.load().domains)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("Registry")
            .field("tools", &snapshot.tools.len())
            .field("domains", &snapshot.domains.len())
            .field("plugins", &snapshot.plugins.len())
            .finish()
    }
}
