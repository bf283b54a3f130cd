//! # Microcore Configuration
//!
//! [`KernelConfig`] holds every knob the kernel, the built-in tools and the
//! bundled plugins read. All fields have defaults, so an empty file (or no file
//! at all) yields a working kernel. Files are decoded according to their
//! extension, see [`ConfigFormat`].
pub mod error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::ConfigError;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn parse_error(&self, e: impl std::fmt::Display) -> ConfigError {
        ConfigError::Parse {
            format: self.extension().to_string(),
            message: e.to_string(),
        }
    }
}

/// Event bus sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Worker pool capacity.
    pub workers: usize,
    /// Default wait for `request_default`, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            request_timeout_ms: 5000,
        }
    }
}

impl EventBusConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Seconds between two registry audits.
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Top-level kernel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub event_bus: EventBusConfig,
    /// Tools whose setup failure is logged at error level instead of warning.
    /// Boot is never aborted because of them.
    pub required_tools: Vec<String>,
    /// Root scanned for `<domain>/models/**` files.
    pub domains_root: Option<PathBuf>,
    /// How long shutdown waits for plugin boot tasks after cancelling them.
    pub shutdown_timeout_ms: u64,
    pub health: HealthConfig,
    /// Free-form values exposed through the `config` tool.
    pub settings: BTreeMap<String, Value>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            event_bus: EventBusConfig::default(),
            required_tools: Vec::new(),
            domains_root: None,
            shutdown_timeout_ms: 5000,
            health: HealthConfig::default(),
            settings: BTreeMap::new(),
        }
    }
}

impl KernelConfig {
    /// Read and decode a configuration file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedFormat(
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("<none>")
                    .to_string(),
            )
        })?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&data, format)?;
        log::debug!("Loaded {} configuration from {}", format.extension(), path.display());
        Ok(config)
    }

    /// Decode configuration text in the given format.
    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| format.parse_error(e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                if data.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(data).map_err(|e| format.parse_error(e))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| format.parse_error(e)),
        }
    }

    pub fn is_required_tool(&self, name: &str) -> bool {
        self.required_tools.iter().any(|tool| tool == name)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Look up a free-form setting.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(Value::as_str)
    }
}
