//! Configuration management for the system module lifecycle
//!
//! Handles configuration loading, validation, and the whitelist source consumed
//! by the whitelist policy.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Source of per-module whitelist settings
///
/// Read on every policy evaluation; implementations must not assume the caller
/// caches anything.
pub trait ConfigSource: Send + Sync {
    /// Raw whitelist value configured for a module name, if any
    fn system_module_setting(&self, name: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn system_module_setting(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Chaincode configuration (`[chaincode]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeConfig {
    /// System module whitelist (`[chaincode.system]`), module name -> setting
    #[serde(default)]
    pub system: HashMap<String, String>,
}

/// Deployment configuration (`[deployment]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Resolve a channel-scoped ledger context before running a module's init
    #[serde(default = "default_false")]
    pub channel_scoped_context: bool,

    /// Override for the version string shared by all system modules
    pub system_module_version: Option<String>,
}

/// Logging configuration (`[logging]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter, e.g. "info" or "peer_syscc=debug"; RUST_LOG takes precedence
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default = "default_false")]
    pub json_format: bool,
}

fn default_false() -> bool {
    false
}

/// Peer configuration relevant to system modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub chaincode: ChaincodeConfig,

    #[serde(default)]
    pub deployment: DeploymentConfig,

    pub logging: Option<LoggingConfig>,
}

impl NodeConfig {
    /// Load configuration from a TOML or JSON file (chosen by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let config: NodeConfig = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse JSON config {}", path.display()))?;
                config.validate()?;
                config
            }
            _ => Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse TOML config {}", path.display()))?,
        };

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: NodeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chaincode.system.keys().any(|k| k.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "chaincode.system contains an empty module name"
            ));
        }

        if let Some(ref version) = self.deployment.system_module_version {
            if version.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "deployment.system_module_version must not be empty when set"
                ));
            }
        }

        Ok(())
    }
}

impl ConfigSource for NodeConfig {
    fn system_module_setting(&self, name: &str) -> Option<String> {
        self.chaincode.system.get(name).cloned()
    }
}

/// Shared, runtime-mutable configuration handle
///
/// Operators can flip whitelist entries (or reload the whole file) while the
/// peer runs; the next policy evaluation sees the change.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<NodeConfig>>,
    source_path: Option<PathBuf>,
}

impl SharedConfig {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            source_path: None,
        }
    }

    /// Load from a file and remember the path for `reload_from_file`
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config = NodeConfig::from_file(&path)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(config)),
            source_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// Snapshot of the current configuration
    pub fn snapshot(&self) -> NodeConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Set the whitelist value for a module
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        debug!("Whitelist entry {} set to {:?}", name, value);
        self.write().chaincode.system.insert(name, value);
    }

    /// Remove the whitelist entry for a module
    pub fn remove(&self, name: &str) -> Option<String> {
        self.write().chaincode.system.remove(name)
    }

    /// Replace the whole configuration
    pub fn replace(&self, config: NodeConfig) {
        *self.write() = config;
    }

    /// Re-read the file this handle was loaded from
    ///
    /// On failure the previous configuration stays in place.
    pub fn reload_from_file(&self) -> anyhow::Result<()> {
        let path = self
            .source_path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("configuration was not loaded from a file"))?;

        match NodeConfig::from_file(path) {
            Ok(config) => {
                self.replace(config);
                info!("Reloaded configuration from {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Keeping previous configuration, reload failed: {:#}", e);
                Err(e)
            }
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, NodeConfig> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ConfigSource for SharedConfig {
    fn system_module_setting(&self, name: &str) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.system_module_setting(name),
            Err(poisoned) => poisoned.into_inner().system_module_setting(name),
        }
    }
}
