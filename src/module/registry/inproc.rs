//! In-process module registry
//!
//! Maps a binding key (a system module's path) to its statically linked code.
//! The execution provider looks implementations up here when it launches a
//! system module.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::module::traits::{Chaincode, RegistryError};

/// Registry of runnable module implementations
pub trait ModuleRegistry: Send + Sync {
    /// Bind `key` to `implementation`
    ///
    /// Returns `RegistryError::AlreadyBound` when the key is taken, which callers
    /// may treat as success.
    fn bind(&self, key: &str, implementation: Arc<dyn Chaincode>) -> Result<(), RegistryError>;

    /// Look up the implementation bound to `key`
    fn lookup(&self, key: &str) -> Option<Arc<dyn Chaincode>>;
}

/// Thread-safe default registry
///
/// Concurrent binds of the same key are safe: exactly one wins, the rest see
/// `AlreadyBound`.
#[derive(Default)]
pub struct InProcessRegistry {
    bindings: RwLock<HashMap<String, Arc<dyn Chaincode>>>,
}

impl InProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.bindings.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .read()
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl ModuleRegistry for InProcessRegistry {
    fn bind(&self, key: &str, implementation: Arc<dyn Chaincode>) -> Result<(), RegistryError> {
        let mut bindings = self.bindings.write().map_err(|_| RegistryError::BindFailed {
            key: key.to_string(),
            reason: "registry lock poisoned".to_string(),
        })?;

        if bindings.contains_key(key) {
            return Err(RegistryError::AlreadyBound(key.to_string()));
        }

        bindings.insert(key.to_string(), implementation);
        debug!("Bound system module code at {}", key);
        Ok(())
    }

    fn lookup(&self, key: &str) -> Option<Arc<dyn Chaincode>> {
        self.bindings.read().ok()?.get(key).cloned()
    }
}
