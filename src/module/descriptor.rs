//! System module descriptors
//!
//! Static identity and policy for one system module. Descriptors are built once
//! at peer start and are read-only afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::module::traits::Chaincode;

/// Name and binding path of a chaincode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Unique name, also the on-ledger chaincode name
    pub name: String,
    /// Logical location; the registry binding key for system modules
    pub path: String,
}

impl ModuleIdentity {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.path)
    }
}

/// Metadata needed to register and deploy one system module
#[derive(Clone)]
pub struct SystemModuleDescriptor {
    /// Name and registry binding path
    pub identity: ModuleIdentity,
    /// Arguments passed to the module's `init` entry point, in order
    pub init_args: Vec<Vec<u8>>,
    /// The module code, shared with the registry once bound
    pub implementation: Arc<dyn Chaincode>,
    /// Whether proposals sent to this peer may invoke the module
    pub invokable_external: bool,
    /// Whether other chaincodes may invoke the module
    pub invokable_cc2cc: bool,
    /// Code-level switch, independent of the whitelist
    pub enabled: bool,
}

impl SystemModuleDescriptor {
    /// Create an enabled descriptor with no init args that is not invokable
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        implementation: Arc<dyn Chaincode>,
    ) -> Self {
        Self {
            identity: ModuleIdentity::new(name, path),
            init_args: Vec::new(),
            implementation,
            invokable_external: false,
            invokable_cc2cc: false,
            enabled: true,
        }
    }

    pub fn with_init_args(mut self, init_args: Vec<Vec<u8>>) -> Self {
        self.init_args = init_args;
        self
    }

    pub fn invokable_external(mut self, invokable: bool) -> Self {
        self.invokable_external = invokable;
        self
    }

    pub fn invokable_cc2cc(mut self, invokable: bool) -> Self {
        self.invokable_cc2cc = invokable;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn path(&self) -> &str {
        &self.identity.path
    }
}

impl fmt::Debug for SystemModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemModuleDescriptor")
            .field("name", &self.identity.name)
            .field("path", &self.identity.path)
            .field("init_args", &self.init_args.len())
            .field("invokable_external", &self.invokable_external)
            .field("invokable_cc2cc", &self.invokable_cc2cc)
            .field("enabled", &self.enabled)
            .finish()
    }
}
