//! System module traits and error types
//!
//! Defines the chaincode interface carried by every system module descriptor and
//! the error taxonomy shared by the registry, the execution provider and the
//! lifecycle manager.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Executable system module
///
/// Implementations are statically linked into the peer. The lifecycle manager
/// only carries them into the in-process registry; the execution provider is
/// the one that actually calls `init` and `invoke`.
#[async_trait]
pub trait Chaincode: Send + Sync {
    /// Initialization entry point, called once per deployment with the
    /// descriptor's init arguments
    async fn init(&self, args: &[Vec<u8>]) -> Result<Vec<u8>, ModuleError>;

    /// Invocation entry point
    async fn invoke(&self, args: &[Vec<u8>]) -> Result<Vec<u8>, ModuleError>;
}

/// Outcome of a registration attempt
///
/// Neither a disabled module nor an already-bound one is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registration {
    /// Module is disabled by its static flag or by the whitelist; nothing was bound
    Disabled,
    /// Module code was bound into the registry by this call
    Bound,
    /// Registry already held a binding for the module's path
    AlreadyBound,
}

impl Registration {
    /// Whether the module is usable after this registration attempt
    pub fn is_registered(&self) -> bool {
        matches!(self, Registration::Bound | Registration::AlreadyBound)
    }
}

/// Errors reported by an in-process module registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("binding already exists for {0}")]
    AlreadyBound(String),

    #[error("could not bind {key}: {reason}")]
    BindFailed { key: String, reason: String },
}

/// Errors reported by an execution provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("no ledger context for channel {0}")]
    ContextUnavailable(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("init rejected with status {status}: {message}")]
    InitRejected { status: i32, message: String },

    #[error("stop failed: {0}")]
    StopFailed(String),
}

/// Errors raised while building or encoding a deployment spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecBuildError {
    #[error("invalid chaincode identity: {0}")]
    InvalidIdentity(String),

    #[error("could not encode deployment spec: {0}")]
    Encoding(String),
}

/// System module lifecycle errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("could not register system module {name} at {path}: {source}")]
    RegistrationFailed {
        name: String,
        path: String,
        #[source]
        source: RegistryError,
    },

    #[error("could not build deployment spec for {name}: {source}")]
    SpecBuildFailed {
        name: String,
        #[source]
        source: SpecBuildError,
    },

    #[error("deploying system module {name} on channel [{channel}] failed: {source}")]
    DeploymentFailed {
        name: String,
        channel: String,
        #[source]
        source: ProviderError,
    },

    #[error("stopping system module {name} on channel [{channel}] failed: {source}")]
    TeardownFailed {
        name: String,
        channel: String,
        #[source]
        source: ProviderError,
    },

    #[error("resolving ledger context for {name} on channel {channel} failed: {source}")]
    ContextResolution {
        name: String,
        channel: String,
        #[source]
        source: ProviderError,
    },

    #[error("duplicate system module name: {0}")]
    DuplicateName(String),

    #[error("invalid system module descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("system module not found: {0}")]
    ModuleNotFound(String),

    #[error("chaincode operation failed: {0}")]
    OperationError(String),
}
