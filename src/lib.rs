//! Peer system chaincode lifecycle
//!
//! This crate is the control plane for system modules ("system chaincodes"):
//! privileged contracts compiled into the peer that provide built-in ledger
//! services. It decides which modules are enabled, binds their code into the
//! in-process registry, and deploys or tears down their instances per channel.
//!
//! ## Design Principles
//!
//! 1. **No hidden globals**: the module set, the registry and the execution
//!    provider are constructed once and passed in explicitly
//! 2. **Idempotent registration**: re-registering bound code is a success
//! 3. **Silent skip**: disabled modules are not errors
//! 4. **Fresh inputs**: every deploy/teardown rebuilds its spec; nothing is cached
//!
//! Contract execution, ledger storage and networking belong to the execution
//! provider and are not implemented here.

pub mod config;
pub mod module;
pub mod utils;

pub use config::{ConfigSource, NodeConfig, SharedConfig};
pub use module::{
    Chaincode, ModuleError, ModuleIdentity, Registration, SystemModuleDescriptor,
    SystemModuleManager, SystemModuleSet,
};
