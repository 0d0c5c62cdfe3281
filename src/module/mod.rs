//! System module lifecycle for the peer
//!
//! System modules are privileged chaincodes compiled into the peer that provide
//! built-in ledger services (configuration, lifecycle, escrow, ...).
//!
//! ## Lifecycle
//!
//! - **Registration**: at peer start every enabled module's code is bound into the
//!   in-process registry. One broken module never blocks the others.
//! - **Deployment**: per channel, an enabled module is initialized through the
//!   execution provider from a freshly built deployment spec.
//! - **Teardown**: the same spec is rebuilt and the provider stops the instance.
//!
//! ## Enablement
//!
//! A module runs only when its code-level `enabled` flag is set and the
//! `[chaincode.system]` whitelist enables its name. Disabled modules are skipped
//! silently; that is not an error.

pub mod descriptor;
pub mod manager;
pub mod provider;
pub mod registry;
pub mod security;
pub mod spec;
pub mod traits;
pub mod validation;

pub use descriptor::{ModuleIdentity, SystemModuleDescriptor};
pub use manager::{ManagerOptions, RegistrationReport, SystemModuleManager};
pub use provider::{
    ChaincodeContext, ChaincodeEvent, ChaincodeResponse, ExecContext, ExecutionProvider,
    TxSimulator,
};
pub use registry::{InProcessRegistry, ModuleRegistry, SystemModuleSet};
pub use security::Whitelist;
pub use spec::{DeploymentSpec, ExecutionEnvironment};
pub use traits::{
    Chaincode, ModuleError, ProviderError, Registration, RegistryError, SpecBuildError,
};
