//! Execution provider interface
//!
//! The provider launches, initializes and stops chaincode instances against
//! ledger state. It is injected into the lifecycle manager; this crate never
//! reaches it through a global accessor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::module::spec::DeploymentSpec;
use crate::module::traits::ProviderError;

/// Execution context handed to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecContext {
    /// Root context with no ledger attached
    Background,
    /// Context bound to a channel's ledger for one transaction
    Channel { channel_id: String, tx_id: String },
}

impl ExecContext {
    pub fn background() -> Self {
        ExecContext::Background
    }

    pub fn is_channel_scoped(&self) -> bool {
        matches!(self, ExecContext::Channel { .. })
    }
}

/// Transaction simulator handle returned with a channel-scoped context
pub trait TxSimulator: Send {
    /// Release the simulator once the provider call returns
    fn done(self: Box<Self>);
}

/// Per-call binding of a module instance to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeContext {
    pub channel_id: String,
    pub name: String,
    pub version: String,
    pub tx_id: String,
    pub is_system: bool,
    pub signed_proposal: Option<Vec<u8>>,
    pub proposal: Option<Vec<u8>>,
}

/// Response from a chaincode entry point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeResponse {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

/// Event emitted by a chaincode during execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    pub chaincode_id: String,
    pub tx_id: String,
    pub event_name: String,
    pub payload: Vec<u8>,
}

/// Transaction execution provider
///
/// Concurrent `execute_filtered`/`stop` calls for the same channel and module
/// are not serialized here; callers own that.
#[async_trait]
pub trait ExecutionProvider: Send + Sync {
    /// Resolve a ledger-backed context for `channel_id`
    async fn resolve_context(
        &self,
        channel_id: &str,
        tx_id: &str,
    ) -> Result<(ExecContext, Box<dyn TxSimulator>), ProviderError>;

    /// Build the chaincode context for one call
    fn context_for(
        &self,
        channel_id: &str,
        name: &str,
        version: &str,
        tx_id: &str,
        is_system: bool,
        signed_proposal: Option<Vec<u8>>,
        proposal: Option<Vec<u8>>,
    ) -> ChaincodeContext {
        ChaincodeContext {
            channel_id: channel_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            tx_id: tx_id.to_string(),
            is_system,
            signed_proposal,
            proposal,
        }
    }

    /// Launch the instance and run its `init`, turning rejected init responses
    /// into errors
    async fn execute_filtered(
        &self,
        ctx: &ExecContext,
        cccid: &ChaincodeContext,
        spec: &DeploymentSpec,
    ) -> Result<(ChaincodeResponse, Vec<ChaincodeEvent>), ProviderError>;

    /// Stop a running instance
    async fn stop(
        &self,
        ctx: &ExecContext,
        cccid: &ChaincodeContext,
        spec: &DeploymentSpec,
    ) -> Result<(), ProviderError>;

    /// Version string shared by every system module
    fn current_system_module_version(&self) -> String;
}
