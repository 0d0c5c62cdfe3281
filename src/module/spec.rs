//! Deployment spec construction
//!
//! System module code ships inside the peer binary, so a deployment spec carries
//! no code package and is always marked for the system execution environment.
//! Deploy and teardown each rebuild the spec independently; identical inputs must
//! produce identical bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::module::descriptor::{ModuleIdentity, SystemModuleDescriptor};
use crate::module::traits::SpecBuildError;

/// Chaincode language marker
///
/// System modules are always marked `Golang`, which is what the peer's
/// lifecycle code expects for in-binary chaincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChaincodeType {
    Golang,
}

/// Where a deployed chaincode executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionEnvironment {
    /// In-process with the peer
    System,
}

/// Init input for a chaincode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChaincodeInput {
    pub args: Vec<Vec<u8>>,
}

/// Chaincode identity plus its init input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChaincodeSpec {
    pub chaincode_type: ChaincodeType,
    pub identity: ModuleIdentity,
    pub input: ChaincodeInput,
}

/// Everything the execution provider needs to launch a module instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub chaincode_spec: ChaincodeSpec,
    pub exec_env: ExecutionEnvironment,
    pub code_package: Vec<u8>,
}

impl DeploymentSpec {
    pub fn name(&self) -> &str {
        &self.chaincode_spec.identity.name
    }

    /// Canonical byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, SpecBuildError> {
        bincode::serialize(self).map_err(|e| SpecBuildError::Encoding(e.to_string()))
    }

    /// Hex SHA-256 of the canonical encoding, used to correlate deploy and
    /// teardown in logs
    pub fn fingerprint(&self) -> Result<String, SpecBuildError> {
        Ok(hex::encode(Sha256::digest(self.to_bytes()?)))
    }
}

/// Build the deployment spec for a system module identity
pub fn build(
    identity: &ModuleIdentity,
    init_args: &[Vec<u8>],
) -> Result<DeploymentSpec, SpecBuildError> {
    let chaincode_spec = ChaincodeSpec {
        chaincode_type: ChaincodeType::Golang,
        identity: identity.clone(),
        input: ChaincodeInput {
            args: init_args.to_vec(),
        },
    };

    Ok(DeploymentSpec {
        chaincode_spec,
        exec_env: ExecutionEnvironment::System,
        code_package: Vec::new(),
    })
}

/// Build the deployment spec straight from a descriptor
pub fn build_for(descriptor: &SystemModuleDescriptor) -> Result<DeploymentSpec, SpecBuildError> {
    build(&descriptor.identity, &descriptor.init_args)
}
