//! System module manager
//!
//! Registers system module code with the in-process registry at peer start, and
//! deploys or tears down module instances per channel through the execution
//! provider. Holds no mutable state of its own; every call recomputes its inputs
//! and makes exactly one provider call.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigSource, DeploymentConfig};
use crate::module::descriptor::SystemModuleDescriptor;
use crate::module::provider::{ExecContext, ExecutionProvider, TxSimulator};
use crate::module::registry::{ModuleRegistry, SystemModuleSet};
use crate::module::security::Whitelist;
use crate::module::spec::{self, DeploymentSpec};
use crate::module::traits::{ModuleError, Registration, RegistryError};
use crate::utils::log_error;

/// Deployment behaviour knobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Resolve a ledger-backed context for non-empty channel IDs before init
    pub channel_scoped_context: bool,
    /// Use this version instead of asking the provider
    pub system_module_version: Option<String>,
}

impl From<&DeploymentConfig> for ManagerOptions {
    fn from(config: &DeploymentConfig) -> Self {
        Self {
            channel_scoped_context: config.channel_scoped_context,
            system_module_version: config.system_module_version.clone(),
        }
    }
}

/// Per-module outcomes of a startup registration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub bound: Vec<String>,
    pub already_bound: Vec<String>,
    pub disabled: Vec<String>,
    pub failed: Vec<String>,
}

impl RegistrationReport {
    /// Modules usable after the pass
    pub fn registered(&self) -> usize {
        self.bound.len() + self.already_bound.len()
    }

    pub fn total(&self) -> usize {
        self.registered() + self.disabled.len() + self.failed.len()
    }
}

/// Lifecycle coordinator for system modules
pub struct SystemModuleManager {
    /// In-process code registry
    registry: Arc<dyn ModuleRegistry>,
    /// Execution provider used for init and stop
    provider: Arc<dyn ExecutionProvider>,
    /// Whitelist source, read on every policy check
    config: Arc<dyn ConfigSource>,
    options: ManagerOptions,
}

impl SystemModuleManager {
    /// Create a manager with default options
    pub fn new(
        registry: Arc<dyn ModuleRegistry>,
        provider: Arc<dyn ExecutionProvider>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self::with_options(registry, provider, config, ManagerOptions::default())
    }

    pub fn with_options(
        registry: Arc<dyn ModuleRegistry>,
        provider: Arc<dyn ExecutionProvider>,
        config: Arc<dyn ConfigSource>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            registry,
            provider,
            config,
            options,
        }
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Whether the whitelist policy currently enables `descriptor`
    pub fn is_enabled(&self, descriptor: &SystemModuleDescriptor) -> bool {
        Whitelist::is_enabled(descriptor, self.config.as_ref())
    }

    /// Version string shared by all system modules
    pub fn system_module_version(&self) -> String {
        match self.options.system_module_version {
            Some(ref version) => version.clone(),
            None => self.provider.current_system_module_version(),
        }
    }

    /// Bind a module's code into the in-process registry
    ///
    /// Disabled modules return `Registration::Disabled`. An existing binding for
    /// the same path counts as success, so repeated registration is harmless.
    pub fn register_module(
        &self,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<Registration, ModuleError> {
        if !self.is_enabled(descriptor) {
            info!(
                module = %descriptor.name(),
                path = %descriptor.path(),
                static_enabled = descriptor.enabled,
                "system chaincode disabled"
            );
            return Ok(Registration::Disabled);
        }

        let registration = match self
            .registry
            .bind(descriptor.path(), Arc::clone(&descriptor.implementation))
        {
            Ok(()) => Registration::Bound,
            Err(RegistryError::AlreadyBound(key)) => {
                // The type is bound; an instance may still need deploying
                warn!(
                    module = %descriptor.name(),
                    path = %key,
                    "system chaincode code already bound"
                );
                Registration::AlreadyBound
            }
            Err(e) => {
                error!(
                    module = %descriptor.name(),
                    path = %descriptor.path(),
                    "could not register system chaincode: {}",
                    e
                );
                return Err(ModuleError::RegistrationFailed {
                    name: descriptor.name().to_string(),
                    path: descriptor.path().to_string(),
                    source: e,
                });
            }
        };

        info!(
            module = %descriptor.name(),
            path = %descriptor.path(),
            "system chaincode registered"
        );
        Ok(registration)
    }

    /// Register every module in `modules`
    ///
    /// Never stops on a failed entry and never returns an error; the report is
    /// for observability and the caller decides what a failure means.
    pub fn register_all(&self, modules: &SystemModuleSet) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for descriptor in modules {
            debug!("<{:?}>", descriptor);
            let name = descriptor.name().to_string();
            let context = format!("Skipping system chaincode {}", name);
            match log_error(|| self.register_module(descriptor), &context) {
                Some(Registration::Bound) => report.bound.push(name),
                Some(Registration::AlreadyBound) => report.already_bound.push(name),
                Some(Registration::Disabled) => report.disabled.push(name),
                None => report.failed.push(name),
            }
        }

        info!(
            "Registered {}/{} system chaincodes ({} disabled, {} failed)",
            report.registered(),
            report.total(),
            report.disabled.len(),
            report.failed.len()
        );
        report
    }

    /// Deploy a system module on a channel
    ///
    /// A module the whitelist disables is skipped and returns `Ok(())`.
    pub async fn deploy(
        &self,
        channel_id: &str,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<(), ModuleError> {
        if !self.is_enabled(descriptor) {
            info!(
                module = %descriptor.name(),
                path = %descriptor.path(),
                channel = %channel_id,
                "system chaincode disabled, not deploying"
            );
            return Ok(());
        }

        let tx_id = uuid::Uuid::new_v4().to_string();
        let (ctx, simulator) = self.exec_context(channel_id, &tx_id, descriptor).await?;

        let result = self
            .execute(channel_id, &tx_id, &ctx, descriptor)
            .await;

        if let Some(simulator) = simulator {
            simulator.done();
        }

        match result {
            Ok(fingerprint) => {
                info!(
                    module = %descriptor.name(),
                    path = %descriptor.path(),
                    channel = %channel_id,
                    tx_id = %tx_id,
                    spec = %fingerprint,
                    "system chaincode deployed"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    module = %descriptor.name(),
                    channel = %channel_id,
                    tx_id = %tx_id,
                    "deploying system chaincode failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Stop a system module instance on a channel
    ///
    /// Not gated by the whitelist: a module disabled after deployment can
    /// still be stopped.
    pub async fn teardown(
        &self,
        channel_id: &str,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<(), ModuleError> {
        let (spec, fingerprint) = self.build_spec(descriptor)?;
        let version = self.system_module_version();
        let cccid =
            self.provider
                .context_for(channel_id, descriptor.name(), &version, "", true, None, None);

        match self
            .provider
            .stop(&ExecContext::background(), &cccid, &spec)
            .await
        {
            Ok(()) => {
                info!(
                    module = %descriptor.name(),
                    path = %descriptor.path(),
                    channel = %channel_id,
                    spec = %fingerprint,
                    "system chaincode stopped"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    module = %descriptor.name(),
                    channel = %channel_id,
                    "stopping system chaincode failed: {}",
                    e
                );
                Err(ModuleError::TeardownFailed {
                    name: descriptor.name().to_string(),
                    channel: channel_id.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Deploy every module in declaration order, stopping at the first failure
    pub async fn deploy_all(
        &self,
        channel_id: &str,
        modules: &SystemModuleSet,
    ) -> Result<(), ModuleError> {
        for descriptor in modules {
            self.deploy(channel_id, descriptor).await?;
        }
        Ok(())
    }

    /// Stop every module, attempting all of them and returning the first error
    pub async fn teardown_all(
        &self,
        channel_id: &str,
        modules: &SystemModuleSet,
    ) -> Result<(), ModuleError> {
        let mut first_error = None;

        for descriptor in modules {
            if let Err(e) = self.teardown(channel_id, descriptor).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Pick the execution context for a deployment
    ///
    /// Without channel-scoped contexts enabled (or for an empty channel ID) the
    /// background context is used.
    async fn exec_context(
        &self,
        channel_id: &str,
        tx_id: &str,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<(ExecContext, Option<Box<dyn TxSimulator>>), ModuleError> {
        if !self.options.channel_scoped_context || channel_id.is_empty() {
            return Ok((ExecContext::background(), None));
        }

        match self.provider.resolve_context(channel_id, tx_id).await {
            Ok((ctx, simulator)) => Ok((ctx, Some(simulator))),
            Err(e) => {
                error!(
                    module = %descriptor.name(),
                    channel = %channel_id,
                    tx_id = %tx_id,
                    "system chaincode start up failure: {}",
                    e
                );
                Err(ModuleError::ContextResolution {
                    name: descriptor.name().to_string(),
                    channel: channel_id.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Build the spec and run the provider's filtered execution path
    ///
    /// Returns the spec fingerprint on success.
    async fn execute(
        &self,
        channel_id: &str,
        tx_id: &str,
        ctx: &ExecContext,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<String, ModuleError> {
        let (spec, fingerprint) = self.build_spec(descriptor)?;
        debug!(
            "built deployment spec for {}: {:?}",
            descriptor.name(),
            spec.chaincode_spec
        );

        let version = self.system_module_version();
        let cccid = self.provider.context_for(
            channel_id,
            spec.name(),
            &version,
            tx_id,
            true,
            None,
            None,
        );

        let (response, events) = self
            .provider
            .execute_filtered(ctx, &cccid, &spec)
            .await
            .map_err(|e| ModuleError::DeploymentFailed {
                name: descriptor.name().to_string(),
                channel: channel_id.to_string(),
                source: e,
            })?;

        debug!(
            "init of {} returned status {} with {} events",
            descriptor.name(),
            response.status,
            events.len()
        );
        Ok(fingerprint)
    }

    /// Build the spec and its fingerprint
    ///
    /// Encoding runs before any provider call, so an unencodable spec fails the
    /// operation instead of reaching deploy or stop.
    fn build_spec(
        &self,
        descriptor: &SystemModuleDescriptor,
    ) -> Result<(DeploymentSpec, String), ModuleError> {
        spec::build_for(descriptor)
            .and_then(|spec| spec.fingerprint().map(|fingerprint| (spec, fingerprint)))
            .map_err(|e| {
                error!(
                    module = %descriptor.name(),
                    "Error building deployment spec: {}",
                    e
                );
                ModuleError::SpecBuildFailed {
                    name: descriptor.name().to_string(),
                    source: e,
                }
            })
    }
}
