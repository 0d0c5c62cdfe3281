//! The peer's set of known system modules
//!
//! Built once at process start from the static descriptor table and passed by
//! reference to whoever registers or deploys system modules.

use std::collections::HashMap;
use tracing::debug;

use crate::module::descriptor::SystemModuleDescriptor;
use crate::module::traits::ModuleError;
use crate::module::validation::{DescriptorValidator, ValidationResult};

/// Validated, name-unique list of system module descriptors
#[derive(Debug, Clone, Default)]
pub struct SystemModuleSet {
    /// Declaration order is registration and deployment order
    descriptors: Vec<SystemModuleDescriptor>,
    /// name -> index into `descriptors`
    by_name: HashMap<String, usize>,
}

impl SystemModuleSet {
    /// Validate descriptors and reject duplicate names
    pub fn new(descriptors: Vec<SystemModuleDescriptor>) -> Result<Self, ModuleError> {
        let validator = DescriptorValidator::new();
        let mut by_name = HashMap::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            if let ValidationResult::Invalid(errors) = validator.validate(descriptor) {
                return Err(ModuleError::InvalidDescriptor(errors.join("; ")));
            }
            if by_name.insert(descriptor.name().to_string(), index).is_some() {
                return Err(ModuleError::DuplicateName(descriptor.name().to_string()));
            }
        }

        debug!("System module set holds {} descriptors", descriptors.len());
        Ok(Self {
            descriptors,
            by_name,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SystemModuleDescriptor> {
        self.by_name.get(name).map(|&i| &self.descriptors[i])
    }

    /// Like `get`, but an unknown name is an error
    pub fn require(&self, name: &str) -> Result<&SystemModuleDescriptor, ModuleError> {
        self.get(name)
            .ok_or_else(|| ModuleError::ModuleNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemModuleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether `name` is a known system module
    pub fn is_system_module(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// True for system modules that proposals sent to this peer may not invoke;
    /// false for unknown names
    pub fn is_not_invokable_external(&self, name: &str) -> bool {
        self.get(name).map_or(false, |d| !d.invokable_external)
    }

    /// True for system modules that other chaincodes may not invoke; false for
    /// unknown names
    pub fn is_not_invokable_cc2cc(&self, name: &str) -> bool {
        self.get(name).map_or(false, |d| !d.invokable_cc2cc)
    }
}

impl<'a> IntoIterator for &'a SystemModuleSet {
    type Item = &'a SystemModuleDescriptor;
    type IntoIter = std::slice::Iter<'a, SystemModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
