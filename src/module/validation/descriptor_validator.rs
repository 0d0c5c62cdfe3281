//! Descriptor validation
//!
//! Checks the static fields of a system module descriptor before it joins the
//! peer's module set.

use tracing::{debug, warn};

use crate::module::descriptor::SystemModuleDescriptor;

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Descriptor is valid
    Valid,
    /// Descriptor is invalid with specific errors
    Invalid(Vec<String>),
}

/// Descriptor validator
pub struct DescriptorValidator {
    /// Maximum module name length
    max_name_len: usize,
}

impl DescriptorValidator {
    /// Create a new descriptor validator
    pub fn new() -> Self {
        Self { max_name_len: 64 }
    }

    /// Validate a system module descriptor
    pub fn validate(&self, descriptor: &SystemModuleDescriptor) -> ValidationResult {
        let mut errors = Vec::new();
        let name = descriptor.name();

        if name.is_empty() {
            errors.push("Module name cannot be empty".to_string());
        } else if !self.is_valid_name(name) {
            errors.push(format!(
                "Invalid module name: {} (must be alphanumeric with dashes/underscores, at most {} chars)",
                name, self.max_name_len
            ));
        }

        let path = descriptor.path();
        if path.is_empty() {
            errors.push(format!("Module {} has an empty path", name));
        } else if path.chars().any(char::is_whitespace) {
            errors.push(format!("Module {} path contains whitespace: {:?}", name, path));
        }

        if errors.is_empty() {
            debug!("Descriptor validation passed for module: {}", name);
            ValidationResult::Valid
        } else {
            warn!("Descriptor validation failed for module {}: {:?}", name, errors);
            ValidationResult::Invalid(errors)
        }
    }

    /// Validate module name format
    #[inline]
    fn is_valid_name(&self, name: &str) -> bool {
        if name.is_empty() || name.len() > self.max_name_len {
            return false;
        }

        // Must start with alphanumeric
        if !name.chars().next().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl Default for DescriptorValidator {
    fn default() -> Self {
        Self::new()
    }
}
