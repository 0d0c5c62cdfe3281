//! Whitelist policy for system modules
//!
//! A module is enabled only when its code-level `enabled` flag is set AND the
//! configuration whitelists its name with one of the accepted values.

use tracing::debug;

use crate::config::ConfigSource;
use crate::module::descriptor::SystemModuleDescriptor;

/// Whitelist values that enable a module (case-sensitive)
pub const WHITELIST_ENABLED_VALUES: [&str; 3] = ["enable", "true", "yes"];

/// Whether a raw whitelist value enables a module
pub fn is_enabling_value(value: &str) -> bool {
    WHITELIST_ENABLED_VALUES.contains(&value)
}

/// Two-layer enable check for system modules
pub struct Whitelist;

impl Whitelist {
    /// Evaluate the static flag and the configured whitelist entry
    ///
    /// A missing entry means disabled, never an error.
    pub fn is_enabled(descriptor: &SystemModuleDescriptor, config: &dyn ConfigSource) -> bool {
        if !descriptor.enabled {
            debug!(module = %descriptor.name(), "statically disabled");
            return false;
        }

        match config.system_module_setting(descriptor.name()) {
            Some(value) => {
                let enabled = is_enabling_value(&value);
                debug!(module = %descriptor.name(), value = %value, enabled, "whitelist entry");
                enabled
            }
            None => {
                debug!(module = %descriptor.name(), "no whitelist entry");
                false
            }
        }
    }
}
