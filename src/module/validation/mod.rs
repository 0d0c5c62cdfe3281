//! Module validation framework
//!
//! Validates system module descriptors before they are accepted into the
//! peer's module set.

pub mod descriptor_validator;

pub use descriptor_validator::{DescriptorValidator, ValidationResult};
