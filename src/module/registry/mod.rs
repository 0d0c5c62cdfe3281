//! System module registry
//!
//! The in-process code registry and the validated set of known system modules.

pub mod inproc;
pub mod set;

pub use inproc::{InProcessRegistry, ModuleRegistry};
pub use set::SystemModuleSet;
