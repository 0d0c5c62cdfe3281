//! Security policy for system modules
//!
//! Whitelist-only enablement: nothing runs unless both the code and the
//! operator say so.

pub mod whitelist;

pub use whitelist::{is_enabling_value, Whitelist, WHITELIST_ENABLED_VALUES};
