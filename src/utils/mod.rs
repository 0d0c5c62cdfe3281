//! Utility modules

pub mod error;
pub mod logging;

pub use error::log_error;
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
