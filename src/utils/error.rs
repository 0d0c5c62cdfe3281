//! Error handling helpers for batch operations
//!
//! A failed entry in a batch is logged where it happens and then dropped, so
//! the rest of the batch keeps going.

use tracing::warn;

/// Execute an operation and log errors without failing
///
/// Returns `Some(T)` on success, `None` on error (after logging).
///
/// # Example
/// ```rust
/// use peer_syscc::utils::log_error;
///
/// let parsed = log_error(|| "42".parse::<u32>(), "Ignoring bad entry");
/// assert_eq!(parsed, Some(42));
/// ```
pub fn log_error<F, T, E>(operation: F, context: &str) -> Option<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    match operation() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: {}", context, e);
            None
        }
    }
}
