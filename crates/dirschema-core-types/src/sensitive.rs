//! Redaction wrapper for secret attribute values
//!
//! Password material travels through the pipeline as ordinary attribute
//! values (the `clearTextPassword` pseudo-attribute). Wrapping those values in
//! `Sensitive<T>` keeps them out of `Debug` output and structured logs.

use std::fmt;

/// Placeholder written in place of a redacted value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper for secret data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use dirschema_core_types::Sensitive;
///
/// let password = Sensitive::new(vec!["\"Passw0rd\"".to_string()]);
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(password.expose().len(), 1);
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a secret value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Unwrap the secret
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
