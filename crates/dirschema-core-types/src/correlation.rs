//! Correlation identifiers for intercepted operations
//!
//! Every top-level Add/Modify/Rename gets a `RequestId` when it enters the
//! objectClass stage. The id keys the operation's context, tags every nested
//! submission and appears on every log event for that operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one intercepted operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
