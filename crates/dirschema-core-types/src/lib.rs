//! Core types shared across the dirschema crates
//!
//! - **Correlation**: `RequestId` for intercepted operations
//! - **Sensitive data**: `Sensitive<T>` marker for redaction of password values
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RequestId;
pub use sensitive::Sensitive;
