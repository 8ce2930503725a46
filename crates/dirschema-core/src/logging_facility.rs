//! Structured logging facility for the objectClass stage
//!
//! - Single initialization point via `init(profile)`
//! - Operation boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use dirschema_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Every intercepted operation emits exactly one `start` event when it enters
//! the stage and exactly one `end` or `end_error` event when its completion is
//! delivered, all tagged with the operation's `request_id`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
