//! Canonical field keys and event names for structured logging
//!
//! Shared by the logging macros and the test capture layer so that assertions
//! and emitters never drift apart.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Directory identifiers
pub const FIELD_DN: &str = "dn";
pub const FIELD_BASE_DN: &str = "base_dn";

// Pipeline bookkeeping
pub const FIELD_SEQUENCE: &str = "sequence";
pub const FIELD_RESULT_CODE: &str = "result_code";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
