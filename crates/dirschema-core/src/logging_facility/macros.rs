//! Operation boundary macros
//!
//! All three emit `component`, `op` and `event` so that log consumers can
//! pair the start and end of every intercepted operation.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use dirschema_core::log_op_start;
/// log_op_start!("objectclass_add");
/// log_op_start!("objectclass_add", dn = "CN=x,DC=example,DC=com");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the end of an operation whose completion was delivered
///
/// # Example
///
/// ```
/// # use dirschema_core::log_op_end;
/// log_op_end!("objectclass_modify", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation that this stage failed
///
/// The error is converted into [`ExError`](crate::errors::ExError) so the
/// event always carries `err_kind` and `err_code`.
///
/// # Example
///
/// ```
/// # use dirschema_core::log_op_error;
/// # use dirschema_core::errors::SchemaError;
/// let err = SchemaError::ParentNotFound { dn: "CN=x,CN=gone,DC=example,DC=com".to_string() };
/// log_op_error!("objectclass_add", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
            $($field)*
        );
    }};
}
