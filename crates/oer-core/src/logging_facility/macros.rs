//! Canonical logging macros

/// Log the start of an operation
///
/// ```
/// # use oer_core::log_op_start;
/// log_op_start!("release_course", course_id = 5);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use oer_core::log_op_end;
/// log_op_end!("release_course", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `ExError`.
///
/// ```
/// # use oer_core::{log_op_error, errors::OerError};
/// let err = OerError::UnknownPlugin { key: "mod_folder".to_string() };
/// log_op_error!("load_elements", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_END_ERROR,
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
            event = $crate::oer_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
            $($field)*
        );
    }};
}

/// Log an ERROR-severity audit entry
///
/// ```
/// # use oer_core::log_audit;
/// log_audit!("resolve_state", "editor course reassigned", identifier = "oer:moodle@x:file:contenthash:ab");
/// ```
#[macro_export]
macro_rules! log_audit {
    ($op:expr, $message:expr) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_AUDIT,
            message = $message,
        );
    };
    ($op:expr, $message:expr, $($field:tt)*) => {
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::oer_core_types::schema::EVENT_AUDIT,
            message = $message,
            $($field)*
        );
    };
}
