//! Canonical logging macros
//!
//! Every engine operation logs exactly one `start` and one `end` or
//! `end_error` event with the same `op` value.

/// Log the start of an operation
///
/// ```
/// # use vgraph_core::log_op_start;
/// log_op_start!("create_object");
/// log_op_start!("create_object", branch_id = "main");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use vgraph_core::log_op_end;
/// log_op_end!("create_object", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into [`VgError`](crate::errors::VgError).
///
/// ```
/// # use vgraph_core::{log_op_error, errors::GraphError};
/// let err = GraphError::NotFound { id: "c1".into(), branch: "main".into() };
/// log_op_error!("get_object", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let vg_err: $crate::errors::VgError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?vg_err.kind(),
            err_code = vg_err.code(),
            err_message = vg_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let vg_err: $crate::errors::VgError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::vgraph_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?vg_err.kind(),
            err_code = vg_err.code(),
            err_message = vg_err.message(),
            $($field)*
        );
    }};
}
