//! Structured logging helpers.
//!
//! Records carry a `subsystem` field so JSON output can be filtered per
//! crate:
//! - `subsystem`: `ak-01` .. `ak-05`, `runtime`
//! - `connector_id`, `namespace`: set by the connection macros
//! - Additional context fields

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    // Info level with subsystem
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with subsystem
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with subsystem
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with subsystem
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a connector-related event with standard fields.
#[macro_export]
macro_rules! log_connector_event {
    ($level:ident, $subsystem:expr, $msg:expr, $namespace:expr, $connector_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            namespace = %$namespace,
            connector_id = %$connector_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an account-related event with standard fields.
#[macro_export]
macro_rules! log_account_event {
    ($level:ident, $subsystem:expr, $msg:expr, $caip_address:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            caip_address = %$caip_address,
            $($($field)*,)?
            $msg
        )
    };
}
