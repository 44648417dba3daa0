//! Logging and observability
//!
//! Structured logging through `tracing`, with optional JSON file output and
//! rotation. The macros below keep field names consistent across the
//! pipeline.
//!
//! # Example
//!
//! ```no_run
//! use triadgen::logging::init_logging;
//! use triadgen::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use triadgen::log_error_with_context;
/// use triadgen::domain::TriadError;
///
/// let error = TriadError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use triadgen::log_retry_attempt;
///
/// log_retry_attempt!(2, 4, 1400u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

/// Log a triad that could not be processed
///
/// # Example
///
/// ```no_run
/// use triadgen::log_triad_failure;
///
/// log_triad_failure!(3, "30.00,50.00,76.00", "generator unavailable");
/// ```
#[macro_export]
macro_rules! log_triad_failure {
    ($worker:expr, $key:expr, $error:expr) => {
        tracing::error!(
            worker = $worker,
            key = %$key,
            error = %$error,
            "Triad failed"
        );
    };
}
