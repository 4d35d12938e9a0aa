//! Error types used by signflow.
//!
//! The engine itself never fails: a rejected document is the domain state
//! [`WorkflowStatus::Error`](crate::WorkflowStatus::Error), and empty input is
//! reported as a toast event. [`Error`] covers the fallible edges around it:
//! configuration validation, intake manifest parsing and the runtime driver.
//!
//! Every variant provides a stable label (`as_label`) for logs/metrics.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// # Errors produced around the workflow engine.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is out of range or inconsistent with the others.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending [`EngineConfig`](crate::EngineConfig) field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The intake manifest is not valid JSON or does not match the record shape.
    #[error("malformed intake manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Reading the intake manifest failed.
    #[error("failed to read intake manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime driver has stopped and no longer accepts commands.
    #[error("driver is closed")]
    DriverClosed,
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signflow::Error;
    ///
    /// let err = Error::InvalidConfig { field: "fault_probability", reason: "must be in [0, 1]".into() };
    /// assert_eq!(err.as_label(), "invalid_config");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidConfig { .. } => "invalid_config",
            Error::Manifest(_) => "manifest_malformed",
            Error::Io(_) => "manifest_io",
            Error::DriverClosed => "driver_closed",
        }
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
