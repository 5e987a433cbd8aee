//! Error types for `mobile-seg`
//!
//! Re-exports the core configuration errors and adds the top-level error
//! that the CLI maps onto process exit codes.

use thiserror::Error;

pub use mobile_seg_core::error::{ConfigError, Severity, ValidationIssue};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `mobile-seg` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, unknown field, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (permission denied, broken pipe)
    pub const IO_ERROR: i32 = 3;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `mobile-seg` operations.
#[derive(Debug, Error)]
pub enum MobileSegError {
    /// Parameter loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MobileSegError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Json(_) => ExitCode::ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_config_code() {
        let err = MobileSegError::from(ConfigError::MissingSplits);
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn io_errors_exit_with_io_code() {
        let err = MobileSegError::from(std::io::Error::other("broken pipe"));
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn config_error_display_is_transparent() {
        let err = MobileSegError::from(ConfigError::ValidationFailed { count: 2 });
        assert_eq!(err.to_string(), "2 file(s) failed validation");
    }
}
