//! Core error types for `mobile-seg`
//!
//! Configuration and validation error types shared across the workspace.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Parameter loading and validation errors.
///
/// Every failure while reading, coercing, validating or fanning out a
/// parameter set surfaces as one of these variants. Loading is one-shot
/// and fail-fast, so none of them is retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path to the parameter file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced parameter file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// A key that is not part of the schema
    #[error("unknown field '{path}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownField {
        /// Dotted path of the offending key (e.g. "module_params.lrr")
        path: String,
        /// Closest known key, if any is near enough
        suggestion: Option<String>,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Dotted path of the field with the invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Parameters were well-formed but violate a semantic rule
    #[error("validation failed for {path}: {}", join_issues(errors))]
    ValidationError {
        /// Source the parameters were loaded from
        path: String,
        /// Error-severity issues found
        errors: Vec<ValidationIssue>,
    },

    /// Cross-validation fan-out requested without a split count
    #[error("cannot fan out for cross-validation: data_params.n_splits is not set")]
    MissingSplits,

    /// Serializing a parameter set failed
    #[error("failed to serialize parameters: {message}")]
    SerializeError {
        /// Error message from the serializer
        message: String,
    },

    /// One or more parameter files failed validation.
    #[error("{count} file(s) failed validation")]
    ValidationFailed {
        /// Number of files that failed validation.
        count: usize,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single issue found while validating a parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "data_params.n_splits")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Rejects the parameter set
    Error,
    /// Reported, but the parameter set is still usable
    Warning,
}
