//! Error types and exit codes for threadview
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (unresolvable pivot, malformed bundle, store conflicts)
//!
//! Link resolution failures are not errors here: they are rendered inline
//! as error items and never abort a flatten pass.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the threadview CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during threadview operations
#[derive(Error, Debug)]
pub enum ThreadError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human, json, or records)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    // Data errors (exit code 3)
    #[error("pivot {id} is not in the content store")]
    PivotUnresolved { id: String },

    #[error("collapse state for {id} was read before it was created")]
    CollapseStateMissing { id: String },

    #[error("link {id} is already resolved")]
    AlreadyResolved { id: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("invalid bundle {path:?}: {reason}")]
    InvalidBundle { path: PathBuf, reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperation {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("content source failed for {key}: {reason}")]
    Source { key: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl ThreadError {
    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        ThreadError::FailedOperation {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        ThreadError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ThreadError::UnknownFormat(_) | ThreadError::UsageError(_) => ExitCode::Usage,

            ThreadError::PivotUnresolved { .. }
            | ThreadError::CollapseStateMissing { .. }
            | ThreadError::AlreadyResolved { .. }
            | ThreadError::NotFound { .. }
            | ThreadError::InvalidBundle { .. } => ExitCode::Data,

            ThreadError::Io(_)
            | ThreadError::Json(_)
            | ThreadError::Toml(_)
            | ThreadError::FailedOperation { .. }
            | ThreadError::Source { .. }
            | ThreadError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            ThreadError::UnknownFormat(_) => "unknown_format",
            ThreadError::UsageError(_) => "usage_error",
            ThreadError::PivotUnresolved { .. } => "pivot_unresolved",
            ThreadError::CollapseStateMissing { .. } => "collapse_state_missing",
            ThreadError::AlreadyResolved { .. } => "already_resolved",
            ThreadError::NotFound { .. } => "not_found",
            ThreadError::InvalidBundle { .. } => "invalid_bundle",
            ThreadError::Io(_) => "io_error",
            ThreadError::Json(_) => "json_error",
            ThreadError::Toml(_) => "toml_error",
            ThreadError::FailedOperation { .. } => "failed_operation",
            ThreadError::Source { .. } => "source_error",
            ThreadError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for threadview operations
pub type Result<T> = std::result::Result<T, ThreadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(
            ThreadError::UsageError("bad".into()).exit_code(),
            ExitCode::Usage
        );
        assert_eq!(
            ThreadError::PivotUnresolved { id: "x".into() }.exit_code(),
            ExitCode::Data
        );
        assert_eq!(
            ThreadError::Other("boom".into()).exit_code(),
            ExitCode::Failure
        );
        assert_eq!(i32::from(ExitCode::Data), 3);
    }

    #[test]
    fn test_json_envelope() {
        let err = ThreadError::CollapseStateMissing { id: "t1_x".into() };
        let json = err.to_json();
        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["type"], "collapse_state_missing");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("t1_x"));
    }
}
