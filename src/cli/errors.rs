//! CLI-specific error types
//!
//! Index errors keep their own `DOCX_*` code when they surface here.

use std::fmt;
use std::io;

use crate::index::{IndexError, IndexErrorCode};

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Request could not be understood
    BadRequest,
    /// Exact lookup found nothing
    NotFound,
    /// Index failed to load
    Index(IndexErrorCode),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCX_CLI_CONFIG_ERROR",
            Self::IoError => "DOCX_CLI_IO_ERROR",
            Self::BadRequest => "DOCX_CLI_BAD_REQUEST",
            Self::NotFound => "DOCX_CLI_NOT_FOUND",
            Self::Index(code) => code.code(),
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadRequest, msg)
    }

    /// No entry under `key`
    pub fn not_found(key: &str) -> Self {
        Self::new(CliErrorCode::NotFound, format!("No entry for key '{}'", key))
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the serving loop can carry on after this error
    pub fn is_request_error(&self) -> bool {
        matches!(self.code, CliErrorCode::BadRequest | CliErrorCode::NotFound)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<IndexError> for CliError {
    fn from(e: IndexError) -> Self {
        Self::new(CliErrorCode::Index(e.code()), e.message())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_keeps_code() {
        let err: CliError = IndexError::malformed_entry(2, "no targets").into();
        assert_eq!(err.code_str(), "DOCX_MALFORMED_ENTRY");
        assert!(err.message().contains("record 2"));
        assert!(!err.is_request_error());
    }

    #[test]
    fn test_request_errors() {
        assert!(CliError::not_found("zz").is_request_error());
        assert!(CliError::bad_request("zz").is_request_error());
        assert!(!CliError::io_error("closed").is_request_error());
    }

    #[test]
    fn test_display() {
        let err = CliError::not_found("array3d");
        assert_eq!(
            err.to_string(),
            "DOCX_CLI_NOT_FOUND: No entry for key 'array3d'"
        );
    }
}
