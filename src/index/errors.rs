//! Index error types
//!
//! Error codes:
//! - DOCX_MALFORMED_ENTRY (FATAL)
//! - DOCX_SOURCE_UNREADABLE (FATAL)
//! - DOCX_EMPTY_INDEX (FATAL)
//!
//! Loading is all-or-nothing: any of these aborts the load and no partial
//! index is ever returned.

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Load must be abandoned
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// A record does not have the expected tuple shape
    MalformedEntry,
    /// A fragment file or directory could not be read
    SourceUnreadable,
    /// No fragment was found where one was required
    EmptyIndex,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::MalformedEntry => "DOCX_MALFORMED_ENTRY",
            IndexErrorCode::SourceUnreadable => "DOCX_SOURCE_UNREADABLE",
            IndexErrorCode::EmptyIndex => "DOCX_EMPTY_INDEX",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Zero-based record position if applicable
    record: Option<usize>,
}

impl IndexError {
    /// Create a malformed entry error for the record at `record`
    pub fn malformed_entry(record: usize, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::MalformedEntry,
            message: format!("Malformed entry at record {}: {}", record, reason.into()),
            record: Some(record),
        }
    }

    /// Create a malformed entry error that is not tied to one record
    /// (bad prefix, unterminated literal, trailing garbage)
    pub fn malformed_source(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::MalformedEntry,
            message: reason.into(),
            record: None,
        }
    }

    /// Create a source unreadable error
    pub fn source_unreadable(path: &Path, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::SourceUnreadable,
            message: format!("Cannot read {}: {}", path.display(), source),
            record: None,
        }
    }

    /// Create an empty index error
    pub fn empty_index(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::EmptyIndex,
            message: reason.into(),
            record: None,
        }
    }

    /// Prefix the message with the fragment it came from
    pub fn in_fragment(mut self, fragment: &str) -> Self {
        self.message = format!("{}: {}", fragment, self.message);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the record position if applicable
    pub fn record(&self) -> Option<usize> {
        self.record
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
