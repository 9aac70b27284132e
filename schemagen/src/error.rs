//! Error types for schema generation runs

use std::path::Path;

use error_stack::Report;
use thiserror::Error;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_MISSING_PREFIX: &str = "Missing";

/// Result type for the `registry_schemagen` library
pub type Result<T> = std::result::Result<T, Report<Error>>;

/// Error categories of a generation run
///
/// Whether an error is fatal depends on where it surfaces: the orchestrator
/// aborts on configuration, base type and output directory failures, while the
/// same categories raised for a single scanned type only skip that type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A malformed classpath entry; the entry is skipped
    #[error("Malformed classpath entry: {0}")]
    Classpath(String),

    /// Missing or invalid run configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading or writing a file or directory failed
    #[error("File operation failed: {0}")]
    FileOperation(String),

    /// A type's structure could not be turned into a schema document
    #[error("Schema generation failed: {0}")]
    Generation(String),

    /// A type descriptor exists but could not be read
    #[error("Type resolution failed: {0}")]
    TypeResolution(String),

    /// No index in the search path defines the type
    #[error("Type not found: {type_path}")]
    TypeNotFound {
        /// Fully-qualified name that was requested
        type_path: String,
    },
}

impl Error {
    /// Create a "Missing X" configuration error
    #[must_use]
    pub fn missing(what: &str) -> Self {
        Self::Configuration(format!("{MSG_MISSING_PREFIX} {what}"))
    }

    /// Create a "Failed to X" error for a file system operation on `path`
    #[must_use]
    pub fn io_failed(operation: &str, path: &Path, error: impl std::fmt::Display) -> Self {
        Self::FileOperation(format!(
            "{MSG_FAILED_TO_PREFIX} {operation} {}: {error}",
            path.display()
        ))
    }

    /// Create a type-not-found error
    #[must_use]
    pub fn type_not_found(type_path: impl Into<String>) -> Self {
        Self::TypeNotFound {
            type_path: type_path.into(),
        }
    }

    /// Create a generation error for a member of `type_path`
    #[must_use]
    pub fn member_failed(type_path: &str, member: &str, reason: impl std::fmt::Display) -> Self {
        Self::Generation(format!("{type_path}.{member}: {reason}"))
    }

    /// Whether this error means a lookup came back empty rather than broken
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TypeNotFound { .. })
    }
}
