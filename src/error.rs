//! Error types for xsdecl
//!
//! This module defines all error types used throughout the library.
//! Validation failures are deliberately absent: [`crate::validate`] answers
//! with a `bool` and never produces an error.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsdecl Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdecl operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema construction (bad enumeration literal, duplicate particle, ...)
    #[error("type definition error: {0}")]
    TypeDefinition(String),

    /// A named type reference that is missing from the schema's type table
    #[error("unresolved type: {0}")]
    UnresolvedType(String),

    /// Lookup of a top-level element that the schema does not declare
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// An instance construction call received a structurally incompatible value
    #[error("construction error: {0}")]
    Construction(String),

    /// The XML being deserialized does not fit the schema
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatchError),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML parsing or rendering error from the host XML layer
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Construction`] error
    pub(crate) fn construction(message: impl Into<String>) -> Self {
        Error::Construction(message.into())
    }

    /// Shorthand for a [`Error::TypeDefinition`] error
    pub(crate) fn type_definition(message: impl Into<String>) -> Self {
        Error::TypeDefinition(message.into())
    }
}

/// Deserialization error with context
#[derive(Debug, Clone)]
pub struct SchemaMismatchError {
    /// Error message
    pub message: String,
    /// Local name of the element where the mismatch was detected
    pub element: Option<String>,
    /// Offending text or child name, if any
    pub found: Option<String>,
}

impl SchemaMismatchError {
    /// Create a new schema mismatch error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            found: None,
        }
    }

    /// Set the element where the mismatch occurred
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set what was found instead of the expected content
    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for SchemaMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (in element '{}')", element)?;
        }

        if let Some(ref found) = self.found {
            write!(f, ", found '{}'", found)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaMismatchError {}
