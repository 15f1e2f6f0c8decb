//! Parse errors.

use quill_token::Location;
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A fatal parse error.
///
/// The parser does not resynchronise; the first syntax error aborts the
/// pipeline with the offending location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}, at {location}")]
pub struct ParseError {
    /// Human-readable description of what went wrong
    pub message: String,
    /// Where the parser stopped
    pub location: Location,
}

impl ParseError {
    /// Create an error at a location.
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        ParseError { message: message.into(), location }
    }
}
