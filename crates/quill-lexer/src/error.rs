//! Error types for the Quill tokenizer.

use thiserror::Error;

/// Result type for tokenizer operations
pub type Result<T> = std::result::Result<T, LexError>;

/// Errors that abort tokenization.
///
/// All carry the 1-based line and column where the problem was found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// Tab characters are forbidden, margins are spaces only
    #[error("tabs are not allowed in source text, at {line}:{column}")]
    TabInSource { line: u32, column: u32 },

    /// A block-open `:` must be followed by an indented line
    #[error("indent expected after block-opening token, at {line}:{column}")]
    IndentExpected { line: u32, column: u32 },

    /// String literal with no closing quote
    #[error("unterminated string literal, at {line}:{column}")]
    UnterminatedString { line: u32, column: u32 },

    /// Escape sequence other than `\"`, `\\`, `\n`, `\t`
    #[error("unknown escape sequence '\\{escape}', at {line}:{column}")]
    UnknownEscape { escape: char, line: u32, column: u32 },

    /// Malformed numeric literal
    #[error("bad numeric literal: {reason}, at {line}:{column}")]
    BadNumericLiteral { reason: String, line: u32, column: u32 },

    /// No token rule matched the next byte
    #[error("unable to tokenize character {found:?}, at {line}:{column}")]
    UnexpectedChar { found: char, line: u32, column: u32 },
}

impl LexError {
    /// The line where the error occurred.
    pub fn line(&self) -> u32 {
        match self {
            LexError::TabInSource { line, .. }
            | LexError::IndentExpected { line, .. }
            | LexError::UnterminatedString { line, .. }
            | LexError::UnknownEscape { line, .. }
            | LexError::BadNumericLiteral { line, .. }
            | LexError::UnexpectedChar { line, .. } => *line,
        }
    }

    /// The column where the error occurred.
    pub fn column(&self) -> u32 {
        match self {
            LexError::TabInSource { column, .. }
            | LexError::IndentExpected { column, .. }
            | LexError::UnterminatedString { column, .. }
            | LexError::UnknownEscape { column, .. }
            | LexError::BadNumericLiteral { column, .. }
            | LexError::UnexpectedChar { column, .. } => *column,
        }
    }
}
