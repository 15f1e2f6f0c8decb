//! Quill Token Definitions
//!
//! This crate provides the shared token definitions used by the Quill
//! tokenizer, parser, and related tools: the closed [`TokenKind`] table,
//! the literal payload types, and source locations.

mod kind;
mod location;

pub use kind::{category, TokenKind, ALL_KINDS, KEYWORDS, PUNCT_LONGEST_FIRST};
pub use location::Location;

use std::fmt;

/// Signedness of an integer literal.
///
/// `Unspecified` is what an unsuffixed literal carries out of the
/// tokenizer; the type checker later picks the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signedness {
    /// `i` suffix
    Signed,
    /// `u` suffix
    Unsigned,
    /// no suffix written
    Unspecified,
}

impl fmt::Display for Signedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signedness::Signed => write!(f, "i"),
            Signedness::Unsigned => write!(f, "u"),
            Signedness::Unspecified => write!(f, "?"),
        }
    }
}

/// Integer literal payload: unsigned magnitude plus the suffix, if any.
///
/// `width` is 8/16/32/64, or 0 when the literal carried no width suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntLit {
    /// Magnitude as written (base prefix already decoded)
    pub value: u64,
    /// Signedness from the suffix, `Unspecified` without one
    pub signedness: Signedness,
    /// Width in bits from the suffix, 0 without one
    pub width: u8,
}

impl IntLit {
    /// Create an integer literal payload.
    pub fn new(value: u64, signedness: Signedness, width: u8) -> Self {
        IntLit { value, signedness, width }
    }
}

impl fmt::Display for IntLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int[{}:{}{}]", self.value, self.signedness, self.width)
    }
}

/// Floating point literal payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatLit {
    /// Magnitude with exponent applied
    pub value: f64,
    /// Width in bits, 32 or 64 (64 without a suffix)
    pub width: u8,
}

impl FloatLit {
    /// Create a floating point literal payload.
    pub fn new(value: f64, width: u8) -> Self {
        FloatLit { value, width }
    }
}

impl fmt::Display for FloatLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "float[{}:f{}]", self.value, self.width)
    }
}

/// A token as produced by the tokenizer and consumed by the parser.
///
/// Keyword and punctuation tokens carry only their [`TokenKind`]; the
/// literal variants carry the decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword, punctuation, grouping, or synthetic token
    Basic(TokenKind),
    /// Identifier that is not a reserved word
    Ident(String),
    /// String literal with escapes decoded
    Str(String),
    /// Integer literal
    Int(IntLit),
    /// Floating point literal
    Float(FloatLit),
}

impl Token {
    /// The token's kind when it is a basic token.
    pub fn kind(&self) -> Option<TokenKind> {
        match self {
            Token::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    /// True when this is the basic token of the given kind.
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        matches!(self, Token::Basic(k) if *k == kind)
    }
}

impl From<TokenKind> for Token {
    fn from(kind: TokenKind) -> Self {
        Token::Basic(kind)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Basic(kind) => write!(f, "token[{}]", kind.name()),
            Token::Ident(name) => write!(f, "ident[{name}]"),
            Token::Str(value) => write!(f, "str[{value:?}]"),
            Token::Int(lit) => write!(f, "{lit}"),
            Token::Float(lit) => write!(f, "{lit}"),
        }
    }
}

/// A token paired with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceToken {
    /// The token itself
    pub token: Token,
    /// Where it sits in the source text
    pub location: Location,
}

impl SourceToken {
    /// Pair a token with a location.
    pub fn new(token: impl Into<Token>, location: Location) -> Self {
        SourceToken { token: token.into(), location }
    }
}

impl fmt::Display for SourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Basic(TokenKind::Case).to_string(), "token[CASE]");
        assert_eq!(Token::Ident("foo".to_string()).to_string(), "ident[foo]");
        assert_eq!(
            Token::Int(IntLit::new(42, Signedness::Unspecified, 0)).to_string(),
            "int[42:?0]"
        );
    }

    #[test]
    fn test_basic_kind_accessors() {
        let t = Token::Basic(TokenKind::Oparen);
        assert_eq!(t.kind(), Some(TokenKind::Oparen));
        assert!(t.is_kind(TokenKind::Oparen));
        assert!(!t.is_kind(TokenKind::Cparen));
        assert_eq!(Token::Ident("x".into()).kind(), None);
    }
}
