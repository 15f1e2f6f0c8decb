//! Indentation-aware tokenizer for the Quill language.
//!
//! Converts raw source text into a flat token stream, resolving layout
//! into explicit grouping tokens. Block structure comes from leading
//! whitespace: a trailing `:` (or `=`) followed by a deeper margin opens
//! a group (`OPAREN`), dedenting closes it (`CPAREN`), and lines at the
//! same margin are separated by `LINE_END`. An indented line without an
//! opening trigger is a plain line continuation and emits nothing.
//!
//! # Usage
//!
//! ```
//! use quill_lexer::tokenize;
//!
//! let out = tokenize("meta:\n    verbatim\n").unwrap();
//! assert_eq!(out.tokens.len(), 4); // META ( VERBATIM )
//! ```
//!
//! The tokenizer also records `start_of_line`: the byte offset of the
//! first character of every physical line, for downstream diagnostics.
//!
//! All failures are fatal ([`LexError`]) and carry the line and column
//! where the input stopped making sense.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::too_many_lines, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;

pub use error::{LexError, Result};

use memchr::memchr;
use quill_token::{IntLit, Location, Signedness, SourceToken, Token, TokenKind};
use quill_token::{FloatLit, KEYWORDS, PUNCT_LONGEST_FIRST};

/// Tokenizer output: the token stream plus per-line byte offsets.
///
/// `start_of_line[i]` is the byte offset of the first character of line
/// `i + 1` (lines are 1-based everywhere else).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexOutput {
    /// Tokens with locations, layout already resolved
    pub tokens: Vec<SourceToken>,
    /// Byte offset of each physical line start
    pub start_of_line: Vec<u32>,
}

/// Tokenize a whole source text.
pub fn tokenize(input: &str) -> Result<LexOutput> {
    Tokenizer::new(input).process()
}

/// Margin-stack tokenizer over a single source buffer.
struct Tokenizer<'a> {
    text: &'a str,
    /// Cached input bytes for faster access
    input: &'a [u8],
    pos: usize,
    tokens: Vec<SourceToken>,
    start_of_line: Vec<u32>,
    /// Stack of `(column, real_indent)` margins; `real_indent` margins
    /// were opened by `:`/`=` and owe a `CPAREN` when popped.
    margins: Vec<(usize, bool)>,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Tokenizer {
            text,
            input: text.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            start_of_line: Vec::new(),
            margins: vec![(0, true)],
        }
    }

    fn process(mut self) -> Result<LexOutput> {
        while self.pos < self.input.len() {
            self.start_of_line.push(self.pos as u32);

            if self.eat_empty_line()? {
                continue;
            }

            self.eat_margin()?;
            self.eat_multiline_sep();

            loop {
                self.eat_spaces()?;
                if !self.eat_token()? {
                    break;
                }
            }

            if self.pos >= self.input.len() {
                break;
            }

            if !self.eat_eol() {
                let found = self.text[self.pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(LexError::UnexpectedChar {
                    found,
                    line: self.line(),
                    column: self.column(self.pos) as u32,
                });
            }
        }

        self.pop_dedents();

        Ok(LexOutput { tokens: self.tokens, start_of_line: self.start_of_line })
    }

    /// 1-based number of the line currently being scanned.
    fn line(&self) -> u32 {
        self.start_of_line.len() as u32
    }

    /// Byte offset of the current line's first character.
    fn line_start(&self) -> usize {
        self.start_of_line.last().map_or(0, |p| *p as usize)
    }

    /// 1-based column of a byte offset on the current line.
    fn column(&self, pos: usize) -> u16 {
        (pos - self.line_start() + 1) as u16
    }

    fn layout_location(&self) -> Location {
        Location::new(self.line(), 1, 1)
    }

    fn last_is(&self, kind: TokenKind) -> bool {
        self.tokens.last().is_some_and(|t| t.token.is_kind(kind))
    }

    fn push_basic(&mut self, kind: TokenKind, location: Location) {
        self.tokens.push(SourceToken::new(kind, location));
    }

    /// Skip a line of only spaces. Tabs are a hard error.
    fn eat_empty_line(&mut self) -> Result<bool> {
        let mut p = self.pos;
        while p < self.input.len() {
            match self.input[p] {
                b'\n' => {
                    self.pos = p + 1;
                    return Ok(true);
                }
                b'\r' if self.input.get(p + 1) == Some(&b'\n') => {
                    self.pos = p + 2;
                    return Ok(true);
                }
                b'\t' => {
                    return Err(LexError::TabInSource {
                        line: self.line(),
                        column: self.column(p) as u32,
                    })
                }
                b' ' => p += 1,
                _ => return Ok(false),
            }
        }
        self.pos = self.input.len();
        Ok(true)
    }

    /// Resolve this line's leading margin against the margin stack.
    fn eat_margin(&mut self) -> Result<()> {
        let mut n = 0;
        while self.input.get(self.pos + n) == Some(&b' ') {
            n += 1;
        }

        let (margin, _) = *self.margins.last().unwrap_or(&(0, true));
        let colon_open = self.last_is(TokenKind::Colon);
        let assign_open = self.last_is(TokenKind::Assign);
        let loc = self.layout_location();

        if n == margin {
            if colon_open {
                return Err(LexError::IndentExpected {
                    line: self.line(),
                    column: (n + 1) as u32,
                });
            }
            if !self.tokens.is_empty() && !self.last_is(TokenKind::Oparen) {
                self.push_basic(TokenKind::LineEnd, loc);
            }
        } else if n > margin {
            if colon_open {
                // rewrite the block-opening `:` in place, keeping its span
                if let Some(last) = self.tokens.last_mut() {
                    last.token = Token::Basic(TokenKind::Oparen);
                }
            } else if assign_open {
                self.push_basic(TokenKind::Oparen, loc);
            }
            self.margins.push((n, colon_open || assign_open));
        } else {
            if colon_open {
                return Err(LexError::IndentExpected {
                    line: self.line(),
                    column: (n + 1) as u32,
                });
            }
            while self.margins.len() > 1 && self.margins.last().is_some_and(|m| m.0 > n) {
                if self.margins.last().is_some_and(|m| m.1) {
                    self.push_basic(TokenKind::Cparen, loc);
                }
                self.margins.pop();
            }
            self.push_basic(TokenKind::LineEnd, loc);
        }

        self.pos += n;
        Ok(())
    }

    /// A leading `--` closes the current block and opens a sibling; a
    /// leading `..` collapses the separator left behind by the previous
    /// line.
    fn eat_multiline_sep(&mut self) {
        let rest = &self.input[self.pos..];
        let loc = self.layout_location();

        if rest.starts_with(b"--") {
            if self.last_is(TokenKind::LineEnd) {
                if let Some(last) = self.tokens.last_mut() {
                    *last = SourceToken::new(TokenKind::Cparen, loc);
                }
            } else {
                self.push_basic(TokenKind::Cparen, loc);
            }
            self.push_basic(TokenKind::LineEnd, loc);
            self.push_basic(TokenKind::Oparen, loc);
            self.pos += 2;
        } else if rest.starts_with(b"..") {
            let collapsible = self.last_is(TokenKind::LineEnd)
                || self.last_is(TokenKind::Semicolon)
                || self.last_is(TokenKind::Comma);
            if collapsible {
                self.tokens.pop();
            }
            self.pos += 2;
        }
    }

    /// Skip spaces and `--` comments up to the next token or end of line.
    fn eat_spaces(&mut self) -> Result<()> {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' => self.pos += 1,
                b'\t' => {
                    return Err(LexError::TabInSource {
                        line: self.line(),
                        column: self.column(self.pos) as u32,
                    })
                }
                b'-' if self.input.get(self.pos + 1) == Some(&b'-') => {
                    match memchr(b'\n', &self.input[self.pos..]) {
                        Some(off) => self.pos += off,
                        None => self.pos = self.input.len(),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Lex one token. Returns false at end of line or end of input.
    fn eat_token(&mut self) -> Result<bool> {
        let Some(&b) = self.input.get(self.pos) else {
            return Ok(false);
        };
        if b.is_ascii_digit() {
            self.eat_numeric_literal()?;
            return Ok(true);
        }
        if b == b'"' {
            self.eat_string_literal()?;
            return Ok(true);
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            self.eat_identifier();
            return Ok(true);
        }
        self.eat_basic_token()
    }

    /// Longest-match over the punctuation table.
    fn eat_basic_token(&mut self) -> Result<bool> {
        let rest = &self.input[self.pos..];
        for &kind in PUNCT_LONGEST_FIRST {
            let symbol = kind.symbol().as_bytes();
            if rest.starts_with(symbol) {
                let first_col = self.column(self.pos);
                self.pos += symbol.len();
                let loc = Location::new(self.line(), first_col, self.column(self.pos));
                self.push_basic(kind, loc);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Identifier or reserved word.
    fn eat_identifier(&mut self) {
        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            self.pos += 1;
        }
        let word = &self.text[start..self.pos];
        let loc = Location::new(self.line(), self.column(start), self.column(self.pos));
        let token = match KEYWORDS.get(word) {
            Some(kind) => Token::Basic(*kind),
            None => Token::Ident(word.to_string()),
        };
        self.tokens.push(SourceToken::new(token, loc));
    }

    /// `"..."` with escapes `\"`, `\\`, `\n`, `\t`.
    fn eat_string_literal(&mut self) -> Result<()> {
        let start = self.pos;
        let line = self.line();
        let unterminated = LexError::UnterminatedString {
            line,
            column: self.column(start) as u32,
        };

        let mut value = String::new();
        let mut p = self.pos + 1;
        let mut segment = p;
        loop {
            let Some(&b) = self.input.get(p) else {
                return Err(unterminated);
            };
            match b {
                b'"' => {
                    value.push_str(&self.text[segment..p]);
                    p += 1;
                    break;
                }
                b'\\' => {
                    value.push_str(&self.text[segment..p]);
                    match self.input.get(p + 1) {
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(&other) => {
                            return Err(LexError::UnknownEscape {
                                escape: other as char,
                                line,
                                column: self.column(p) as u32,
                            })
                        }
                        None => return Err(unterminated),
                    }
                    p += 2;
                    segment = p;
                }
                b'\n' | b'\r' => return Err(unterminated),
                _ => p += 1,
            }
        }
        self.pos = p;
        let loc = Location::new(line, self.column(start), self.column(self.pos));
        self.tokens.push(SourceToken::new(Token::Str(value), loc));
        Ok(())
    }

    fn numeric_error(&self, reason: &str) -> LexError {
        LexError::BadNumericLiteral {
            reason: reason.to_string(),
            line: self.line(),
            column: self.column(self.pos) as u32,
        }
    }

    /// Digits of `base` with `_` separators allowed between digits.
    fn eat_digits(&mut self, base: u64) -> Result<Option<u64>> {
        let mut value: u64 = 0;
        let mut digits = 0usize;
        while let Some(&b) = self.input.get(self.pos) {
            let v = match (base, b) {
                (_, b'0'..=b'9') if u64::from(b - b'0') < base => u64::from(b - b'0'),
                (16, b'a'..=b'f') => u64::from(b - b'a' + 10),
                (16, b'A'..=b'F') => u64::from(b - b'A' + 10),
                (_, b'_') if digits > 0 => {
                    self.pos += 1;
                    continue;
                }
                _ => break,
            };
            value = value
                .checked_mul(base)
                .and_then(|x| x.checked_add(v))
                .ok_or_else(|| self.numeric_error("literal overflows 64 bits"))?;
            digits += 1;
            self.pos += 1;
        }
        Ok(if digits == 0 { None } else { Some(value) })
    }

    /// Count of fraction digits alongside their value.
    fn eat_fraction_digits(&mut self, base: u64) -> Result<Option<(u64, u32)>> {
        let before = self.pos;
        let value = self.eat_digits(base)?;
        let written = self.input[before..self.pos].iter().filter(|b| **b != b'_').count();
        Ok(value.map(|v| (v, written as u32)))
    }

    /// Width suffix digits: `8`, `16`, `32` or `64` (subset per caller).
    fn eat_width(&mut self, allowed: &[u8]) -> Result<u8> {
        let rest = &self.input[self.pos..];
        for &width in allowed {
            let digits: &[u8] = match width {
                8 => b"8",
                16 => b"16",
                32 => b"32",
                64 => b"64",
                _ => continue,
            };
            if rest.starts_with(digits)
                && !self
                    .input
                    .get(self.pos + digits.len())
                    .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
            {
                self.pos += digits.len();
                return Ok(width);
            }
        }
        Err(self.numeric_error("invalid width suffix"))
    }

    /// Numeric literal: base prefixes, `_` separators, fraction and
    /// exponent forms, and signedness/width suffixes.
    fn eat_numeric_literal(&mut self) -> Result<()> {
        let start = self.pos;
        let line = self.line();
        let first_col = self.column(start);
        let rest = &self.input[self.pos..];

        let (base, value) = if rest.starts_with(b"0x") {
            self.pos += 2;
            let v = self
                .eat_digits(16)?
                .ok_or_else(|| self.numeric_error("missing digits after 0x"))?;
            (16, v)
        } else if rest.starts_with(b"0b") {
            self.pos += 2;
            let v = self
                .eat_digits(2)?
                .ok_or_else(|| self.numeric_error("missing digits after 0b"))?;
            (2, v)
        } else if rest.starts_with(b"0") && rest.len() > 1 {
            self.pos += 1;
            match self.eat_digits(8)? {
                Some(v) => (8, v),
                None => (10, 0),
            }
        } else {
            let v = self
                .eat_digits(10)?
                .ok_or_else(|| self.numeric_error("missing digits"))?;
            (10, v)
        };

        let next = self.input.get(self.pos).copied();
        let is_fraction = next == Some(b'.')
            && self.input.get(self.pos + 1).is_some_and(u8::is_ascii_digit);

        if matches!(next, Some(b'e' | b'E')) || is_fraction {
            return self.eat_float_tail(line, first_col, base, value, is_fraction);
        }

        // integral: suffix or separator
        let (signedness, width) = match next {
            Some(b'i') => {
                self.pos += 1;
                (Signedness::Signed, self.eat_width(&[16, 32, 64, 8])?)
            }
            Some(b'u') => {
                self.pos += 1;
                (Signedness::Unsigned, self.eat_width(&[16, 32, 64, 8])?)
            }
            Some(b'f') => {
                self.pos += 1;
                let width = self.eat_width(&[32, 64])?;
                let loc = Location::new(line, first_col, self.column(self.pos));
                self.tokens
                    .push(SourceToken::new(Token::Float(FloatLit::new(value as f64, width)), loc));
                return Ok(());
            }
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                return Err(self.numeric_error("invalid integer suffix"));
            }
            _ => (Signedness::Unspecified, 0),
        };

        let loc = Location::new(line, first_col, self.column(self.pos));
        self.tokens
            .push(SourceToken::new(Token::Int(IntLit::new(value, signedness, width)), loc));
        Ok(())
    }

    /// Fraction and/or exponent part of a floating point literal.
    fn eat_float_tail(
        &mut self,
        line: u32,
        first_col: u16,
        base: u64,
        int_part: u64,
        is_fraction: bool,
    ) -> Result<()> {
        let mut value = int_part as f64;

        if is_fraction {
            self.pos += 1; // the '.'
            if let Some((frac, digits)) = self.eat_fraction_digits(base)? {
                value += frac as f64 * (base as f64).powi(-(digits as i32));
            }
        }

        if matches!(self.input.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            let negative = match self.input.get(self.pos) {
                Some(b'-') => {
                    self.pos += 1;
                    true
                }
                Some(b'+') => {
                    self.pos += 1;
                    false
                }
                _ => false,
            };
            let exponent = self
                .eat_digits(10)?
                .ok_or_else(|| self.numeric_error("missing exponent digits"))?;
            let exponent = exponent.min(i32::MAX as u64) as i32;
            value *= 10f64.powi(if negative { -exponent } else { exponent });
        }

        let width = match self.input.get(self.pos) {
            Some(b'f') => {
                self.pos += 1;
                self.eat_width(&[32, 64])?
            }
            Some(b) if b.is_ascii_alphanumeric() || *b == b'_' => {
                return Err(self.numeric_error("invalid float suffix"));
            }
            _ => 64,
        };

        let loc = Location::new(line, first_col, self.column(self.pos));
        self.tokens.push(SourceToken::new(Token::Float(FloatLit::new(value, width)), loc));
        Ok(())
    }

    fn eat_eol(&mut self) -> bool {
        match self.input.get(self.pos) {
            Some(b'\n') => {
                self.pos += 1;
                true
            }
            Some(b'\r') if self.input.get(self.pos + 1) == Some(&b'\n') => {
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    /// Close every real margin still open at end of input.
    fn pop_dedents(&mut self) {
        let loc = Location::new(self.line().max(1), 1, 1);
        while self.margins.len() > 1 {
            if self.margins.last().is_some_and(|m| m.1) {
                self.push_basic(TokenKind::Cparen, loc);
            }
            self.margins.pop();
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use quill_token::KEYWORDS;

    proptest! {
        #[test]
        fn prop_identifiers_round_trip(name in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
            prop_assume!(!KEYWORDS.contains_key(name.as_str()));
            let out = tokenize(&name).expect("tokenize");
            prop_assert_eq!(out.tokens.len(), 1);
            prop_assert_eq!(&out.tokens[0].token, &Token::Ident(name.clone()));
        }

        #[test]
        fn prop_decimal_integers_round_trip(value in any::<u32>()) {
            let out = tokenize(&value.to_string()).expect("tokenize");
            prop_assert_eq!(out.tokens.len(), 1);
            prop_assert_eq!(
                &out.tokens[0].token,
                &Token::Int(IntLit::new(u64::from(value), Signedness::Unspecified, 0))
            );
        }

        #[test]
        fn prop_layout_parens_balance(depth in 1usize..5) {
            let mut src = String::new();
            for d in 0..depth {
                src.push_str(&" ".repeat(4 * d));
                src.push_str("block:\n");
            }
            src.push_str(&" ".repeat(4 * depth));
            src.push_str("leaf\n");
            let out = tokenize(&src).expect("tokenize");
            let opens = out.tokens.iter().filter(|t| t.token.is_kind(TokenKind::Oparen)).count();
            let closes = out.tokens.iter().filter(|t| t.token.is_kind(TokenKind::Cparen)).count();
            prop_assert_eq!(opens, closes);
        }
    }
}
