//! Diagnostics collected by the type checker.

use quill_token::Location;
use std::fmt;

/// One recoverable type-check failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,
    /// Where in the source the problem sits
    pub location: Location,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, at {}.", self.message, self.location)
    }
}

/// Ordered collector of diagnostics.
///
/// The checker threads a `&mut DiagnosticSink` through the walk, so
/// messages come out in source order and checking never throws.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// An empty sink.
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    /// Record a diagnostic.
    pub fn report(&mut self, message: impl Into<String>, location: Location) {
        self.diagnostics.push(Diagnostic { message: message.into(), location });
    }

    /// Number of diagnostics collected so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consume the sink, yielding diagnostics in source order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
