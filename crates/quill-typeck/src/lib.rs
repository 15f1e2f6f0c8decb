//! Type checker for the Quill language.
//!
//! Walks a parsed tree inside a lexically scoped [`Environment`] and
//! rebuilds it with every node's attribute resolved to a type.
//! Failures are recoverable: each produces one [`Diagnostic`], the
//! offending node is tagged `unknown`, and the walk continues so a
//! single pass surfaces every error in source order.
//!
//! # Usage
//!
//! ```
//! use quill_lexer::tokenize;
//! use quill_parser::parse;
//! use quill_symbols::prelude;
//! use quill_typeck::type_check;
//!
//! let ast = parse(&tokenize("var x: int = 42").unwrap()).unwrap();
//! let (typed, diagnostics) = type_check(&ast, &prelude());
//! assert!(diagnostics.is_empty());
//! assert_eq!(typed.attribute().to_string(), "ptr(i32)");
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate, clippy::too_many_lines)]

mod checker;
mod diagnostics;

pub use checker::TypeChecker;
pub use diagnostics::{Diagnostic, DiagnosticSink};

use quill_ast::Node;
use quill_symbols::Environment;
use quill_types::Type;
use tracing::debug;

/// Type-check a parsed tree against an environment.
///
/// Returns the typed tree plus every diagnostic, in source order.
pub fn type_check(ast: &Node<()>, env: &Environment) -> (Node<Type>, Vec<Diagnostic>) {
    let mut sink = DiagnosticSink::new();
    let typed = TypeChecker::new(&mut sink).check(ast, env);
    debug!(diagnostics = sink.len(), "type checking finished");
    (typed, sink.into_diagnostics())
}
