//! Abstract syntax tree for the Quill front end.
//!
//! The tree is a single sum type [`Tree<A>`] parameterised by an
//! attribute: `()` out of the parser, a resolved type out of the type
//! checker. Nodes are shared handles ([`Node<A>`]) carrying a source
//! location and the attribute slot, so rebuilt trees can share unchanged
//! subtrees structurally (the parser never constructs a cycle).
//!
//! [`walk`] contains the generic rebuild combinator: a synthesised
//! (bottom-up) and an inherited (top-down) walk over the tree,
//! dispatching per-variant handlers supplied by the caller.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod ast;
pub mod walk;

pub use ast::{CaptureParam, Field, FnExpr, IfExpr, Node, Tree, VarDef};
pub use walk::{walk_inherit, walk_synth, InheritHandler, SynthHandler, WalkError};
