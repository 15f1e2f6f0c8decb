//! Generic attribute walks.
//!
//! Both walks rebuild a tree one-for-one, preserving locations and
//! variant shape, while computing a fresh attribute per node. They
//! differ only in when the per-variant handler fires and what it sees:
//!
//! - [`walk_synth`] (bottom-up): children are rebuilt first; the handler
//!   for a variant receives the *reconstructed* variant (with output
//!   attributes on the children) plus the node's input attribute.
//! - [`walk_inherit`] (top-down): the handler receives the *input*
//!   variant plus the attribute computed for the parent, and its result
//!   becomes the attribute the children see.
//!
//! Handlers are trait methods, one per variant, all defaulted to "no
//! handler" — a node whose variant has no handler gets `Out::default()`.

use crate::ast::{CaptureParam, Field, FnExpr, IfExpr, Node, Tree, VarDef};
use quill_token::{FloatLit, IntLit, Location, TokenKind};

/// Walk failure: the tree contained a variant that must not survive
/// parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    /// An `Elif` or `Else` node not folded into an `If`
    DanglingBranch {
        /// Location of the offending node
        location: Location,
    },
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkError::DanglingBranch { location } => {
                write!(f, "dangling elif/else branch at {location}")
            }
        }
    }
}

impl std::error::Error for WalkError {}

macro_rules! default_handlers {
    ($attr:ty, $node:ty, $fields:ty, $extra:ty) => {
        /// Hole node
        fn unit(&mut self, extra: &$extra) -> Option<$attr> {
            let _ = extra;
            None
        }
        /// Integer literal
        fn int_lit(&mut self, lit: &IntLit, extra: &$extra) -> Option<$attr> {
            let _ = (lit, extra);
            None
        }
        /// Float literal
        fn float_lit(&mut self, lit: &FloatLit, extra: &$extra) -> Option<$attr> {
            let _ = (lit, extra);
            None
        }
        /// String literal
        fn str_lit(&mut self, value: &str, extra: &$extra) -> Option<$attr> {
            let _ = (value, extra);
            None
        }
        /// `true`
        fn true_lit(&mut self, extra: &$extra) -> Option<$attr> {
            let _ = extra;
            None
        }
        /// `false`
        fn false_lit(&mut self, extra: &$extra) -> Option<$attr> {
            let _ = extra;
            None
        }
        /// Identifier
        fn ident(&mut self, name: &str, extra: &$extra) -> Option<$attr> {
            let _ = (name, extra);
            None
        }
        /// Primitive type marker
        fn prim_type(&mut self, kind: TokenKind, extra: &$extra) -> Option<$attr> {
            let _ = (kind, extra);
            None
        }
        /// Statement block
        fn block(&mut self, stmts: &[$node], extra: &$extra) -> Option<$attr> {
            let _ = (stmts, extra);
            None
        }
        /// Data list
        fn data(&mut self, items: &[$node], extra: &$extra) -> Option<$attr> {
            let _ = (items, extra);
            None
        }
        /// Unary operator
        fn unary_op(&mut self, op: TokenKind, operand: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (op, operand, extra);
            None
        }
        /// Binary operator
        fn bin_op(
            &mut self,
            op: TokenKind,
            lhs: &$node,
            rhs: &$node,
            extra: &$extra,
        ) -> Option<$attr> {
            let _ = (op, lhs, rhs, extra);
            None
        }
        /// Invocation
        fn invoc(&mut self, target: &$node, arguments: &[$node], extra: &$extra) -> Option<$attr> {
            let _ = (target, arguments, extra);
            None
        }
        /// Conditional
        fn if_expr(&mut self, expr: &IfExpr<$fields>, extra: &$extra) -> Option<$attr> {
            let _ = (expr, extra);
            None
        }
        /// Function expression
        fn fn_expr(&mut self, expr: &FnExpr<$fields>, extra: &$extra) -> Option<$attr> {
            let _ = (expr, extra);
            None
        }
        /// Variable definition
        fn var_def(&mut self, def: &VarDef<$fields>, extra: &$extra) -> Option<$attr> {
            let _ = (def, extra);
            None
        }
        /// For loop
        fn for_loop(
            &mut self,
            var: &str,
            iterable: &$node,
            body: &$node,
            extra: &$extra,
        ) -> Option<$attr> {
            let _ = (var, iterable, body, extra);
            None
        }
        /// While loop
        fn while_loop(&mut self, test: &$node, body: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (test, body, extra);
            None
        }
        /// `break`
        fn break_stmt(&mut self, extra: &$extra) -> Option<$attr> {
            let _ = extra;
            None
        }
        /// `continue`
        fn continue_stmt(&mut self, extra: &$extra) -> Option<$attr> {
            let _ = extra;
            None
        }
        /// `return`
        fn return_stmt(&mut self, value: Option<&$node>, extra: &$extra) -> Option<$attr> {
            let _ = (value, extra);
            None
        }
        /// `yield`
        fn yield_stmt(&mut self, value: Option<&$node>, extra: &$extra) -> Option<$attr> {
            let _ = (value, extra);
            None
        }
        /// Struct type expression
        fn struct_def(&mut self, fields: &[Field<$fields>], extra: &$extra) -> Option<$attr> {
            let _ = (fields, extra);
            None
        }
        /// Nominal type definition
        fn def_type(&mut self, name: &str, body: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (name, body, extra);
            None
        }
        /// Type alias
        fn let_type(&mut self, name: &str, body: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (name, body, extra);
            None
        }
        /// Template definition
        fn template(
            &mut self,
            params: &[Field<$fields>],
            body: &$node,
            extra: &$extra,
        ) -> Option<$attr> {
            let _ = (params, body, extra);
            None
        }
        /// Type-context wrapper
        fn type_expr(&mut self, inner: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (inner, extra);
            None
        }
        /// Assignment
        fn assign(&mut self, lhs: &$node, rhs: &$node, extra: &$extra) -> Option<$attr> {
            let _ = (lhs, rhs, extra);
            None
        }
    };
}

/// Per-variant handlers for the synthesised (bottom-up) walk.
///
/// Each method sees the reconstructed variant (children already carry
/// output attributes) and the node's input attribute; returning `None`
/// leaves the node with `Out::default()`.
pub trait SynthHandler<In, Out: Default> {
    default_handlers!(Out, Node<Out>, Out, In);
}

/// Per-variant handlers for the inherited (top-down) walk.
///
/// Each method sees the *input* variant and the attribute computed for
/// the node's parent; its result becomes the attribute the children
/// inherit. Returning `None` leaves the node with `Out::default()`.
pub trait InheritHandler<In, Out: Default> {
    default_handlers!(Out, Node<In>, In, Out);
}

/// Bottom-up rebuild of a tree, synthesising attributes.
pub fn walk_synth<In, Out, H>(node: &Node<In>, handler: &mut H) -> Result<Node<Out>, WalkError>
where
    Out: Default,
    H: SynthHandler<In, Out>,
{
    let location = node.location();
    let kind = rebuild_synth(node, handler)?;
    let attr = dispatch_synth(handler, &kind, node.attribute()).unwrap_or_default();
    Ok(Node::new(kind, location, attr))
}

fn rebuild_synth<In, Out, H>(node: &Node<In>, handler: &mut H) -> Result<Tree<Out>, WalkError>
where
    Out: Default,
    H: SynthHandler<In, Out>,
{
    let walk_all = |nodes: &[Node<In>], handler: &mut H| -> Result<Vec<Node<Out>>, WalkError> {
        nodes.iter().map(|n| walk_synth(n, handler)).collect()
    };
    Ok(match node.kind() {
        Tree::Unit => Tree::Unit,
        Tree::Int(lit) => Tree::Int(*lit),
        Tree::Float(lit) => Tree::Float(*lit),
        Tree::Str(value) => Tree::Str(value.clone()),
        Tree::True => Tree::True,
        Tree::False => Tree::False,
        Tree::Ident(name) => Tree::Ident(name.clone()),
        Tree::PrimType(kind) => Tree::PrimType(*kind),
        Tree::Block(stmts) => Tree::Block(walk_all(stmts, handler)?),
        Tree::Data(items) => Tree::Data(walk_all(items, handler)?),
        Tree::UnaryOp { op, operand } => {
            Tree::UnaryOp { op: *op, operand: walk_synth(operand, handler)? }
        }
        Tree::BinOp { op, lhs, rhs } => Tree::BinOp {
            op: *op,
            lhs: walk_synth(lhs, handler)?,
            rhs: walk_synth(rhs, handler)?,
        },
        Tree::Invoc { target, arguments } => Tree::Invoc {
            target: walk_synth(target, handler)?,
            arguments: walk_all(arguments, handler)?,
        },
        Tree::If(if_expr) => Tree::If(IfExpr {
            elif_tests: walk_all(&if_expr.elif_tests, handler)?,
            elif_branches: walk_all(&if_expr.elif_branches, handler)?,
            else_branch: if_expr
                .else_branch
                .as_ref()
                .map(|n| walk_synth(n, handler))
                .transpose()?,
        }),
        Tree::Elif { .. } | Tree::Else { .. } => {
            return Err(WalkError::DanglingBranch { location: node.location() })
        }
        Tree::FnExpr(fn_expr) => Tree::FnExpr(FnExpr {
            arg_names: fn_expr.arg_names.clone(),
            arg_types: walk_all(&fn_expr.arg_types, handler)?,
            result_type: fn_expr
                .result_type
                .as_ref()
                .map(|n| walk_synth(n, handler))
                .transpose()?,
            body: walk_synth(&fn_expr.body, handler)?,
            captures: fn_expr
                .captures
                .iter()
                .map(|c| {
                    Ok(CaptureParam {
                        by_var: c.by_var,
                        name: c.name.clone(),
                        init: c.init.as_ref().map(|n| walk_synth(n, handler)).transpose()?,
                    })
                })
                .collect::<Result<_, WalkError>>()?,
        }),
        Tree::VarDef(def) => Tree::VarDef(VarDef {
            name: def.name.clone(),
            declared_type: def
                .declared_type
                .as_ref()
                .map(|n| walk_synth(n, handler))
                .transpose()?,
            rhs: def.rhs.as_ref().map(|n| walk_synth(n, handler)).transpose()?,
        }),
        Tree::For { var, iterable, body } => Tree::For {
            var: var.clone(),
            iterable: walk_synth(iterable, handler)?,
            body: walk_synth(body, handler)?,
        },
        Tree::While { test, body } => Tree::While {
            test: walk_synth(test, handler)?,
            body: walk_synth(body, handler)?,
        },
        Tree::Break => Tree::Break,
        Tree::Continue => Tree::Continue,
        Tree::Return(value) => {
            Tree::Return(value.as_ref().map(|n| walk_synth(n, handler)).transpose()?)
        }
        Tree::Yield(value) => {
            Tree::Yield(value.as_ref().map(|n| walk_synth(n, handler)).transpose()?)
        }
        Tree::Struct(fields) => Tree::Struct(walk_fields_synth(fields, handler)?),
        Tree::DefType { name, body } => {
            Tree::DefType { name: name.clone(), body: walk_synth(body, handler)? }
        }
        Tree::LetType { name, body } => {
            Tree::LetType { name: name.clone(), body: walk_synth(body, handler)? }
        }
        Tree::Template { params, body } => Tree::Template {
            params: walk_fields_synth(params, handler)?,
            body: walk_synth(body, handler)?,
        },
        Tree::TypeExpr(inner) => Tree::TypeExpr(walk_synth(inner, handler)?),
        Tree::Assign { lhs, rhs } => Tree::Assign {
            lhs: walk_synth(lhs, handler)?,
            rhs: walk_synth(rhs, handler)?,
        },
    })
}

fn walk_fields_synth<In, Out, H>(
    fields: &[Field<In>],
    handler: &mut H,
) -> Result<Vec<Field<Out>>, WalkError>
where
    Out: Default,
    H: SynthHandler<In, Out>,
{
    fields
        .iter()
        .map(|f| Ok(Field { name: f.name.clone(), ty: walk_synth(&f.ty, handler)? }))
        .collect()
}

fn dispatch_synth<In, Out, H>(handler: &mut H, kind: &Tree<Out>, input: &In) -> Option<Out>
where
    Out: Default,
    H: SynthHandler<In, Out>,
{
    match kind {
        Tree::Unit => handler.unit(input),
        Tree::Int(lit) => handler.int_lit(lit, input),
        Tree::Float(lit) => handler.float_lit(lit, input),
        Tree::Str(value) => handler.str_lit(value, input),
        Tree::True => handler.true_lit(input),
        Tree::False => handler.false_lit(input),
        Tree::Ident(name) => handler.ident(name, input),
        Tree::PrimType(kind) => handler.prim_type(*kind, input),
        Tree::Block(stmts) => handler.block(stmts, input),
        Tree::Data(items) => handler.data(items, input),
        Tree::UnaryOp { op, operand } => handler.unary_op(*op, operand, input),
        Tree::BinOp { op, lhs, rhs } => handler.bin_op(*op, lhs, rhs, input),
        Tree::Invoc { target, arguments } => handler.invoc(target, arguments, input),
        Tree::If(if_expr) => handler.if_expr(if_expr, input),
        Tree::Elif { .. } | Tree::Else { .. } => None,
        Tree::FnExpr(fn_expr) => handler.fn_expr(fn_expr, input),
        Tree::VarDef(def) => handler.var_def(def, input),
        Tree::For { var, iterable, body } => handler.for_loop(var, iterable, body, input),
        Tree::While { test, body } => handler.while_loop(test, body, input),
        Tree::Break => handler.break_stmt(input),
        Tree::Continue => handler.continue_stmt(input),
        Tree::Return(value) => handler.return_stmt(value.as_ref(), input),
        Tree::Yield(value) => handler.yield_stmt(value.as_ref(), input),
        Tree::Struct(fields) => handler.struct_def(fields, input),
        Tree::DefType { name, body } => handler.def_type(name, body, input),
        Tree::LetType { name, body } => handler.let_type(name, body, input),
        Tree::Template { params, body } => handler.template(params, body, input),
        Tree::TypeExpr(inner) => handler.type_expr(inner, input),
        Tree::Assign { lhs, rhs } => handler.assign(lhs, rhs, input),
    }
}

/// Top-down rebuild of a tree, inheriting attributes from the parent.
///
/// `inherited` is the attribute visible to the root's handler (the
/// caller's seed value).
pub fn walk_inherit<In, Out, H>(
    node: &Node<In>,
    inherited: &Out,
    handler: &mut H,
) -> Result<Node<Out>, WalkError>
where
    Out: Default,
    H: InheritHandler<In, Out>,
{
    let location = node.location();
    let attr = dispatch_inherit(handler, node.kind(), inherited).unwrap_or_default();
    let kind = rebuild_inherit(node, &attr, handler)?;
    Ok(Node::new(kind, location, attr))
}

fn rebuild_inherit<In, Out, H>(
    node: &Node<In>,
    attr: &Out,
    handler: &mut H,
) -> Result<Tree<Out>, WalkError>
where
    Out: Default,
    H: InheritHandler<In, Out>,
{
    let walk_all = |nodes: &[Node<In>],
                    attr: &Out,
                    handler: &mut H|
     -> Result<Vec<Node<Out>>, WalkError> {
        nodes.iter().map(|n| walk_inherit(n, attr, handler)).collect()
    };
    Ok(match node.kind() {
        Tree::Unit => Tree::Unit,
        Tree::Int(lit) => Tree::Int(*lit),
        Tree::Float(lit) => Tree::Float(*lit),
        Tree::Str(value) => Tree::Str(value.clone()),
        Tree::True => Tree::True,
        Tree::False => Tree::False,
        Tree::Ident(name) => Tree::Ident(name.clone()),
        Tree::PrimType(kind) => Tree::PrimType(*kind),
        Tree::Block(stmts) => Tree::Block(walk_all(stmts, attr, handler)?),
        Tree::Data(items) => Tree::Data(walk_all(items, attr, handler)?),
        Tree::UnaryOp { op, operand } => {
            Tree::UnaryOp { op: *op, operand: walk_inherit(operand, attr, handler)? }
        }
        Tree::BinOp { op, lhs, rhs } => Tree::BinOp {
            op: *op,
            lhs: walk_inherit(lhs, attr, handler)?,
            rhs: walk_inherit(rhs, attr, handler)?,
        },
        Tree::Invoc { target, arguments } => Tree::Invoc {
            target: walk_inherit(target, attr, handler)?,
            arguments: walk_all(arguments, attr, handler)?,
        },
        Tree::If(if_expr) => Tree::If(IfExpr {
            elif_tests: walk_all(&if_expr.elif_tests, attr, handler)?,
            elif_branches: walk_all(&if_expr.elif_branches, attr, handler)?,
            else_branch: if_expr
                .else_branch
                .as_ref()
                .map(|n| walk_inherit(n, attr, handler))
                .transpose()?,
        }),
        Tree::Elif { .. } | Tree::Else { .. } => {
            return Err(WalkError::DanglingBranch { location: node.location() })
        }
        Tree::FnExpr(fn_expr) => Tree::FnExpr(FnExpr {
            arg_names: fn_expr.arg_names.clone(),
            arg_types: walk_all(&fn_expr.arg_types, attr, handler)?,
            result_type: fn_expr
                .result_type
                .as_ref()
                .map(|n| walk_inherit(n, attr, handler))
                .transpose()?,
            body: walk_inherit(&fn_expr.body, attr, handler)?,
            captures: fn_expr
                .captures
                .iter()
                .map(|c| {
                    Ok(CaptureParam {
                        by_var: c.by_var,
                        name: c.name.clone(),
                        init: c
                            .init
                            .as_ref()
                            .map(|n| walk_inherit(n, attr, handler))
                            .transpose()?,
                    })
                })
                .collect::<Result<_, WalkError>>()?,
        }),
        Tree::VarDef(def) => Tree::VarDef(VarDef {
            name: def.name.clone(),
            declared_type: def
                .declared_type
                .as_ref()
                .map(|n| walk_inherit(n, attr, handler))
                .transpose()?,
            rhs: def.rhs.as_ref().map(|n| walk_inherit(n, attr, handler)).transpose()?,
        }),
        Tree::For { var, iterable, body } => Tree::For {
            var: var.clone(),
            iterable: walk_inherit(iterable, attr, handler)?,
            body: walk_inherit(body, attr, handler)?,
        },
        Tree::While { test, body } => Tree::While {
            test: walk_inherit(test, attr, handler)?,
            body: walk_inherit(body, attr, handler)?,
        },
        Tree::Break => Tree::Break,
        Tree::Continue => Tree::Continue,
        Tree::Return(value) => {
            Tree::Return(value.as_ref().map(|n| walk_inherit(n, attr, handler)).transpose()?)
        }
        Tree::Yield(value) => {
            Tree::Yield(value.as_ref().map(|n| walk_inherit(n, attr, handler)).transpose()?)
        }
        Tree::Struct(fields) => Tree::Struct(walk_fields_inherit(fields, attr, handler)?),
        Tree::DefType { name, body } => {
            Tree::DefType { name: name.clone(), body: walk_inherit(body, attr, handler)? }
        }
        Tree::LetType { name, body } => {
            Tree::LetType { name: name.clone(), body: walk_inherit(body, attr, handler)? }
        }
        Tree::Template { params, body } => Tree::Template {
            params: walk_fields_inherit(params, attr, handler)?,
            body: walk_inherit(body, attr, handler)?,
        },
        Tree::TypeExpr(inner) => Tree::TypeExpr(walk_inherit(inner, attr, handler)?),
        Tree::Assign { lhs, rhs } => Tree::Assign {
            lhs: walk_inherit(lhs, attr, handler)?,
            rhs: walk_inherit(rhs, attr, handler)?,
        },
    })
}

fn walk_fields_inherit<In, Out, H>(
    fields: &[Field<In>],
    attr: &Out,
    handler: &mut H,
) -> Result<Vec<Field<Out>>, WalkError>
where
    Out: Default,
    H: InheritHandler<In, Out>,
{
    fields
        .iter()
        .map(|f| Ok(Field { name: f.name.clone(), ty: walk_inherit(&f.ty, attr, handler)? }))
        .collect()
}

fn dispatch_inherit<In, Out, H>(handler: &mut H, kind: &Tree<In>, inherited: &Out) -> Option<Out>
where
    Out: Default,
    H: InheritHandler<In, Out>,
{
    match kind {
        Tree::Unit => handler.unit(inherited),
        Tree::Int(lit) => handler.int_lit(lit, inherited),
        Tree::Float(lit) => handler.float_lit(lit, inherited),
        Tree::Str(value) => handler.str_lit(value, inherited),
        Tree::True => handler.true_lit(inherited),
        Tree::False => handler.false_lit(inherited),
        Tree::Ident(name) => handler.ident(name, inherited),
        Tree::PrimType(kind) => handler.prim_type(*kind, inherited),
        Tree::Block(stmts) => handler.block(stmts, inherited),
        Tree::Data(items) => handler.data(items, inherited),
        Tree::UnaryOp { op, operand } => handler.unary_op(*op, operand, inherited),
        Tree::BinOp { op, lhs, rhs } => handler.bin_op(*op, lhs, rhs, inherited),
        Tree::Invoc { target, arguments } => handler.invoc(target, arguments, inherited),
        Tree::If(if_expr) => handler.if_expr(if_expr, inherited),
        Tree::Elif { .. } | Tree::Else { .. } => None,
        Tree::FnExpr(fn_expr) => handler.fn_expr(fn_expr, inherited),
        Tree::VarDef(def) => handler.var_def(def, inherited),
        Tree::For { var, iterable, body } => handler.for_loop(var, iterable, body, inherited),
        Tree::While { test, body } => handler.while_loop(test, body, inherited),
        Tree::Break => handler.break_stmt(inherited),
        Tree::Continue => handler.continue_stmt(inherited),
        Tree::Return(value) => handler.return_stmt(value.as_ref(), inherited),
        Tree::Yield(value) => handler.yield_stmt(value.as_ref(), inherited),
        Tree::Struct(fields) => handler.struct_def(fields, inherited),
        Tree::DefType { name, body } => handler.def_type(name, body, inherited),
        Tree::LetType { name, body } => handler.let_type(name, body, inherited),
        Tree::Template { params, body } => handler.template(params, body, inherited),
        Tree::TypeExpr(inner) => handler.type_expr(inner, inherited),
        Tree::Assign { lhs, rhs } => handler.assign(lhs, rhs, inherited),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_token::Signedness;

    fn loc() -> Location {
        Location::new(1, 1, 1)
    }

    fn plain(kind: Tree<()>) -> Node<()> {
        Node::plain(kind, loc())
    }

    fn int(v: u64) -> Node<()> {
        plain(Tree::Int(IntLit::new(v, Signedness::Unspecified, 0)))
    }

    /// Synthesises a string "type" for literals and propagates it
    /// through binary operators bottom-up.
    struct LitTyper;

    impl SynthHandler<(), String> for LitTyper {
        fn int_lit(&mut self, _: &IntLit, _: &()) -> Option<String> {
            Some("int".to_string())
        }

        fn bin_op(
            &mut self,
            op: TokenKind,
            lhs: &Node<String>,
            rhs: &Node<String>,
            _: &(),
        ) -> Option<String> {
            Some(format!("({} {} {})", lhs.attribute(), op.symbol(), rhs.attribute()))
        }
    }

    #[test]
    fn test_synth_walk_fires_bottom_up() {
        let tree = plain(Tree::BinOp {
            op: TokenKind::Plus,
            lhs: int(1),
            rhs: plain(Tree::BinOp { op: TokenKind::Star, lhs: int(2), rhs: int(3) }),
        });
        let out = walk_synth(&tree, &mut LitTyper).expect("walk");
        assert_eq!(out.attribute(), "(int + (int * int))");
        // unhandled variants get the default attribute
        let unit = walk_synth(&plain(Tree::Unit), &mut LitTyper).expect("walk");
        assert_eq!(unit.attribute(), "");
    }

    /// Inherits a nesting depth: blocks deepen, everything else passes
    /// the parent's depth through.
    struct Depth;

    impl InheritHandler<(), u32> for Depth {
        fn block(&mut self, _: &[Node<()>], inherited: &u32) -> Option<u32> {
            Some(inherited + 1)
        }

        fn ident(&mut self, _: &str, inherited: &u32) -> Option<u32> {
            Some(*inherited)
        }
    }

    #[test]
    fn test_inherit_walk_fires_top_down() {
        let tree = plain(Tree::Block(vec![plain(Tree::Block(vec![plain(Tree::Ident(
            "x".to_string(),
        ))]))]));
        let out = walk_inherit(&tree, &0, &mut Depth).expect("walk");
        assert_eq!(*out.attribute(), 1);
        let Tree::Block(outer) = out.kind() else { panic!("expected block") };
        let Tree::Block(inner) = outer[0].kind() else { panic!("expected block") };
        assert_eq!(*outer[0].attribute(), 2);
        assert_eq!(*inner[0].attribute(), 2);
    }

    #[test]
    fn test_walks_preserve_shape_and_location() {
        let tree = Node::plain(
            Tree::Invoc { target: plain(Tree::Ident("f".to_string())), arguments: vec![int(1)] },
            Location::new(3, 2, 9),
        );
        let out: Node<u32> = walk_inherit(&tree, &7, &mut Depth).expect("walk");
        assert_eq!(out.location(), Location::new(3, 2, 9));
        assert!(matches!(out.kind(), Tree::Invoc { arguments, .. } if arguments.len() == 1));
    }

    #[test]
    fn test_dangling_elif_is_an_error() {
        let tree = plain(Tree::Block(vec![plain(Tree::Elif {
            test: plain(Tree::True),
            body: int(1),
        })]));
        assert_eq!(
            walk_synth::<_, String, _>(&tree, &mut LitTyper),
            Err(WalkError::DanglingBranch { location: loc() })
        );
        assert_eq!(
            walk_inherit(&tree, &0, &mut Depth),
            Err(WalkError::DanglingBranch { location: loc() })
        );
    }
}
