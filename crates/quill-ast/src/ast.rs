//! Tree and node types.

use std::fmt;
use std::rc::Rc;

use quill_token::{FloatLit, IntLit, Location, TokenKind};

/// One variant of the Quill syntax tree, generic over the attribute `A`
/// every node carries.
///
/// The parser produces `Tree<()>`; the type checker rebuilds the same
/// shape as `Tree<Type>`. `Unit` is the "unit-value node" used as a hole
/// where the grammar allows an omitted part (for example an
/// unannotated function parameter).
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<A> {
    /// Hole for an omitted sub-expression
    Unit,
    /// Integer literal
    Int(IntLit),
    /// Floating point literal
    Float(FloatLit),
    /// String literal
    Str(String),
    /// Boolean literal `true`
    True,
    /// Boolean literal `false`
    False,
    /// Identifier reference
    Ident(String),
    /// Built-in type name used as an expression atom
    PrimType(TokenKind),
    /// Statement sequence
    Block(Vec<Node<A>>),
    /// Comma/semicolon expression list (argument or tuple context)
    Data(Vec<Node<A>>),
    /// Prefix operator application
    UnaryOp {
        /// Operator token
        op: TokenKind,
        /// Operand
        operand: Node<A>,
    },
    /// Infix operator application
    BinOp {
        /// Operator token
        op: TokenKind,
        /// Left operand
        lhs: Node<A>,
        /// Right operand
        rhs: Node<A>,
    },
    /// Invocation `target(arguments)`
    Invoc {
        /// Invoked expression
        target: Node<A>,
        /// Argument pack, in source order
        arguments: Vec<Node<A>>,
    },
    /// Conditional with one test/branch pair per `if`/`elif`
    If(IfExpr<A>),
    /// Transient `elif` — folded into the preceding `If` by the parser
    Elif {
        /// Branch test
        test: Node<A>,
        /// Branch body
        body: Node<A>,
    },
    /// Transient `else` — folded into the preceding `If` by the parser
    Else {
        /// Branch body
        body: Node<A>,
    },
    /// Function expression
    FnExpr(FnExpr<A>),
    /// Variable definition
    VarDef(VarDef<A>),
    /// Iterator loop `for (x: xs) body`
    For {
        /// Loop variable name
        var: String,
        /// Iterated expression
        iterable: Node<A>,
        /// Loop body
        body: Node<A>,
    },
    /// While loop
    While {
        /// Loop test
        test: Node<A>,
        /// Loop body
        body: Node<A>,
    },
    /// Loop exit
    Break,
    /// Loop continuation
    Continue,
    /// Return with optional value
    Return(Option<Node<A>>),
    /// Yield with optional value
    Yield(Option<Node<A>>),
    /// Structure type expression: ordered `(name, type)` fields
    Struct(Vec<Field<A>>),
    /// Nominal type definition `type Name = T`
    DefType {
        /// Introduced type name
        name: String,
        /// Underlying type expression
        body: Node<A>,
    },
    /// Type alias `alias Name = T`
    LetType {
        /// Alias name
        name: String,
        /// Aliased type expression
        body: Node<A>,
    },
    /// Parameterised definition
    Template {
        /// Template parameters
        params: Vec<Field<A>>,
        /// Template body
        body: Node<A>,
    },
    /// Marks its child as being in type context
    TypeExpr(Node<A>),
    /// Assignment statement
    Assign {
        /// Assignment target
        lhs: Node<A>,
        /// Assigned value
        rhs: Node<A>,
    },
}

/// Test/branch vectors of an `if`/`elif`/`else` chain.
///
/// Invariant: `elif_tests.len() == elif_branches.len() >= 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IfExpr<A> {
    /// One test per `if`/`elif`, in source order
    pub elif_tests: Vec<Node<A>>,
    /// The branch bodies, aligned with `elif_tests`
    pub elif_branches: Vec<Node<A>>,
    /// Optional trailing `else` body
    pub else_branch: Option<Node<A>>,
}

/// A function expression.
///
/// Invariant: `arg_types.len() == arg_names.len()`; a parameter without
/// a written annotation has a [`Tree::Unit`] hole in `arg_types`.
#[derive(Debug, Clone, PartialEq)]
pub struct FnExpr<A> {
    /// Parameter names, in source order
    pub arg_names: Vec<String>,
    /// Parameter type expressions, aligned with `arg_names`
    pub arg_types: Vec<Node<A>>,
    /// Declared result type, if written
    pub result_type: Option<Node<A>>,
    /// Function body
    pub body: Node<A>,
    /// Captures written after `with`
    pub captures: Vec<CaptureParam<A>>,
}

/// One capture in a function expression's `with` list.
///
/// At least one of `name` and `init` is present; `by_var` records a
/// leading `var`. Semantic elaboration of captures happens in a later
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureParam<A> {
    /// Capture marked `var`
    pub by_var: bool,
    /// Captured name, if written
    pub name: Option<String>,
    /// Capture initialiser, if written
    pub init: Option<Node<A>>,
}

/// A variable definition `var name [: type] [= rhs]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef<A> {
    /// Variable name
    pub name: String,
    /// Declared type expression, if written
    pub declared_type: Option<Node<A>>,
    /// Initialiser, if written
    pub rhs: Option<Node<A>>,
}

/// A named field of a struct or template parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<A> {
    /// Field name
    pub name: String,
    /// Field type expression
    pub ty: Node<A>,
}

/// Shared handle to a tree node: variant, location, attribute.
///
/// Cloning is cheap (reference counted); rebuilt trees may share
/// subtrees with their input. Equality compares variant and attribute
/// but not locations, so structurally identical trees from different
/// places compare equal.
#[derive(Debug)]
pub struct Node<A>(Rc<NodeData<A>>);

#[derive(Debug)]
struct NodeData<A> {
    kind: Tree<A>,
    location: Location,
    attribute: A,
}

impl<A> Node<A> {
    /// Create a node.
    pub fn new(kind: Tree<A>, location: Location, attribute: A) -> Self {
        Node(Rc::new(NodeData { kind, location, attribute }))
    }

    /// The node's variant.
    pub fn kind(&self) -> &Tree<A> {
        &self.0.kind
    }

    /// The node's source span.
    pub fn location(&self) -> Location {
        self.0.location
    }

    /// The node's attribute.
    pub fn attribute(&self) -> &A {
        &self.0.attribute
    }

    /// True when this node is the unit hole.
    pub fn is_unit(&self) -> bool {
        matches!(self.0.kind, Tree::Unit)
    }
}

impl<A> Clone for Node<A> {
    fn clone(&self) -> Self {
        Node(Rc::clone(&self.0))
    }
}

impl<A: PartialEq> PartialEq for Node<A> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.attribute() == other.attribute()
    }
}

impl Node<()> {
    /// Node with a unit attribute.
    pub fn plain(kind: Tree<()>, location: Location) -> Self {
        Node::new(kind, location, ())
    }

    /// S-expression rendering without attributes.
    pub fn to_sexp(&self) -> String {
        self.to_sexp_with(&|_| None)
    }
}

impl<A> Node<A> {
    /// S-expression rendering; `attr` may contribute a ` : ...` suffix
    /// per node (the typed printer renders the resolved type there).
    pub fn to_sexp_with(&self, attr: &dyn Fn(&A) -> Option<String>) -> String {
        let head = match self.kind() {
            Tree::Unit => "(unit".to_string(),
            Tree::Int(lit) => format!("(int {}", lit.value),
            Tree::Float(lit) => format!("(float {}", lit.value),
            Tree::Str(s) => format!("(str {s:?}"),
            Tree::True => "(true".to_string(),
            Tree::False => "(false".to_string(),
            Tree::Ident(name) => format!("(ident {name}"),
            Tree::PrimType(kind) => format!("(prim {}", kind.symbol()),
            Tree::Block(stmts) => format!("(block{}", sexp_list(stmts, attr)),
            Tree::Data(items) => format!("(data{}", sexp_list(items, attr)),
            Tree::UnaryOp { op, operand } => {
                format!("(unary_op {} {}", op.symbol(), operand.to_sexp_with(attr))
            }
            Tree::BinOp { op, lhs, rhs } => format!(
                "(bin_op {} {} {}",
                op.symbol(),
                lhs.to_sexp_with(attr),
                rhs.to_sexp_with(attr)
            ),
            Tree::Invoc { target, arguments } => {
                format!("(invoc {}{}", target.to_sexp_with(attr), sexp_list(arguments, attr))
            }
            Tree::If(if_expr) => {
                let mut s = "(if".to_string();
                for (test, branch) in if_expr.elif_tests.iter().zip(&if_expr.elif_branches) {
                    s.push_str(&format!(
                        " ({} => {})",
                        test.to_sexp_with(attr),
                        branch.to_sexp_with(attr)
                    ));
                }
                if let Some(else_branch) = &if_expr.else_branch {
                    s.push_str(&format!(" (else {})", else_branch.to_sexp_with(attr)));
                }
                s
            }
            Tree::Elif { test, body } => {
                format!("(elif {} {}", test.to_sexp_with(attr), body.to_sexp_with(attr))
            }
            Tree::Else { body } => format!("(else {}", body.to_sexp_with(attr)),
            Tree::FnExpr(fn_expr) => {
                let mut s = "(fn (".to_string();
                for (i, name) in fn_expr.arg_names.iter().enumerate() {
                    if i > 0 {
                        s.push(' ');
                    }
                    s.push_str(name);
                    if !fn_expr.arg_types[i].is_unit() {
                        s.push_str(&format!(": {}", fn_expr.arg_types[i].to_sexp_with(attr)));
                    }
                }
                s.push(')');
                if let Some(result) = &fn_expr.result_type {
                    s.push_str(&format!(" -> {}", result.to_sexp_with(attr)));
                }
                s.push_str(&format!(" {}", fn_expr.body.to_sexp_with(attr)));
                s
            }
            Tree::VarDef(def) => {
                let mut s = format!("(var_def {}", def.name);
                if let Some(ty) = &def.declared_type {
                    s.push_str(&format!(" {}", ty.to_sexp_with(attr)));
                }
                if let Some(rhs) = &def.rhs {
                    s.push_str(&format!(" {}", rhs.to_sexp_with(attr)));
                }
                s
            }
            Tree::For { var, iterable, body } => format!(
                "(for {var} {} {}",
                iterable.to_sexp_with(attr),
                body.to_sexp_with(attr)
            ),
            Tree::While { test, body } => {
                format!("(while {} {}", test.to_sexp_with(attr), body.to_sexp_with(attr))
            }
            Tree::Break => "(break".to_string(),
            Tree::Continue => "(continue".to_string(),
            Tree::Return(value) => match value {
                Some(v) => format!("(return {}", v.to_sexp_with(attr)),
                None => "(return".to_string(),
            },
            Tree::Yield(value) => match value {
                Some(v) => format!("(yield {}", v.to_sexp_with(attr)),
                None => "(yield".to_string(),
            },
            Tree::Struct(fields) => format!("(struct{}", sexp_fields(fields, attr)),
            Tree::DefType { name, body } => {
                format!("(def_type {name} {}", body.to_sexp_with(attr))
            }
            Tree::LetType { name, body } => {
                format!("(let_type {name} {}", body.to_sexp_with(attr))
            }
            Tree::Template { params, body } => {
                format!("(template{} {}", sexp_fields(params, attr), body.to_sexp_with(attr))
            }
            Tree::TypeExpr(inner) => format!("(type_expr {}", inner.to_sexp_with(attr)),
            Tree::Assign { lhs, rhs } => {
                format!("(assign {} {}", lhs.to_sexp_with(attr), rhs.to_sexp_with(attr))
            }
        };
        match attr(self.attribute()) {
            Some(ty) => format!("{head} : {ty})"),
            None => format!("{head})"),
        }
    }
}

fn sexp_list<A>(nodes: &[Node<A>], attr: &dyn Fn(&A) -> Option<String>) -> String {
    let mut s = String::new();
    for node in nodes {
        s.push(' ');
        s.push_str(&node.to_sexp_with(attr));
    }
    s
}

fn sexp_fields<A>(fields: &[Field<A>], attr: &dyn Fn(&A) -> Option<String>) -> String {
    let mut s = String::new();
    for field in fields {
        s.push_str(&format!(" ({}: {})", field.name, field.ty.to_sexp_with(attr)));
    }
    s
}

impl<A> fmt::Display for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sexp_with(&|_| None))
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

    #[test]
    fn test_equality_ignores_location() {
        let a = Node::plain(Tree::Ident("x".to_string()), Location::new(1, 1, 2));
        let b = Node::plain(Tree::Ident("x".to_string()), Location::new(7, 3, 4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sexp_plain() {
        let lit = plain(Tree::Int(IntLit::new(42, Signedness::Unspecified, 0)));
        let assign = plain(Tree::Assign {
            lhs: plain(Tree::Ident("x".to_string())),
            rhs: lit,
        });
        assert_eq!(assign.to_sexp(), "(assign (ident x) (int 42))");
    }

    #[test]
    fn test_sexp_with_attributes() {
        let lit = Node::new(Tree::<&str>::Int(IntLit::new(1, Signedness::Unspecified, 0)), loc(), "i64");
        assert_eq!(lit.to_sexp_with(&|a| Some((*a).to_string())), "(int 1 : i64)");
    }

    #[test]
    fn test_shared_children() {
        let shared = plain(Tree::Ident("x".to_string()));
        let sum = plain(Tree::BinOp {
            op: TokenKind::Plus,
            lhs: shared.clone(),
            rhs: shared,
        });
        match sum.kind() {
            Tree::BinOp { lhs, rhs, .. } => assert_eq!(lhs, rhs),
            _ => panic!("expected bin_op"),
        }
    }
}
