//! Parser tests over real token streams.

use pretty_assertions::assert_eq;
use quill_ast::{Field, FnExpr, IfExpr, Node, Tree, VarDef};
use quill_lexer::tokenize;
use quill_parser::parse;
use quill_token::{FloatLit, IntLit, Location, Signedness, TokenKind};

fn ast(input: &str) -> Node<()> {
    parse(&tokenize(input).expect("tokenize")).expect("parse")
}

fn n(kind: Tree<()>) -> Node<()> {
    Node::plain(kind, Location::default())
}

fn ident(name: &str) -> Node<()> {
    n(Tree::Ident(name.to_string()))
}

fn int(value: u64) -> Node<()> {
    n(Tree::Int(IntLit::new(value, Signedness::Unspecified, 0)))
}

fn bin(op: TokenKind, lhs: Node<()>, rhs: Node<()>) -> Node<()> {
    n(Tree::BinOp { op, lhs, rhs })
}

fn unary(op: TokenKind, operand: Node<()>) -> Node<()> {
    n(Tree::UnaryOp { op, operand })
}

fn block(stmts: Vec<Node<()>>) -> Node<()> {
    n(Tree::Block(stmts))
}

fn type_expr(inner: Node<()>) -> Node<()> {
    n(Tree::TypeExpr(inner))
}

fn prim(kind: TokenKind) -> Node<()> {
    n(Tree::PrimType(kind))
}

#[test]
fn integral_literal_parsing() {
    assert_eq!(ast("42"), int(42));
}

#[test]
fn floating_point_parsing() {
    assert_eq!(ast("42.0f32"), n(Tree::Float(FloatLit::new(42.0, 32))));
}

#[test]
fn string_literal_parsing() {
    assert_eq!(ast(r#""a literal string""#), n(Tree::Str("a literal string".to_string())));
}

#[test]
fn error_on_stray_operator() {
    assert!(parse(&tokenize("|").expect("tokenize")).is_err());
}

#[test]
fn parenthesised_group() {
    assert_eq!(ast("( 5 )"), int(5));
    assert_eq!(ast("(5)"), int(5));
}

#[test]
fn boolean_literals() {
    assert_eq!(ast("true"), n(Tree::True));
    assert_eq!(ast("false"), n(Tree::False));
}

#[test]
fn boolean_operations() {
    assert_eq!(ast("true or false"), bin(TokenKind::Or, n(Tree::True), n(Tree::False)));
    assert_eq!(ast("false and true"), bin(TokenKind::And, n(Tree::False), n(Tree::True)));
}

#[test]
fn comparisons() {
    let x = || ident("x");
    assert_eq!(ast("x > 5"), bin(TokenKind::Gt, x(), int(5)));
    assert_eq!(ast("x<5.0"), bin(TokenKind::Lt, x(), n(Tree::Float(FloatLit::new(5.0, 64)))));
    assert_eq!(
        ast("10.0f32 >= 5"),
        bin(TokenKind::Geq, n(Tree::Float(FloatLit::new(10.0, 32))), int(5))
    );
    assert_eq!(ast("x == y"), bin(TokenKind::Equal, x(), ident("y")));
    assert_eq!(ast("x!=y"), bin(TokenKind::NotEqual, x(), ident("y")));
    assert_eq!(ast("x in xs"), bin(TokenKind::In, x(), ident("xs")));
    assert_eq!(ast("x is y"), bin(TokenKind::Is, x(), ident("y")));
}

#[test]
fn negated_comparisons() {
    assert_eq!(
        ast("x not in xs"),
        unary(TokenKind::Not, bin(TokenKind::In, ident("x"), ident("xs")))
    );
    assert_eq!(
        ast("x is not y"),
        unary(TokenKind::Not, bin(TokenKind::Is, ident("x"), ident("y")))
    );
}

#[test]
fn bar_is_left_associative() {
    assert_eq!(
        ast("x | y | z"),
        bin(TokenKind::Bar, bin(TokenKind::Bar, ident("x"), ident("y")), ident("z"))
    );
}

#[test]
fn power_is_right_associative() {
    assert_eq!(
        ast("a ** b ** c"),
        bin(
            TokenKind::StarStar,
            ident("a"),
            bin(TokenKind::StarStar, ident("b"), ident("c"))
        )
    );
}

#[test]
fn unary_operators() {
    assert_eq!(ast("-x"), unary(TokenKind::Minus, ident("x")));
    assert_eq!(ast("~x"), unary(TokenKind::Tilde, ident("x")));
    assert_eq!(ast("not x"), unary(TokenKind::Not, ident("x")));
}

#[test]
fn assignment_statements() {
    assert_eq!(
        ast("x = y + 2"),
        n(Tree::Assign { lhs: ident("x"), rhs: bin(TokenKind::Plus, ident("y"), int(2)) })
    );
    // `=` nests to the right
    assert_eq!(
        ast("x = y = 2"),
        n(Tree::Assign { lhs: ident("x"), rhs: n(Tree::Assign { lhs: ident("y"), rhs: int(2) }) })
    );
}

#[test]
fn var_definitions() {
    assert_eq!(
        ast("var x = y + 2"),
        n(Tree::VarDef(VarDef {
            name: "x".to_string(),
            declared_type: None,
            rhs: Some(bin(TokenKind::Plus, ident("y"), int(2))),
        }))
    );
    assert_eq!(
        ast("var x: int = 42"),
        n(Tree::VarDef(VarDef {
            name: "x".to_string(),
            declared_type: Some(type_expr(prim(TokenKind::Int))),
            rhs: Some(int(42)),
        }))
    );
    assert_eq!(
        ast("var x: int"),
        n(Tree::VarDef(VarDef {
            name: "x".to_string(),
            declared_type: Some(type_expr(prim(TokenKind::Int))),
            rhs: None,
        }))
    );
}

#[test]
fn invocations() {
    assert_eq!(
        ast("some_fn(x)"),
        n(Tree::Invoc { target: ident("some_fn"), arguments: vec![ident("x")] })
    );
    assert_eq!(
        ast("f(a)(b)"),
        n(Tree::Invoc {
            target: n(Tree::Invoc { target: ident("f"), arguments: vec![ident("a")] }),
            arguments: vec![ident("b")],
        })
    );
    assert_eq!(
        ast("f(a, b; c)"),
        n(Tree::Invoc {
            target: ident("f"),
            arguments: vec![n(Tree::Data(vec![ident("a"), ident("b")])), ident("c")],
        })
    );
}

#[test]
fn dot_chaining_inserts_first_argument() {
    assert_eq!(
        ast("x.f(y)"),
        n(Tree::Invoc { target: ident("f"), arguments: vec![ident("x"), ident("y")] })
    );
    assert_eq!(
        ast("x.f"),
        n(Tree::Invoc { target: ident("f"), arguments: vec![ident("x")] })
    );
}

#[test]
fn layout_invocation() {
    assert_eq!(
        ast("foo:\n    verbatim\n"),
        n(Tree::Invoc { target: ident("foo"), arguments: vec![ident("verbatim")] })
    );
}

#[test]
fn function_definitions() {
    assert_eq!(
        ast("def f(x: int, y: int): int = x + y"),
        n(Tree::VarDef(VarDef {
            name: "f".to_string(),
            declared_type: None,
            rhs: Some(n(Tree::FnExpr(FnExpr {
                arg_names: vec!["x".to_string(), "y".to_string()],
                arg_types: vec![type_expr(prim(TokenKind::Int)), type_expr(prim(TokenKind::Int))],
                result_type: Some(type_expr(prim(TokenKind::Int))),
                body: bin(TokenKind::Plus, ident("x"), ident("y")),
                captures: vec![],
            }))),
        }))
    );
}

#[test]
fn parameter_type_propagates_over_a_run() {
    assert_eq!(
        ast("def g(a, b: int) = a"),
        n(Tree::VarDef(VarDef {
            name: "g".to_string(),
            declared_type: None,
            rhs: Some(n(Tree::FnExpr(FnExpr {
                arg_names: vec!["a".to_string(), "b".to_string()],
                arg_types: vec![type_expr(prim(TokenKind::Int)), type_expr(prim(TokenKind::Int))],
                result_type: None,
                body: ident("a"),
                captures: vec![],
            }))),
        }))
    );
}

#[test]
fn unannotated_parameter_gets_a_unit_hole() {
    let parsed = ast("def h(a) = a");
    let Tree::VarDef(def) = parsed.kind() else { panic!("expected var_def") };
    let Some(rhs) = &def.rhs else { panic!("expected rhs") };
    let Tree::FnExpr(fn_expr) = rhs.kind() else { panic!("expected fn_expr") };
    assert_eq!(fn_expr.arg_names, vec!["a".to_string()]);
    assert_eq!(fn_expr.arg_types.len(), 1);
    assert!(fn_expr.arg_types[0].is_unit());
}

#[test]
fn fn_expression_with_captures() {
    let parsed = ast("var f = fn (x: int) = x with y, var z");
    let Tree::VarDef(def) = parsed.kind() else { panic!("expected var_def") };
    let Some(rhs) = &def.rhs else { panic!("expected rhs") };
    let Tree::FnExpr(fn_expr) = rhs.kind() else { panic!("expected fn_expr") };
    assert_eq!(fn_expr.captures.len(), 2);
    assert!(!fn_expr.captures[0].by_var);
    assert_eq!(fn_expr.captures[0].name.as_deref(), Some("y"));
    assert!(fn_expr.captures[1].by_var);
    assert_eq!(fn_expr.captures[1].name.as_deref(), Some("z"));
}

#[test]
fn if_with_inline_else() {
    assert_eq!(
        ast("if (x > 0) 1 else 2"),
        n(Tree::If(IfExpr {
            elif_tests: vec![block(vec![bin(TokenKind::Gt, ident("x"), int(0))])],
            elif_branches: vec![int(1)],
            else_branch: Some(int(2)),
        }))
    );
}

#[test]
fn elif_and_else_fold_into_if() {
    assert_eq!(
        ast("if (a) 1\nelif (b) 2\nelse 3"),
        n(Tree::If(IfExpr {
            elif_tests: vec![block(vec![ident("a")]), block(vec![ident("b")])],
            elif_branches: vec![int(1), int(2)],
            else_branch: Some(int(3)),
        }))
    );
}

#[test]
fn dangling_branches_are_fatal() {
    assert!(parse(&tokenize("elif (x) 1").expect("tokenize")).is_err());
    assert!(parse(&tokenize("else 2").expect("tokenize")).is_err());
    assert!(parse(&tokenize("x\nelse 2").expect("tokenize")).is_err());
}

#[test]
fn blocks_and_semicolons() {
    assert_eq!(ast("a\nb"), block(vec![ident("a"), ident("b")]));
    assert_eq!(ast("a; b"), block(vec![ident("a"), ident("b")]));
}

#[test]
fn loops_and_jumps() {
    assert_eq!(
        ast("while (x) break"),
        n(Tree::While { test: block(vec![ident("x")]), body: n(Tree::Break) })
    );
    assert_eq!(
        ast("for (i: xs) continue"),
        n(Tree::For { var: "i".to_string(), iterable: ident("xs"), body: n(Tree::Continue) })
    );
}

#[test]
fn return_and_yield() {
    assert_eq!(ast("return"), n(Tree::Return(None)));
    assert_eq!(
        ast("return x + 1"),
        n(Tree::Return(Some(bin(TokenKind::Plus, ident("x"), int(1)))))
    );
    assert_eq!(ast("yield"), n(Tree::Yield(None)));
    assert_eq!(ast("yield x"), n(Tree::Yield(Some(ident("x")))));
}

#[test]
fn type_definitions() {
    assert_eq!(
        ast("type Meters = int"),
        n(Tree::DefType {
            name: "Meters".to_string(),
            body: type_expr(prim(TokenKind::Int)),
        })
    );
    assert_eq!(
        ast("alias Num = int"),
        n(Tree::LetType { name: "Num".to_string(), body: type_expr(prim(TokenKind::Int)) })
    );
    assert_eq!(
        ast("type Point(x: int, y: int)"),
        n(Tree::DefType {
            name: "Point".to_string(),
            body: type_expr(n(Tree::Struct(vec![
                Field { name: "x".to_string(), ty: type_expr(prim(TokenKind::Int)) },
                Field { name: "y".to_string(), ty: type_expr(prim(TokenKind::Int)) },
            ]))),
        })
    );
}

#[test]
fn generic_type_annotations() {
    assert_eq!(
        ast("var p: ptr(int)"),
        n(Tree::VarDef(VarDef {
            name: "p".to_string(),
            declared_type: Some(type_expr(n(Tree::Invoc {
                target: prim(TokenKind::Ptr),
                arguments: vec![prim(TokenKind::Int)],
            }))),
            rhs: None,
        }))
    );
}

#[test]
fn trailing_tokens_are_an_error() {
    assert!(parse(&tokenize("a )").expect("tokenize")).is_err());
}
