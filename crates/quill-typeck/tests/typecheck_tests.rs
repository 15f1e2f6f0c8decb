//! End-to-end type checking over parsed source.

use pretty_assertions::assert_eq;
use quill_ast::{Node, Tree};
use quill_lexer::tokenize;
use quill_parser::parse;
use quill_symbols::prelude;
use quill_typeck::{type_check, Diagnostic};
use quill_types::Type;

fn check(input: &str) -> (Node<Type>, Vec<Diagnostic>) {
    let ast = parse(&tokenize(input).expect("tokenize")).expect("parse");
    type_check(&ast, &prelude())
}

/// Root type of a program expected to check cleanly.
fn clean_type(input: &str) -> String {
    let (typed, diagnostics) = check(input);
    assert_eq!(diagnostics, vec![], "unexpected diagnostics for {input:?}");
    typed.attribute().to_string()
}

fn messages(input: &str) -> Vec<String> {
    check(input).1.into_iter().map(|d| d.message).collect()
}

#[test]
fn integer_literal_defaults_to_i64() {
    assert_eq!(clean_type("42"), "i64");
}

#[test]
fn suffixed_literals_keep_their_width() {
    assert_eq!(clean_type("42i32"), "i32");
    assert_eq!(clean_type("42u8"), "u8");
    assert_eq!(clean_type("2.5"), "f64");
    assert_eq!(clean_type("2.5f32"), "f32");
}

#[test]
fn string_literal_knows_its_length() {
    assert_eq!(clean_type("\"hello\""), "strlit(5)");
}

#[test]
fn boolean_operation_is_bool() {
    assert_eq!(clean_type("true or false"), "bool");
}

#[test]
fn comparison_is_bool() {
    assert_eq!(clean_type("1 < 2"), "bool");
    assert_eq!(clean_type("var x: int = 1\nx == 2"), "bool");
}

#[test]
fn var_def_is_a_pointer_to_the_declared_type() {
    let (typed, diagnostics) = check("var x: int = 42");
    assert_eq!(diagnostics, vec![]);
    assert_eq!(typed.attribute().to_string(), "ptr(i32)");
    // the unsuffixed literal adopted the declared type
    let Tree::VarDef(def) = typed.kind() else { panic!("expected var_def") };
    let rhs = def.rhs.as_ref().expect("rhs");
    assert_eq!(rhs.attribute().to_string(), "i32");
}

#[test]
fn var_def_without_annotation_adopts_the_deduced_type() {
    assert_eq!(clean_type("var x = 42"), "ptr(i64)");
    assert_eq!(clean_type("var s = \"hi\""), "ptr(strlit(2))");
}

#[test]
fn var_def_mismatch_is_reported() {
    let msgs = messages("var x: bool = 42");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("can't assign value of type \"i64\" to value of type \"bool\""));
}

#[test]
fn function_definition_types_its_body() {
    let (typed, diagnostics) = check("def f(x: int, y: int): int = x + y");
    assert_eq!(diagnostics, vec![]);
    assert_eq!(typed.attribute().to_string(), "ptr(function(i32, x:i32, y:i32))");
    let Tree::VarDef(def) = typed.kind() else { panic!("expected var_def") };
    let rhs = def.rhs.as_ref().expect("rhs");
    let Tree::FnExpr(fn_expr) = rhs.kind() else { panic!("expected fn_expr") };
    assert_eq!(fn_expr.body.attribute().to_string(), "i32");
}

#[test]
fn function_body_must_match_declared_result() {
    let msgs = messages("def f(): bool = 42");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("not assignable to declared result type \"bool\""));
}

#[test]
fn defined_functions_are_callable() {
    assert_eq!(clean_type("def f(x: long): long = x\nf(5)"), "i64");
}

#[test]
fn call_arity_is_checked() {
    let msgs = messages("print(1, 2)");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("mismatch between actual and formal parameters"));
}

#[test]
fn calling_a_non_function_is_reported() {
    let msgs = messages("var n = 1\nn(2)");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("expected function type"));
}

#[test]
fn print_accepts_anything() {
    assert_eq!(clean_type("print(42)"), "void");
    assert_eq!(clean_type("print(\"hi\")"), "void");
}

#[test]
fn if_over_declared_variable() {
    let (typed, diagnostics) = check("var x: int = 5\nif (x > 0) 1 else 2");
    assert_eq!(diagnostics, vec![]);
    let Tree::Block(stmts) = typed.kind() else { panic!("expected block") };
    assert_eq!(stmts[1].attribute().to_string(), "i64");
}

#[test]
fn undeclared_identifier_is_reported() {
    let msgs = messages("if (x > 0) 1 else 2");
    assert!(!msgs.is_empty());
    assert!(msgs[0].contains("no type information for \"x\""));
}

#[test]
fn if_without_else_joins_with_void() {
    let (typed, diagnostics) = check("var b: bool = true\nif (b) 1");
    assert_eq!(diagnostics, vec![]);
    let Tree::Block(stmts) = typed.kind() else { panic!("expected block") };
    assert_eq!(stmts[1].attribute().to_string(), "variant(i64, void)");
}

#[test]
fn non_bool_condition_is_reported() {
    let msgs = messages("while (42) 1");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("is not a bool"));
}

#[test]
fn data_lists_make_arrays_or_tuples() {
    assert_eq!(clean_type("data (1, 2, 3)"), "array(i64, 3)");
    assert_eq!(clean_type("data (1, \"a\")"), "tuple(i64, strlit(1))");
}

#[test]
fn duplicate_declarations_are_reported() {
    let msgs = messages("var x = 1\nvar x = 2");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("duplicate variable declaration of \"x\""));

    let msgs = messages("type A = int\ntype A = int");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("duplicate type name \"A\""));
}

#[test]
fn nominal_types_accept_their_representation() {
    let (typed, diagnostics) = check("type Meters = int\nvar m: Meters = 5i32");
    assert_eq!(diagnostics, vec![]);
    let Tree::Block(stmts) = typed.kind() else { panic!("expected block") };
    assert_eq!(stmts[1].attribute().to_string(), "ptr(Meters)");
}

#[test]
fn aliases_are_transparent() {
    assert_eq!(clean_type("alias Num = int\nvar n: Num = 1"), "ptr(i32)");
}

#[test]
fn generic_type_invocations() {
    assert_eq!(clean_type("var p: ptr(int)"), "ptr(ptr(i32))");
    assert_eq!(clean_type("var d: dynarr(bool)"), "ptr(dynarr(bool))");
    assert_eq!(clean_type("var s: strlit(5) = \"hello\""), "ptr(strlit(5))");
    assert_eq!(clean_type("var s: string = \"hi\""), "ptr(string)");
}

#[test]
fn bad_generic_arity_is_reported() {
    let msgs = messages("var p: ptr(int, bool)");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("ptr()"));
}

#[test]
fn assignment_checks_against_the_target() {
    assert_eq!(clean_type("var x: int = 1\nx = 2"), "void");
    let msgs = messages("var x: int = 1\nx = \"no\"");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("can't assign"));
}

#[test]
fn assignment_to_non_lvalue_is_reported() {
    let msgs = messages("1 = 2");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("not an l-value"));
}

#[test]
fn for_loop_binds_the_element_type() {
    assert_eq!(clean_type("for (c: \"abc\") print(c)"), "void");
    let msgs = messages("for (x: 42) x");
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].contains("cannot iterate"));
}

#[test]
fn struct_types_resolve_their_fields() {
    let (typed, diagnostics) = check("type Point(x: int, y: int)");
    assert_eq!(diagnostics, vec![]);
    assert_eq!(typed.attribute().to_string(), "Point");
    let Tree::DefType { body, .. } = typed.kind() else { panic!("expected def_type") };
    assert_eq!(body.attribute().to_string(), "struct(x:i32, y:i32)");
}

#[test]
fn elif_chain_checks_cleanly() {
    assert_eq!(
        clean_type("var x: bool = true\nif (x) 1\nelif (x) 2\nelse 3"),
        "i64"
    );
}

#[test]
fn return_and_yield_carry_their_value_type() {
    assert_eq!(clean_type("return 42"), "i64");
    assert_eq!(clean_type("return"), "void");
    assert_eq!(clean_type("yield \"v\""), "strlit(1)");
}

#[test]
fn every_error_is_collected_in_one_pass() {
    let msgs = messages("a\nb\nc");
    assert_eq!(msgs.len(), 3);
    assert!(msgs[0].contains("\"a\""));
    assert!(msgs[1].contains("\"b\""));
    assert!(msgs[2].contains("\"c\""));
}
