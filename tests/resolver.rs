use std::collections::HashMap;

use treelox as lox;

use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::stmt::Stmt;
use lox::token::Token;

fn parse_clean(source: &str) -> Vec<Stmt> {
    let tokens: Vec<Token> = Scanner::new(source.as_bytes().to_vec())
        .collect::<Result<Vec<_>, _>>()
        .expect("source should scan cleanly");

    let mut parser = Parser::new(tokens, 0);
    let (statements, errors) = parser.parse();
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
    statements
}

fn resolve_source(source: &str) -> (Interpreter<Vec<u8>>, Vec<LoxError>) {
    let statements = parse_clean(source);

    let mut interpreter = Interpreter::new(Vec::new());
    let errors = Resolver::new(&mut interpreter).resolve(&statements);

    (interpreter, errors)
}

#[test]
fn duplicate_local_declaration_is_reported() {
    let (_, errors) = resolve_source("{ var a = 1; var a = 2; }");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'a': Already a variable with this name in this scope."
    );
}

#[test]
fn global_scope_is_exempt_from_the_duplicate_check() {
    let (_, errors) = resolve_source("var a = 1; var a = 2;");

    assert!(errors.is_empty(), "globals resolve dynamically: {:?}", errors);
}

#[test]
fn reading_a_local_in_its_own_initializer_is_reported() {
    let (_, errors) = resolve_source("{ var a = a; }");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'a': Can't read local variable in its own initializer."
    );
}

#[test]
fn top_level_return_is_reported() {
    let (_, errors) = resolve_source("return 1;");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'return': Can't return from top-level code."
    );
}

#[test]
fn return_inside_a_function_is_fine() {
    let (_, errors) = resolve_source("fun f() { return 1; }");

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn resolution_continues_after_an_error() {
    let (_, errors) = resolve_source("return 1; { var a = 1; var a = 2; }");

    // Both diagnostics surface from a single pass.
    assert_eq!(errors.len(), 2);
}

#[test]
fn innermost_binding_has_depth_zero() {
    let (interpreter, errors) = resolve_source("{ var a = 1; print a; }");

    assert!(errors.is_empty());

    let depths: Vec<usize> = interpreter.locals().values().copied().collect();
    assert_eq!(depths, vec![0]);
}

#[test]
fn binding_depth_counts_intervening_scopes() {
    let (interpreter, errors) = resolve_source("{ var a = 1; { { print a; } } }");

    assert!(errors.is_empty());

    let depths: Vec<usize> = interpreter.locals().values().copied().collect();
    assert_eq!(depths, vec![2]);
}

#[test]
fn globals_are_absent_from_the_side_table() {
    let (interpreter, errors) = resolve_source("var a = 1; print a;");

    assert!(errors.is_empty());
    assert!(interpreter.locals().is_empty());
}

#[test]
fn function_parameters_resolve_inside_the_body() {
    let (interpreter, errors) = resolve_source("fun f(x) { print x; }");

    assert!(errors.is_empty());

    let depths: Vec<usize> = interpreter.locals().values().copied().collect();
    assert_eq!(depths, vec![0]);
}

#[test]
fn resolving_twice_produces_an_identical_side_table() {
    let source = "{ var a = 1; fun f(x) { { print a; } return x; } }";
    let statements = parse_clean(source);

    let mut first = Interpreter::new(Vec::new());
    let errors = Resolver::new(&mut first).resolve(&statements);
    assert!(errors.is_empty());

    let mut second = Interpreter::new(Vec::new());
    let errors = Resolver::new(&mut second).resolve(&statements);
    assert!(errors.is_empty());

    let a: &HashMap<usize, usize> = first.locals();
    let b: &HashMap<usize, usize> = second.locals();
    assert_eq!(a, b);
}
