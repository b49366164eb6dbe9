//! Interpreter integration tests
//!
//! Arithmetic, scoping, control flow, functions, collections and the
//! standard library, evaluated through the embedding API.

mod common;

use common::*;
use common::assert_eq;
use ember_runtime::codes;
use ember_runtime::{RuntimeError, Value};
use rstest::rstest;

// ============================================================================
// Arithmetic and operators
// ============================================================================

#[rstest]
#[case("1 + 2", 3.0)]
#[case("10 - 3", 7.0)]
#[case("4 * 5", 20.0)]
#[case("20 / 8", 2.5)]
#[case("10 % 3", 1.0)]
#[case("-42", -42.0)]
#[case("2 + 3 * 4", 14.0)]
#[case("(2 + 3) * 4", 20.0)]
#[case("10 - 4 - 3", 3.0)]
#[case("1.5e2", 150.0)]
fn test_arithmetic(#[case] source: &str, #[case] expected: f64) {
    assert_eval_number(source, expected);
}

#[rstest]
#[case("1 < 2", true)]
#[case("2 <= 1", false)]
#[case("\"apple\" < \"banana\"", true)]
#[case("1 == 1", true)]
#[case("\"a\" != \"a\"", false)]
#[case("[1, 2] == [1, 2]", true)]
#[case("null == null", true)]
#[case("1 == \"1\"", false)]
#[case("true && !false", true)]
#[case("false || false", false)]
fn test_comparison_and_logic(#[case] source: &str, #[case] expected: bool) {
    assert_eval_bool(source, expected);
}

#[test]
fn test_string_concatenation() {
    assert_eval_string("\"ember\" + \"-\" + \"lang\"", "ember-lang");
}

#[test]
fn test_mixed_addition_is_type_error() {
    assert!(matches!(
        runtime_error("\"a\" + 1"),
        RuntimeError::TypeError { .. }
    ));
}

#[rstest]
#[case("1 / 0")]
#[case("5 % 0")]
fn test_divide_by_zero(#[case] source: &str) {
    assert!(matches!(
        runtime_error(source),
        RuntimeError::DivideByZero { .. }
    ));
}

#[test]
fn test_overflow_is_invalid_numeric_result() {
    assert!(matches!(
        runtime_error("1e308 * 10"),
        RuntimeError::InvalidNumericResult { .. }
    ));
}

#[test]
fn test_logical_operators_short_circuit() {
    // the right operand would fail if it were evaluated
    assert_eval_bool("false && undefined_name", false);
    assert_eval_bool("true || undefined_name", true);
}

#[test]
fn test_logical_operators_require_bools() {
    assert!(matches!(
        runtime_error("1 && true"),
        RuntimeError::TypeError { .. }
    ));
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_let_is_immutable() {
    assert!(matches!(
        runtime_error("let x = 1; x = 2;"),
        RuntimeError::ImmutableAssignment { .. }
    ));
}

#[test]
fn test_var_is_mutable() {
    assert_eval_number("var x = 1; x = x + 41; x", 42.0);
}

#[test]
fn test_undefined_variable() {
    let err = runtime_error("missing + 1");
    assert_eq!(
        err,
        RuntimeError::UndefinedVariable {
            name: "missing".to_string(),
            span: err.span(),
        }
    );
}

#[test]
fn test_block_scope_does_not_leak() {
    assert!(matches!(
        runtime_error("{ let inner = 1; } inner"),
        RuntimeError::UndefinedVariable { .. }
    ));
}

#[test]
fn test_shadowing_in_block() {
    assert_eval_number("let x = 1; var y = 0; { let x = 2; y = x; } x + y", 3.0);
}

#[test]
fn test_global_redeclaration_replaces() {
    assert_eval_number("let x = 1; let x = 2; x", 2.0);
}

#[rstest]
#[case("+= 5", 15.0)]
#[case("-= 5", 5.0)]
#[case("*= 5", 50.0)]
#[case("/= 5", 2.0)]
#[case("%= 4", 2.0)]
fn test_compound_assignment(#[case] op: &str, #[case] expected: f64) {
    assert_eval_number(&format!("var x = 10; x {}; x", op), expected);
}

#[test]
fn test_increment_and_decrement() {
    assert_eval_number("var x = 1; x++; x++; x--; x", 2.0);
}

#[test]
fn test_increment_requires_number() {
    assert!(matches!(
        runtime_error("var s = \"a\"; s++;"),
        RuntimeError::TypeError { .. }
    ));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_if_else_chain() {
    let source = r#"
        fn grade(n) {
            if (n >= 90) { return "a"; }
            else if (n >= 80) { return "b"; }
            else { return "c"; }
        }
        grade(95) + grade(85) + grade(10)
    "#;
    assert_eval_string(source, "abc");
}

#[test]
fn test_only_true_is_truthy() {
    assert_eval_number("var x = 0; if (1) { x = 1; } x", 0.0);
}

#[test]
fn test_while_loop() {
    assert_eval_number("var i = 0; var sum = 0; while (i < 5) { sum += i; i++; } sum", 10.0);
}

#[test]
fn test_while_break() {
    assert_eval_number("var i = 0; while (true) { i++; if (i == 3) { break; } } i", 3.0);
}

#[test]
fn test_c_style_for() {
    assert_eval_number(
        "var total = 0; for (var i = 1; i <= 4; i++) { total *= 1; total += i; } total",
        10.0,
    );
}

#[test]
fn test_for_loop_variable_is_scoped() {
    assert!(matches!(
        runtime_error("for (var i = 0; i < 1; i++) { } i"),
        RuntimeError::UndefinedVariable { .. }
    ));
}

#[test]
fn test_for_in_over_array() {
    assert_eval_number("var sum = 0; for x in [1, 2, 3] { sum += x; } sum", 6.0);
}

#[test]
fn test_for_in_requires_array() {
    assert!(matches!(
        runtime_error("for x in 5 { }"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_nested_loops_break_inner_only() {
    let source = r#"
        var count = 0;
        for (var i = 0; i < 3; i++) {
            for (var j = 0; j < 3; j++) {
                if (j == 1) { break; }
                count++;
            }
        }
        count
    "#;
    assert_eval_number(source, 3.0);
}

#[rstest]
#[case("continue;", "continue")]
#[case("if (true) { break; }", "break")]
fn test_loop_keywords_outside_loop(#[case] source: &str, #[case] expected: &str) {
    match runtime_error(source) {
        RuntimeError::InvalidControlFlow { keyword, .. } => assert_eq!(keyword, expected),
        other => panic!("Expected InvalidControlFlow, got {:?}", other),
    }
}

#[test]
fn test_top_level_return_ends_program() {
    assert_eval_number("var x = 1; return x + 1; x = 100;", 2.0);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_call() {
    assert_eval_number("fn add(a, b) { return a + b; } add(2, 3)", 5.0);
}

#[test]
fn test_function_without_return_yields_null() {
    assert_eval_null("fn noop() { let x = 1; } noop()");
}

#[test]
fn test_recursion() {
    assert_eval_number(
        "fn fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } fib(15)",
        610.0,
    );
}

#[test]
fn test_return_from_inside_loop() {
    let source = r#"
        fn find(items, target) {
            var i = 0;
            for x in items {
                if (x == target) { return i; }
                i++;
            }
            return -1;
        }
        find([5, 6, 7], 7)
    "#;
    assert_eval_number(source, 2.0);
}

#[test]
fn test_functions_do_not_see_caller_locals() {
    let source = r#"
        fn peek() { return hidden; }
        fn caller() { let hidden = 1; return peek(); }
        caller()
    "#;
    assert!(matches!(
        runtime_error(source),
        RuntimeError::UndefinedVariable { .. }
    ));
}

#[test]
fn test_functions_see_globals() {
    assert_eval_number("var base = 10; fn add(n) { return base + n; } add(5)", 15.0);
}

#[test]
fn test_functions_can_mutate_globals() {
    assert_eval_number("var hits = 0; fn hit() { hits++; } hit(); hit(); hits", 2.0);
}

#[test]
fn test_arity_mismatch() {
    match runtime_error("fn one(a) { return a; } one(1, 2)") {
        RuntimeError::ArityMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("Expected ArityMismatch, got {:?}", other),
    }
}

#[test]
fn test_functions_are_values() {
    assert_eval_number("fn twice(n) { return n * 2; } let f = twice; f(21)", 42.0);
}

#[test]
fn test_calling_non_function() {
    assert!(matches!(
        runtime_error("let x = 1; x()"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_nested_functions_with_same_name() {
    let source = r#"
        fn a() { fn helper() { return 1; } return helper(); }
        fn b() { fn helper() { return 2; } return helper(); }
        a() * 10 + b()
    "#;
    assert_eval_number(source, 12.0);
}

#[test]
fn test_runaway_recursion_is_error() {
    match runtime_error("fn forever(n) { return forever(n + 1); } forever(0)") {
        RuntimeError::StackOverflow { limit, .. } => {
            assert_eq!(limit, ember_runtime::DEFAULT_MAX_CALL_DEPTH)
        }
        other => panic!("Expected StackOverflow, got {:?}", other),
    }
}

#[test]
fn test_state_recovers_after_error() {
    let mut runtime = quiet_runtime();
    runtime.eval("var total = 1;").unwrap();
    assert!(runtime
        .eval("fn bad() { let local = 1; return 1 / 0; } bad()")
        .is_err());
    assert_eq!(runtime.eval("total + 1").unwrap(), Value::Number(2.0));
    assert!(runtime.get_global("local").is_none());
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_array_indexing() {
    assert_eval_number("let a = [10, 20, 30]; a[1]", 20.0);
}

#[rstest]
#[case("[1, 2][2]")]
#[case("[1, 2][5]")]
fn test_array_index_out_of_bounds(#[case] source: &str) {
    assert!(matches!(
        runtime_error(source),
        RuntimeError::OutOfBounds { .. }
    ));
}

#[rstest]
#[case("[1, 2][0.5]")]
#[case("[1, 2][-1]")]
fn test_array_index_must_be_whole(#[case] source: &str) {
    assert!(matches!(
        runtime_error(source),
        RuntimeError::InvalidIndex { .. }
    ));
}

#[test]
fn test_string_indexing() {
    assert_eval_string("\"héllo\"[1]", "é");
}

#[test]
fn test_array_element_assignment() {
    assert_eval_display("var a = [1, 2, 3]; a[2] = 9; a", "[1, 2, 9]");
}

#[test]
fn test_arrays_have_value_semantics() {
    assert_eval_display(
        "var a = [1]; fn grow(xs) { xs[0] = 99; return xs; } let b = grow(a); [a, b]",
        "[[1], [99]]",
    );
}

#[test]
fn test_map_literal_and_lookup() {
    assert_eval_number("let m = ({x: 1, \"y z\": 2}); m[\"y z\"]", 2.0);
}

#[test]
fn test_map_missing_key_is_null() {
    assert_eval_null("let m = ({a: 1}); m[\"b\"]");
}

#[test]
fn test_map_insert_new_key() {
    assert_eval_display("var m = ({b: 2}); m[\"a\"] = 1; m", "{a: 1, b: 2}");
}

#[test]
fn test_nested_map_in_array_assignment() {
    assert_eval_display(
        "var rows = [{n: 1}, {n: 2}]; rows[1][\"n\"] += 10; rows",
        "[{n: 1}, {n: 12}]",
    );
}

// ============================================================================
// Standard library
// ============================================================================

#[rstest]
#[case("len(\"abc\")", "3")]
#[case("len([1, 2])", "2")]
#[case("str(1.5)", "1.5")]
#[case("typeof(null)", "null")]
#[case("typeof(len)", "builtin")]
#[case("push([1], 2)", "[1, 2]")]
#[case("keys(({b: 1, a: 2}))", "[a, b]")]
#[case("abs(-3)", "3")]
#[case("floor(2.7)", "2")]
#[case("ceil(2.1)", "3")]
#[case("round(2.5)", "3")]
#[case("sqrt(16)", "4")]
#[case("pow(2, 10)", "1024")]
#[case("min(3, 1, 2)", "1")]
#[case("max(3, 1, 2)", "3")]
#[case("split(\"a,b\", \",\")", "[a, b]")]
#[case("join([\"a\", \"b\"], \"+\")", "a+b")]
#[case("trim(\"  x  \")", "x")]
#[case("toUpperCase(\"ember\")", "EMBER")]
#[case("toLowerCase(\"EMBER\")", "ember")]
#[case("toNumber(\"42\") + 1", "43")]
fn test_builtins(#[case] source: &str, #[case] expected: &str) {
    assert_eval_display(source, expected);
}

#[test]
fn test_builtins_can_be_shadowed() {
    assert_eval_number("fn len(x) { return 7; } len([1])", 7.0);
}

#[test]
fn test_builtin_arity_checked() {
    assert!(matches!(
        runtime_error("len(1, 2)"),
        RuntimeError::ArityMismatch { .. }
    ));
}

#[test]
fn test_print_writes_to_output() {
    let captured = Captured::default();
    let mut runtime = quiet_runtime();
    runtime.set_output(captured.writer());

    runtime.eval("print(\"hello\"); print([1, 2]); print(1 + 1);").unwrap();

    assert_eq!(captured.contents(), "hello\n[1, 2]\n2\n");
}

// ============================================================================
// Diagnostics
// ============================================================================

#[rstest]
#[case("let = 1;", codes::SYNTAX)]
#[case("1 # 2", codes::UNEXPECTED_CHAR)]
#[case("\"open", codes::UNTERMINATED_STRING)]
#[case("\"bad \\q\"", codes::INVALID_ESCAPE)]
#[case("1 /* never closed", codes::UNTERMINATED_COMMENT)]
fn test_diagnostic_codes(#[case] source: &str, #[case] code: &str) {
    assert_error_code(source, code);
}

#[test]
fn test_reserved_word_as_name() {
    assert_error_code("let while = 1;", codes::SYNTAX);
}
