//! Gateway tests: the three operations, configuration and preludes

use ember_config::{Config, ConfigLoader, PROJECT_CONFIG_FILE};
use ember_gateway::{Gateway, GatewayError, PreludeError};
use ember_runtime::{sink_writer, EvalError, RuntimeError, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn quiet_gateway() -> Gateway {
    let mut gateway = Gateway::new();
    gateway.set_output(sink_writer());
    gateway
}

fn load_config(dir: &TempDir) -> Config {
    ConfigLoader::with_global_config(dir.path().join("no-global.toml"))
        .load_from_directory(dir.path())
        .unwrap()
}

// ============================================================================
// Operations
// ============================================================================

#[test]
fn test_state_persists_across_calls() {
    let mut gateway = quiet_gateway();
    gateway.evaluate_quietly("var total = 0;").unwrap();
    for n in 1..=4 {
        gateway.assign(f64::from(n), "n").unwrap();
        gateway.evaluate_quietly("total += n;").unwrap();
    }
    assert_eq!(gateway.evaluate("total").unwrap(), Value::Number(10.0));
}

#[test]
fn test_assign_collections() {
    let mut gateway = quiet_gateway();
    gateway.assign(vec![1.0, 2.0, 3.0], "xs").unwrap();
    gateway
        .assign(serde_json::json!({"name": "ember"}), "meta")
        .unwrap();
    assert_eq!(
        gateway.evaluate("meta[\"name\"] + str(len(xs))").unwrap(),
        Value::string("ember3")
    );
}

#[test]
fn test_assign_replaces_let_binding() {
    let mut gateway = quiet_gateway();
    gateway.evaluate("let limit = 1;").unwrap();
    gateway.assign(2.0, "limit").unwrap();
    assert_eq!(gateway.evaluate("limit").unwrap(), Value::Number(2.0));
}

#[rstest]
#[case("")]
#[case("1x")]
#[case("two words")]
#[case("fn")]
#[case("a-b")]
fn test_invalid_names_rejected(#[case] name: &str) {
    let mut gateway = quiet_gateway();
    assert!(matches!(
        gateway.assign(1.0, name),
        Err(GatewayError::InvalidName(_))
    ));
}

#[test]
fn test_evaluate_declaration_yields_null() {
    let mut gateway = quiet_gateway();
    assert_eq!(gateway.evaluate("var x = 1;").unwrap(), Value::Null);
}

#[test]
fn test_runaway_recursion_reports_error() {
    let mut config = Config::default();
    config.set_max_call_depth(16).unwrap();
    let mut gateway = Gateway::from_config(&config).unwrap();
    gateway.set_output(sink_writer());

    let err = gateway
        .evaluate("fn spin(n) { return spin(n + 1); } spin(0)")
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Eval(EvalError::Runtime(RuntimeError::StackOverflow { limit: 16, .. }))
    ));

    // the gateway stays usable
    assert_eq!(gateway.evaluate("1 + 1").unwrap(), Value::Number(2.0));
}

#[test]
fn test_function_alias_outlives_removed_name() {
    let mut gateway = quiet_gateway();
    gateway
        .evaluate("fn f() { return 1; } var g = f;")
        .unwrap();
    assert!(gateway.remove("f"));
    assert_eq!(gateway.evaluate("g()").unwrap(), Value::Number(1.0));
}

#[test]
fn test_assigning_saved_function_after_redefinition() {
    let mut gateway = quiet_gateway();
    gateway.evaluate("fn f() { return 1; }").unwrap();
    let saved = gateway.get("f").unwrap();

    gateway.evaluate("fn f() { return 2; }").unwrap();
    gateway.assign(saved, "old").unwrap();

    assert_eq!(gateway.evaluate("old()").unwrap(), Value::Number(1.0));
    assert_eq!(gateway.evaluate("f()").unwrap(), Value::Number(2.0));
}

#[test]
fn test_bindings_lists_user_names() {
    let mut gateway = quiet_gateway();
    gateway.assign(1.0, "b").unwrap();
    gateway.evaluate("fn a() { return 1; }").unwrap();
    assert_eq!(gateway.bindings(), vec!["a".to_string(), "b".to_string()]);
}

// ============================================================================
// Configuration and preludes
// ============================================================================

#[test]
#[serial]
fn test_prelude_files_then_inline_source() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("lib")).unwrap();
    fs::write(
        temp_dir.path().join("lib/math.em"),
        "fn square(x) { return x * x; } print(\"loaded\");",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join(PROJECT_CONFIG_FILE),
        "[runtime]\nmax_call_depth = 64\nverbose = true\n\n[prelude]\nfiles = [\"lib/math.em\"]\nsource = \"let nine = square(3);\"\n",
    )
    .unwrap();

    let gateway = Gateway::from_config(&load_config(&temp_dir)).unwrap();

    assert_eq!(gateway.get("nine"), Some(Value::Number(9.0)));
    assert_eq!(gateway.max_call_depth(), 64);
    assert!(gateway.is_verbose());
}

#[test]
#[serial]
fn test_missing_prelude_file_fails_construction() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(PROJECT_CONFIG_FILE),
        "[prelude]\nfiles = [\"absent.em\"]\n",
    )
    .unwrap();

    let err = Gateway::from_config(&load_config(&temp_dir)).unwrap_err();
    match err {
        GatewayError::Prelude {
            path,
            source: PreludeError::Io(_),
        } => assert_eq!(path, temp_dir.path().join("absent.em")),
        other => panic!("expected prelude I/O error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_broken_prelude_source_fails_construction() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(PROJECT_CONFIG_FILE),
        "[prelude]\nsource = \"let x = ;\"\n",
    )
    .unwrap();

    let err = Gateway::from_config(&load_config(&temp_dir)).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Prelude {
            source: PreludeError::Eval(EvalError::Parse(_)),
            ..
        }
    ));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_assigned_value_reads_back(
        name in "[a-z_][a-z0-9_]{0,12}",
        n in -1.0e9f64..1.0e9f64,
    ) {
        prop_assume!(ember_runtime::is_valid_identifier(&name));
        let mut gateway = quiet_gateway();
        gateway.assign(n, &name).unwrap();
        prop_assert_eq!(gateway.evaluate(&name).unwrap(), Value::Number(n));
    }

    #[test]
    fn prop_quiet_evaluation_returns_nothing(text in "[a-z ]{0,20}") {
        let mut gateway = quiet_gateway();
        gateway.assign(text.clone(), "t").unwrap();
        prop_assert!(gateway.evaluate_quietly("print(t); t").is_ok());
        prop_assert_eq!(gateway.get("t"), Some(Value::string(text)));
    }
}
