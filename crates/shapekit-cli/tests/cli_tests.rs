//! Integration tests for the `shapekit` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the parse, prune and
//! enum subcommands through the actual binary, including stdin/stdout piping,
//! file I/O, exit codes and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

/// Helper: path to the payload.json fixture (nulls + pollution keys).
fn payload_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/payload.json")
}

/// Helper: path to the status.json fixture (numeric enum with reverse entries).
fn status_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/status.json")
}

/// Helper: run the binary and parse its stdout as JSON.
fn run_json(args: &[&str], stdin: Option<&str>) -> Value {
    let mut cmd = Command::cargo_bin("shapekit").unwrap();
    cmd.args(args);
    if let Some(input) = stdin {
        cmd.write_stdin(input);
    }
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// parse subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parse_stdin_strips_forbidden_keys() {
    let value = run_json(&["parse"], Some(r#"{"a":1,"__proto__":{"admin":true}}"#));
    assert_eq!(value, json!({"a": 1}));
}

#[test]
fn parse_file_keeps_nulls_without_prune() {
    let value = run_json(&["parse", "-i", payload_path()], None);
    assert_eq!(
        value,
        json!({
            "user": {"name": "Alice", "nickname": null, "roles": ["editor", null, "viewer"]},
            "session": null
        })
    );
}

#[test]
fn parse_with_prune_removes_nulls() {
    let value = run_json(&["parse", "--prune", "-i", payload_path()], None);
    assert_eq!(
        value,
        json!({"user": {"name": "Alice", "roles": ["editor", "viewer"]}})
    );
}

#[test]
fn parse_output_is_compact_by_default() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .arg("parse")
        .write_stdin(r#"{ "a" : [1, 2] }"#)
        .assert()
        .success()
        .stdout("{\"a\":[1,2]}\n");
}

#[test]
fn parse_with_indent_pretty_prints() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["parse", "--indent", "2"])
        .write_stdin(r#"{"a":1}"#)
        .assert()
        .success()
        .stdout("{\n  \"a\": 1\n}\n");
}

#[test]
fn parse_file_to_file() {
    let dir = std::env::temp_dir();
    let output_path = dir.join("shapekit-test-parse-output.json");
    let _ = std::fs::remove_file(&output_path);

    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["parse", "--prune", "-i", payload_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    let value: Value = serde_json::from_str(&content).unwrap();
    assert!(value.get("constructor").is_none());
    assert!(value.get("session").is_none());

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn parse_invalid_json_fails() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .arg("parse")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse JSON"));
}

#[test]
fn parse_missing_file_fails() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["parse", "-i", "/nonexistent/shapekit-input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn verbose_logs_dropped_keys() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["parse", "-v"])
        .env_remove("RUST_LOG")
        .write_stdin(r#"{"constructor":1}"#)
        .assert()
        .success()
        .stdout("{}\n")
        .stderr(predicate::str::contains("dropped forbidden key"));
}

// ─────────────────────────────────────────────────────────────────────────────
// prune subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn prune_stdin() {
    let value = run_json(&["prune"], Some(r#"{"a":null,"b":[1,null,2],"c":{"d":null}}"#));
    assert_eq!(value, json!({"b": [1, 2], "c": {}}));
}

#[test]
fn prune_also_strips_forbidden_keys() {
    let value = run_json(&["prune", "-i", payload_path()], None);
    assert!(value["user"].get("__proto__").is_none());
    assert_eq!(value["user"]["roles"], json!(["editor", "viewer"]));
}

#[test]
fn prune_top_level_null_is_null() {
    let value = run_json(&["prune"], Some("null"));
    assert_eq!(value, Value::Null);
}

// ─────────────────────────────────────────────────────────────────────────────
// enum subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn enum_keys_skip_reverse_entries() {
    let value = run_json(&["enum", "keys", "-i", status_path()], None);
    assert_eq!(value, json!(["Active", "Suspended", "Archived"]));
}

#[test]
fn enum_values_and_entries() {
    let values = run_json(&["enum", "values", "-i", status_path()], None);
    assert_eq!(values, json!([1, 2, "archived"]));

    let entries = run_json(&["enum", "entries", "-i", status_path()], None);
    assert_eq!(
        entries,
        json!([["Active", 1], ["Suspended", 2], ["Archived", "archived"]])
    );
}

#[test]
fn enum_key_lookup_by_number_and_string() {
    let by_number = run_json(&["enum", "key", "2", "-i", status_path()], None);
    assert_eq!(by_number, json!("Suspended"));

    let by_string = run_json(&["enum", "key", "archived", "-i", status_path()], None);
    assert_eq!(by_string, json!("Archived"));
}

#[test]
fn enum_key_quoted_number_is_a_string() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "key", "\"2\"", "-i", status_path()])
        .assert()
        .code(1)
        .stdout("null\n");
}

#[test]
fn enum_value_lookup() {
    let value = run_json(&["enum", "value", "Active", "-i", status_path()], None);
    assert_eq!(value, json!(1));
}

#[test]
fn enum_parse_member_and_non_member() {
    let member = run_json(&["enum", "parse", "1", "-i", status_path()], None);
    assert_eq!(member, json!(1));

    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "parse", "3", "-i", status_path()])
        .assert()
        .code(1)
        .stdout("null\n");
}

#[test]
fn enum_has_key_and_has_value() {
    let has_key = run_json(&["enum", "has-key", "Archived", "-i", status_path()], None);
    assert_eq!(has_key, json!(true));

    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "has-key", "1", "-i", status_path()])
        .assert()
        .code(1)
        .stdout("false\n");

    let has_value = run_json(&["enum", "has-value", "2", "-i", status_path()], None);
    assert_eq!(has_value, json!(true));
}

#[test]
fn enum_from_stdin() {
    let value = run_json(&["enum", "keys"], Some(r#"{"Low":0,"0":"Low","High":9}"#));
    assert_eq!(value, json!(["Low", "High"]));
}

#[test]
fn enum_rejects_non_primitive_members() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "keys"])
        .write_stdin(r#"{"A":[1]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is not an enum mapping"));
}

#[test]
fn enum_values_keep_large_integers_exact() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "values"])
        .write_stdin(r#"{"Big":100000000000000000000,"Huge":1e21}"#)
        .assert()
        .success()
        .stdout("[100000000000000000000,1e21]\n");
}

#[test]
fn enum_has_key_treats_infinity_as_numeric() {
    Command::cargo_bin("shapekit")
        .unwrap()
        .args(["enum", "has-key", "Infinity"])
        .write_stdin(r#"{"Big":1e300,"Infinity":"Big"}"#)
        .assert()
        .code(1)
        .stdout("false\n");
}
