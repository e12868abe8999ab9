// tests/config_validation.rs

use std::io::Write;

use lazydag::config::{load_and_validate, load_from_str};
use lazydag::errors::{GraphError, LazydagError};
use lazydag::types::{ExecutionMode, HandlerErrorPolicy};
use lazydag_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::NamedTempFile;

fn load(toml: &str) -> lazydag::errors::Result<lazydag::config::ConfigFile> {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{toml}").unwrap();
    load_and_validate(file.path())
}

fn expect_config_error(toml: &str, needle: &str) {
    match load(toml) {
        Err(LazydagError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_valid_config_with_defaults() {
    let cfg = load(
        r#"
[task.source]
output = "in/source.csv"

[task.report]
params = { day = "2024-01-01", retries = 3 }
cmd = "cat in/source.csv > out/report-{day}.txt"
output = "out/report-{day}.txt"
requires = ["source"]
"#,
    )
    .unwrap();

    assert_eq!(cfg.build.mode, ExecutionMode::Local);
    assert_eq!(cfg.build.handler_errors, HandlerErrorPolicy::Propagate);
    assert_eq!(cfg.task.len(), 2);

    let report = &cfg.task["report"];
    assert!(!report.is_external());
    assert!(cfg.task["source"].is_external());
    let keys: Vec<&str> = report.params.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["day", "retries"]);
}

#[test]
fn test_build_section_is_parsed() {
    let cfg = load(
        r#"
[build]
mode = "distributed"
handler_errors = "isolate"

[task.only]
cmd = "true"
"#,
    )
    .unwrap();

    assert_eq!(cfg.build.mode, ExecutionMode::Distributed);
    assert_eq!(cfg.build.handler_errors, HandlerErrorPolicy::Isolate);
}

#[test]
fn test_unknown_mode_is_a_toml_error() {
    let result = load_from_str(
        r#"
[build]
mode = "cluster"
"#,
    );
    assert!(matches!(result, Err(LazydagError::TomlError(_))));
}

#[test]
fn test_dag_cycle_returns_graph_error() {
    let result = load(
        r#"
[task.A]
cmd = "echo A"
requires = ["B"]

[task.B]
cmd = "echo B"
requires = ["A"]
"#,
    );

    match result {
        Err(LazydagError::Graph(GraphError::Cycle(path))) => {
            assert!(path.iter().any(|n| n == "A" || n == "B"));
        }
        Err(e) => panic!("Expected cycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_requirement_returns_graph_error() {
    let result = load(
        r#"
[task.A]
cmd = "echo A"
requires = ["NonExistent"]
"#,
    );

    match result {
        Err(LazydagError::Graph(GraphError::UnknownRequirement { task, requirement })) => {
            assert_eq!(task, "A");
            assert_eq!(requirement, "NonExistent");
        }
        Err(e) => panic!("Expected UnknownRequirement, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_self_requirement_returns_graph_error() {
    let result = ConfigFileBuilder::new()
        .with_task("A", TaskConfigBuilder::command("echo A").requires("A").build())
        .try_build();

    assert!(matches!(
        result,
        Err(LazydagError::Graph(GraphError::SelfDependency(ref name))) if name == "A"
    ));
}

#[test]
fn test_empty_config_is_rejected() {
    expect_config_error("", "at least one");
}

#[test]
fn test_undeclared_placeholder_is_rejected() {
    expect_config_error(
        r#"
[task.A]
cmd = "echo {day}"
"#,
        "undeclared parameter '{day}'",
    );
}

#[test]
fn test_external_task_needs_output() {
    expect_config_error(
        r#"
[task.source]
requires = []
"#,
        "needs an `output`",
    );
}

#[test]
fn test_non_scalar_param_is_rejected() {
    expect_config_error(
        r#"
[task.A]
cmd = "true"
params = { days = ["mon", "tue"] }
"#,
        "parameter 'days'",
    );
}

#[test]
fn test_invalid_family_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_task(
            "A",
            TaskConfigBuilder::command("true").family("not a family").build(),
        )
        .try_build();

    match result {
        Err(LazydagError::ConfigError(msg)) => assert!(msg.contains("invalid family")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_duplicate_task_identity_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_task(
            "first",
            TaskConfigBuilder::command("true").family("Report").param("day", 1i64).build(),
        )
        .with_task(
            "second",
            TaskConfigBuilder::command("true").family("Report").param("day", 1i64).build(),
        )
        .try_build();

    match result {
        Err(LazydagError::ConfigError(msg)) => {
            assert!(msg.contains("same family and parameters"))
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_same_family_with_different_params_is_allowed() {
    let cfg = ConfigFileBuilder::new()
        .with_task(
            "jan",
            TaskConfigBuilder::external("in/{month}.csv").family("Input").param("month", "jan").build(),
        )
        .with_task(
            "feb",
            TaskConfigBuilder::external("in/{month}.csv").family("Input").param("month", "feb").build(),
        )
        .mode(ExecutionMode::Local)
        .handler_errors(HandlerErrorPolicy::Isolate)
        .build();

    assert_eq!(cfg.task.len(), 2);
    assert_eq!(cfg.build.handler_errors, HandlerErrorPolicy::Isolate);
}

#[test]
fn test_mode_and_policy_parse_from_strings() {
    assert_eq!("Local".parse::<ExecutionMode>(), Ok(ExecutionMode::Local));
    assert_eq!(" distributed ".parse::<ExecutionMode>(), Ok(ExecutionMode::Distributed));
    assert!("cluster".parse::<ExecutionMode>().is_err());

    assert_eq!("isolate".parse::<HandlerErrorPolicy>(), Ok(HandlerErrorPolicy::Isolate));
    assert!("ignore".parse::<HandlerErrorPolicy>().is_err());
    assert_eq!(ExecutionMode::Distributed.to_string(), "distributed");
}
