//! Configuration loading from disk.

use std::io::Write;

use rust_decimal::Decimal;
use tempfile::NamedTempFile;
use zero_dte_engine::config::ConfigError;
use zero_dte_engine::{DecisionEngine, load_config};

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
pricing:
  risk_free_rate: 0.043
  dividend_yield: 0.013
iv_solver:
  tolerance: 1.0e-8
  max_iterations: 200
decision:
  min_pressure: 3.0
  close_avoid_minutes: 30
selection:
  budget: "500"
  contract_size: 100
observability:
  logging:
    level: debug
    format: pretty
"#,
    );

    let config = load_config(file.path().to_str()).unwrap();
    assert!((config.pricing.dividend_yield - 0.013).abs() < f64::EPSILON);
    assert_eq!(config.iv_solver.max_iterations, 200);
    assert_eq!(config.decision.close_avoid_minutes, 30);
    assert_eq!(config.selection.budget, Decimal::new(500, 0));
    assert_eq!(config.observability.logging.format, "pretty");

    let engine = DecisionEngine::new(config.decision);
    assert_eq!(engine.config().min_pressure, 3.0);
}

#[test]
fn test_env_interpolation_in_file() {
    let file = write_config(
        r"
decision:
  close_avoid_minutes: ${ZERO_DTE_TEST_UNSET_CLOSE_AVOID:-20}
observability:
  logging:
    level: ${ZERO_DTE_TEST_UNSET_LOG_LEVEL:-warn}
",
    );

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.decision.close_avoid_minutes, 20);
    assert_eq!(config.observability.logging.level, "warn");
}

#[test]
fn test_malformed_yaml_is_parse_error() {
    let file = write_config("decision: [unclosed\n");
    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_invalid_values_fail_validation() {
    let file = write_config(
        r"
iv_solver:
  tolerance: 0.0
",
    );
    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("iv_solver.tolerance"));
}
