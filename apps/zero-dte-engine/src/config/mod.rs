//! Configuration loading for the 0-DTE engine.
//!
//! Settings come from YAML with environment variable interpolation. Every
//! section is optional and falls back to its defaults, so an empty document
//! is a valid configuration.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zero_dte_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("deploy/engine.yaml"))?;
//!
//! println!("min pressure: {}", config.decision.min_pressure);
//! ```

mod decision;
mod observability;
mod pricing;
mod selection;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use decision::DecisionConfig;
pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use selection::SelectionConfig;

use crate::pricing::IvSolverConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rates for Black-Scholes.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// IV root finder.
    #[serde(default)]
    pub iv_solver: IvSolverConfig,
    /// Decision cascade thresholds.
    #[serde(default)]
    pub decision: DecisionConfig,
    /// Contract selection and sizing.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<EngineConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    // An empty or comment-only document parses as null.
    let config: EngineConfig = if interpolated.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    }) {
        EngineConfig::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    let pricing = &config.pricing;
    if !(0.0..=1.0).contains(&pricing.risk_free_rate) {
        return Err(invalid("pricing.risk_free_rate must be between 0.0 and 1.0"));
    }
    if !(0.0..=1.0).contains(&pricing.dividend_yield) {
        return Err(invalid("pricing.dividend_yield must be between 0.0 and 1.0"));
    }

    let iv = &config.iv_solver;
    if iv.tolerance.is_nan() || iv.tolerance <= 0.0 {
        return Err(invalid("iv_solver.tolerance must be positive"));
    }
    if iv.max_iterations == 0 {
        return Err(invalid("iv_solver.max_iterations must be at least 1"));
    }
    if !(iv.min_vol > 0.0 && iv.min_vol < iv.max_vol && iv.max_vol.is_finite()) {
        return Err(invalid(
            "iv_solver bracket must satisfy 0 < min_vol < max_vol",
        ));
    }
    if iv.price_floor_epsilon.is_nan() || iv.price_floor_epsilon < 0.0 {
        return Err(invalid("iv_solver.price_floor_epsilon must be non-negative"));
    }

    for (name, value) in config.decision.thresholds() {
        if value.is_nan() || value < 0.0 {
            return Err(invalid(format!("decision.{name} must be non-negative")));
        }
    }

    if config.selection.budget <= Decimal::ZERO {
        return Err(invalid("selection.budget must be positive"));
    }
    if config.selection.contract_size == 0 {
        return Err(invalid("selection.contract_size must be positive"));
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(invalid(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}
