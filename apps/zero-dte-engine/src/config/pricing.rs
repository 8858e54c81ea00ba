//! Pricing inputs shared by the Black-Scholes kernel and the IV solver.

use serde::{Deserialize, Serialize};

/// Pricing model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized, continuous).
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Dividend yield (annualized, continuous).
    #[serde(default)]
    pub dividend_yield: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            dividend_yield: 0.0,
        }
    }
}

const fn default_risk_free_rate() -> f64 {
    0.02
}
