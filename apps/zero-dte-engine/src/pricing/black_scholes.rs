//! Black-Scholes-Merton pricing kernel.
//!
//! Closed-form European price and Greeks under lognormal diffusion with a
//! continuous dividend yield. Price is per share; Greeks are scaled by the
//! contract multiplier and theta is per calendar day.
//!
//! Degenerate inputs (`t <= 0`, `sigma <= 0`, `s <= 0` or `k <= 0`) price at
//! discounted intrinsic value with every Greek exactly zero.

// Black-Scholes uses standard mathematical notation (s, k, t, r, q, sigma)
// Financial formulas use standard notation where mul_add() obscures meaning
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

use crate::market::OptionKind;

/// Calendar days per year used for theta.
pub const DAYS_PER_YEAR: f64 = 365.0;

// ============================================================================
// Normal Distribution
// ============================================================================

/// Standard normal CDF.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal PDF.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

// ============================================================================
// Results
// ============================================================================

/// Option Greeks, scaled by the contract multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta.
    pub delta: f64,
    /// Gamma.
    pub gamma: f64,
    /// Vega (per 1.00 change in volatility).
    pub vega: f64,
    /// Theta per calendar day.
    pub theta: f64,
    /// Rho (per 1.00 change in rate).
    pub rho: f64,
}

impl Greeks {
    /// All-zero Greeks.
    pub const ZERO: Self = Self {
        delta: 0.0,
        gamma: 0.0,
        vega: 0.0,
        theta: 0.0,
        rho: 0.0,
    };

    /// Whether every Greek is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.delta == 0.0
            && self.gamma == 0.0
            && self.vega == 0.0
            && self.theta == 0.0
            && self.rho == 0.0
    }
}

/// Price and Greeks from a single kernel evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedOption {
    /// Option price per share.
    pub price: f64,
    /// Greeks scaled by the multiplier.
    pub greeks: Greeks,
}

// ============================================================================
// Kernel
// ============================================================================

fn is_degenerate(s: f64, k: f64, sigma: f64, t: f64) -> bool {
    !(t > 0.0 && sigma > 0.0 && s > 0.0 && k > 0.0)
}

/// Discounted intrinsic value.
#[must_use]
pub fn discounted_intrinsic(s: f64, k: f64, r: f64, q: f64, t: f64, kind: OptionKind) -> f64 {
    let forward_spot = s * (-q * t).exp();
    let pv_strike = k * (-r * t).exp();
    match kind {
        OptionKind::Call => (forward_spot - pv_strike).max(0.0),
        OptionKind::Put => (pv_strike - forward_spot).max(0.0),
    }
}

fn d1_d2(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> (f64, f64) {
    let sig_rt = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / sig_rt;
    (d1, d1 - sig_rt)
}

/// Black-Scholes price per share.
#[must_use]
pub fn price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64, kind: OptionKind) -> f64 {
    if is_degenerate(s, k, sigma, t) {
        return discounted_intrinsic(s, k, r, q, t, kind);
    }
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    let df_q = (-q * t).exp();
    let df_r = (-r * t).exp();
    match kind {
        OptionKind::Call => s * df_q * norm_cdf(d1) - k * df_r * norm_cdf(d2),
        OptionKind::Put => k * df_r * norm_cdf(-d2) - s * df_q * norm_cdf(-d1),
    }
}

/// Black-Scholes Greeks scaled by `multiplier`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn greeks(
    s: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    t: f64,
    kind: OptionKind,
    multiplier: f64,
) -> Greeks {
    if is_degenerate(s, k, sigma, t) {
        return Greeks::ZERO;
    }
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    let sqrt_t = t.sqrt();
    let df_q = (-q * t).exp();
    let df_r = (-r * t).exp();
    let pdf_d1 = norm_pdf(d1);
    let decay = -(s * df_q * pdf_d1 * sigma) / (2.0 * sqrt_t);

    let (delta, theta, rho) = match kind {
        OptionKind::Call => (
            df_q * norm_cdf(d1),
            decay - r * df_r * k * norm_cdf(d2) + q * df_q * s * norm_cdf(d1),
            k * t * df_r * norm_cdf(d2),
        ),
        OptionKind::Put => (
            -df_q * norm_cdf(-d1),
            decay + r * df_r * k * norm_cdf(-d2) - q * df_q * s * norm_cdf(-d1),
            -k * t * df_r * norm_cdf(-d2),
        ),
    };
    let gamma = df_q * pdf_d1 / (s * sigma * sqrt_t);
    let vega = s * df_q * pdf_d1 * sqrt_t;

    Greeks {
        delta: delta * multiplier,
        gamma: gamma * multiplier,
        vega: vega * multiplier,
        theta: theta * multiplier / DAYS_PER_YEAR,
        rho: rho * multiplier,
    }
}

/// Price and Greeks in one call.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn price_and_greeks(
    s: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    t: f64,
    kind: OptionKind,
    multiplier: f64,
) -> PricedOption {
    PricedOption {
        price: price(s, k, r, q, sigma, t, kind),
        greeks: greeks(s, k, r, q, sigma, t, kind, multiplier),
    }
}
