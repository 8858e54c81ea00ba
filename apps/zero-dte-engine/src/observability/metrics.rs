//! Engine metrics.
//!
//! Recorded through the `metrics` facade. The engine installs no exporter;
//! without a recorder these calls are no-ops.

use metrics::{counter, gauge, histogram};

use crate::decision::{Action, Confidence};
use crate::pricing::IvStatus;

// ============================================================================
// Pricing Metrics
// ============================================================================

/// Record one IV solve.
///
/// # Arguments
///
/// * `status` - Solver outcome
/// * `iterations` - Brent iterations, when the solver got that far
pub fn record_iv_solve(status: IvStatus, iterations: Option<u32>) {
    counter!("iv_solves_total", "status" => status.as_str()).increment(1);

    if let Some(iterations) = iterations {
        histogram!("iv_solver_iterations").record(f64::from(iterations));
    }
}

/// Record a chain enrichment pass.
///
/// # Arguments
///
/// * `duration_seconds` - Wall time for the pass
/// * `contracts` - Contracts processed
pub fn record_greeks_computation(duration_seconds: f64, contracts: usize) {
    histogram!("greeks_computation_seconds").record(duration_seconds);
    counter!("greeks_contracts_total").increment(contracts as u64);
}

// ============================================================================
// Decision Metrics
// ============================================================================

/// Record a decision.
pub fn record_decision(action: Action, confidence: Confidence) {
    counter!(
        "decisions_total",
        "action" => action.as_str(),
        "confidence" => confidence.as_str()
    )
    .increment(1);
}

/// Update the pin strength of the latest gamma profile.
pub fn update_pin_strength(pin_strength: f64) {
    gauge!("gamma_pin_strength").set(pin_strength);
}

// ============================================================================
// Tests
// ============================================================================
