//! Per-strike dealer gamma exposure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::market::{ContractQuote, OptionKind};
use crate::observability::metrics::update_pin_strength;

/// Added to the exposure total so an all-zero ladder yields a pin strength of 0.
const PIN_STRENGTH_EPSILON: f64 = 1e-9;

/// Number of strikes reported in [`GammaDiagnostics::top_strikes`].
pub const TOP_STRIKES: usize = 5;

// ============================================================================
// Types
// ============================================================================

/// Aggregated exposure at one strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeExposure {
    /// Strike price.
    pub strike: f64,
    /// Sum of signed per-contract exposures.
    pub net_gamma_signed: f64,
    /// Sum of absolute per-contract exposures.
    pub abs_gamma: f64,
    /// Open interest across all contracts at the strike.
    pub total_oi: f64,
}

impl StrikeExposure {
    /// Ladder row with the given signed exposure (absolute taken from it).
    #[must_use]
    pub fn new(strike: f64, net_gamma_signed: f64) -> Self {
        Self {
            strike,
            net_gamma_signed,
            abs_gamma: net_gamma_signed.abs(),
            total_oi: 0.0,
        }
    }
}

/// Which side of the zero-gamma strike spot is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GammaRegime {
    /// Spot above the zero-gamma strike.
    ShortGamma,
    /// Spot at or below the zero-gamma strike, or no crossing exists.
    LongGamma,
}

/// Breakdown of the snapshot logged alongside each profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaDiagnostics {
    /// Total call open interest.
    pub call_open_interest: f64,
    /// Total put open interest.
    pub put_open_interest: f64,
    /// Put/call open interest ratio (absent when there is no call OI).
    pub put_call_ratio: Option<f64>,
    /// Signed exposure from calls.
    pub net_call_gamma: f64,
    /// Signed exposure from puts.
    pub net_put_gamma: f64,
    /// Net exposure at strikes at or below spot.
    pub gamma_below_spot: f64,
    /// Net exposure at strikes above spot.
    pub gamma_above_spot: f64,
    /// Largest strikes by absolute exposure, descending.
    pub top_strikes: Vec<StrikeExposure>,
}

/// Gamma exposure profile for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaProfile {
    /// One row per unique strike, ascending.
    pub per_strike: Vec<StrikeExposure>,
    /// Strike with the largest absolute exposure (the pin).
    pub max_gamma_strike: f64,
    /// Absolute exposure at the pin.
    pub max_gamma_abs: f64,
    /// Where net signed exposure crosses zero.
    pub zero_gamma_strike: Option<f64>,
    /// Pin exposure over total absolute exposure, in `[0, 1]`.
    pub pin_strength: f64,
    /// Snapshot breakdown.
    pub diagnostics: GammaDiagnostics,
}

impl GammaProfile {
    /// Gamma regime at `spot`.
    #[must_use]
    pub fn regime(&self, spot: f64) -> GammaRegime {
        match self.zero_gamma_strike {
            Some(zgs) if spot > zgs => GammaRegime::ShortGamma,
            _ => GammaRegime::LongGamma,
        }
    }

    /// Distance from spot to the pin, as a percentage of spot.
    #[must_use]
    pub fn distance_to_pin_pct(&self, spot: f64) -> f64 {
        (spot - self.max_gamma_strike).abs() / spot * 100.0
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Signed exposure of one contract to a 1% move in the underlying.
///
/// `open_interest × gamma × (spot × 0.01) × multiplier`, with missing gamma
/// and open interest treated as zero.
#[must_use]
pub fn signed_exposure_1pct(quote: &ContractQuote, spot: f64) -> f64 {
    quote.open_interest_or_zero() * quote.gamma_or_zero() * (spot * 0.01) * quote.multiplier_or_default()
}

/// Build the gamma profile from contracts expiring on `today`.
///
/// # Errors
///
/// Returns [`EngineError::NoContractsForExpiry`] when nothing in the chain
/// expires on `today`.
pub fn build_gamma_profile(
    chain: &[ContractQuote],
    spot: f64,
    today: NaiveDate,
) -> Result<GammaProfile, EngineError> {
    let mut contracts: Vec<(&ContractQuote, f64)> = chain
        .iter()
        .filter(|c| c.expires_on(today) && c.strike.is_finite())
        .map(|c| (c, signed_exposure_1pct(c, spot)))
        .collect();
    if contracts.is_empty() {
        return Err(EngineError::NoContractsForExpiry { date: today });
    }
    contracts.sort_by(|a, b| a.0.strike.total_cmp(&b.0.strike));

    let per_strike = aggregate_by_strike(&contracts);

    // First maximum in ascending strike order wins ties.
    let mut pin = per_strike[0];
    for row in &per_strike[1..] {
        if row.abs_gamma > pin.abs_gamma {
            pin = *row;
        }
    }

    let total_abs: f64 = per_strike.iter().map(|row| row.abs_gamma).sum();
    let pin_strength = pin.abs_gamma / (total_abs + PIN_STRENGTH_EPSILON);
    let zero_gamma_strike = zero_gamma_crossing(&per_strike);
    let diagnostics = diagnostics(&contracts, &per_strike, spot);

    tracing::debug!(
        spot,
        max_gamma_strike = pin.strike,
        max_gamma_abs = pin.abs_gamma,
        zero_gamma_strike = ?zero_gamma_strike,
        pin_strength,
        call_oi = diagnostics.call_open_interest,
        put_oi = diagnostics.put_open_interest,
        put_call_ratio = ?diagnostics.put_call_ratio,
        net_call_gamma = diagnostics.net_call_gamma,
        net_put_gamma = diagnostics.net_put_gamma,
        gamma_below_spot = diagnostics.gamma_below_spot,
        gamma_above_spot = diagnostics.gamma_above_spot,
        "Gamma profile built"
    );
    for row in &diagnostics.top_strikes {
        tracing::trace!(
            strike = row.strike,
            net_gamma = row.net_gamma_signed,
            total_oi = row.total_oi,
            "Top gamma strike"
        );
    }
    update_pin_strength(pin_strength);

    Ok(GammaProfile {
        per_strike,
        max_gamma_strike: pin.strike,
        max_gamma_abs: pin.abs_gamma,
        zero_gamma_strike,
        pin_strength,
        diagnostics,
    })
}

/// Group contracts (already sorted by strike) into one row per strike.
fn aggregate_by_strike(contracts: &[(&ContractQuote, f64)]) -> Vec<StrikeExposure> {
    let mut rows: Vec<StrikeExposure> = Vec::new();
    for (quote, exposure) in contracts {
        match rows.last_mut() {
            Some(row) if row.strike == quote.strike => {
                row.net_gamma_signed += exposure;
                row.abs_gamma += exposure.abs();
                row.total_oi += quote.open_interest_or_zero();
            }
            _ => rows.push(StrikeExposure {
                strike: quote.strike,
                net_gamma_signed: *exposure,
                abs_gamma: exposure.abs(),
                total_oi: quote.open_interest_or_zero(),
            }),
        }
    }
    rows
}

/// Zero-gamma strike of an ascending ladder.
///
/// Scans strikes in ascending order. A strike whose net exposure is exactly
/// zero is returned as is; otherwise the first adjacent pair with opposite
/// signs is interpolated linearly on exposure magnitude. `None` when the
/// ladder never crosses zero.
#[must_use]
pub fn zero_gamma_crossing(ladder: &[StrikeExposure]) -> Option<f64> {
    for (i, row) in ladder.iter().enumerate() {
        let g0 = row.net_gamma_signed;
        if g0 == 0.0 {
            return Some(row.strike);
        }
        let Some(next) = ladder.get(i + 1) else {
            break;
        };
        let g1 = next.net_gamma_signed;
        if (g0 < 0.0 && g1 > 0.0) || (g0 > 0.0 && g1 < 0.0) {
            let w = g0.abs() / (g0.abs() + g1.abs());
            return Some(row.strike * (1.0 - w) + next.strike * w);
        }
    }
    None
}

fn diagnostics(
    contracts: &[(&ContractQuote, f64)],
    per_strike: &[StrikeExposure],
    spot: f64,
) -> GammaDiagnostics {
    let mut call_open_interest = 0.0;
    let mut put_open_interest = 0.0;
    let mut net_call_gamma = 0.0;
    let mut net_put_gamma = 0.0;
    for (quote, exposure) in contracts {
        match quote.option_type {
            OptionKind::Call => {
                call_open_interest += quote.open_interest_or_zero();
                net_call_gamma += exposure;
            }
            OptionKind::Put => {
                put_open_interest += quote.open_interest_or_zero();
                net_put_gamma += exposure;
            }
        }
    }

    let (below, above): (Vec<&StrikeExposure>, Vec<&StrikeExposure>) =
        per_strike.iter().partition(|row| row.strike <= spot);

    let mut top_strikes = per_strike.to_vec();
    // Stable sort keeps ascending strike order among equal exposures.
    top_strikes.sort_by(|a, b| b.abs_gamma.total_cmp(&a.abs_gamma));
    top_strikes.truncate(TOP_STRIKES);

    GammaDiagnostics {
        call_open_interest,
        put_open_interest,
        put_call_ratio: (call_open_interest > 0.0).then(|| put_open_interest / call_open_interest),
        net_call_gamma,
        net_put_gamma,
        gamma_below_spot: below.iter().map(|row| row.net_gamma_signed).sum(),
        gamma_above_spot: above.iter().map(|row| row.net_gamma_signed).sum(),
        top_strikes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn contract(strike: f64, kind: OptionKind, oi: f64, gamma: f64) -> ContractQuote {
        ContractQuote::new("X", strike, today(), kind)
            .with_open_interest(oi)
            .with_gamma(gamma)
    }

    #[test]
    fn test_zero_gamma_interpolates_midpoint() {
        let ladder = [
            StrikeExposure::new(95.0, -10.0),
            StrikeExposure::new(100.0, 10.0),
            StrikeExposure::new(105.0, 20.0),
        ];
        assert_eq!(zero_gamma_crossing(&ladder), Some(97.5));
    }

    #[test]
    fn test_zero_gamma_exact_strike() {
        let ladder = [
            StrikeExposure::new(95.0, 5.0),
            StrikeExposure::new(100.0, 0.0),
            StrikeExposure::new(105.0, -5.0),
        ];
        assert_eq!(zero_gamma_crossing(&ladder), Some(100.0));

        let last_zero = [StrikeExposure::new(95.0, 5.0), StrikeExposure::new(100.0, 0.0)];
        assert_eq!(zero_gamma_crossing(&last_zero), Some(100.0));
    }

    #[test]
    fn test_zero_gamma_absent_without_crossing() {
        let ladder = [StrikeExposure::new(95.0, 5.0), StrikeExposure::new(100.0, 7.0)];
        assert_eq!(zero_gamma_crossing(&ladder), None);
        assert_eq!(zero_gamma_crossing(&[]), None);
    }

    #[test]
    fn test_profile_aggregates_by_strike() {
        let chain = vec![
            contract(100.0, OptionKind::Call, 10.0, 0.5),
            contract(100.0, OptionKind::Put, 30.0, 0.5),
            contract(105.0, OptionKind::Call, 10.0, 0.25),
        ];
        let profile = build_gamma_profile(&chain, 100.0, today()).unwrap();

        // spot*0.01 = 1, multiplier 100
        assert_eq!(profile.per_strike.len(), 2);
        assert_eq!(profile.per_strike[0].net_gamma_signed, 2000.0);
        assert_eq!(profile.per_strike[0].total_oi, 40.0);
        assert_eq!(profile.per_strike[1].net_gamma_signed, 250.0);
        assert_eq!(profile.max_gamma_strike, 100.0);
        assert_eq!(profile.max_gamma_abs, 2000.0);
        assert_eq!(profile.zero_gamma_strike, None);
        assert!((profile.pin_strength - 2000.0 / 2250.0).abs() < 1e-9);
        assert_eq!(profile.regime(100.0), GammaRegime::LongGamma);
    }

    #[test]
    fn test_profile_filters_other_expiries() {
        let tomorrow = today().succ_opt().unwrap();
        let chain = vec![
            contract(100.0, OptionKind::Call, 10.0, 0.5),
            ContractQuote::new("Y", 110.0, tomorrow, OptionKind::Call)
                .with_open_interest(1e6)
                .with_gamma(1.0),
        ];
        let profile = build_gamma_profile(&chain, 100.0, today()).unwrap();
        assert_eq!(profile.per_strike.len(), 1);
        assert_eq!(profile.max_gamma_strike, 100.0);

        assert_eq!(
            build_gamma_profile(&chain, 100.0, tomorrow.succ_opt().unwrap()),
            Err(EngineError::NoContractsForExpiry {
                date: tomorrow.succ_opt().unwrap()
            })
        );
    }

    #[test]
    fn test_missing_gamma_counts_as_zero() {
        let chain = vec![
            ContractQuote::new("X", 100.0, today(), OptionKind::Call).with_open_interest(500.0),
            contract(105.0, OptionKind::Put, 10.0, 0.1),
        ];
        let profile = build_gamma_profile(&chain, 100.0, today()).unwrap();
        assert_eq!(profile.per_strike[0].net_gamma_signed, 0.0);
        assert_eq!(profile.per_strike[0].total_oi, 500.0);
        assert_eq!(profile.max_gamma_strike, 105.0);
        // strike 100 sits at exactly zero exposure
        assert_eq!(profile.zero_gamma_strike, Some(100.0));
        assert_eq!(profile.regime(101.0), GammaRegime::ShortGamma);
    }

    #[test]
    fn test_all_zero_exposure_pin_strength() {
        let chain = vec![contract(100.0, OptionKind::Call, 0.0, 0.5)];
        let profile = build_gamma_profile(&chain, 100.0, today()).unwrap();
        assert_eq!(profile.pin_strength, 0.0);
    }

    #[test]
    fn test_diagnostics() {
        let chain = vec![
            contract(95.0, OptionKind::Put, 20.0, 0.5),
            contract(100.0, OptionKind::Call, 10.0, 0.5),
            contract(105.0, OptionKind::Call, 10.0, 0.5),
        ];
        let profile = build_gamma_profile(&chain, 100.0, today()).unwrap();
        let diag = &profile.diagnostics;
        assert_eq!(diag.call_open_interest, 20.0);
        assert_eq!(diag.put_open_interest, 20.0);
        assert_eq!(diag.put_call_ratio, Some(1.0));
        assert_eq!(diag.net_put_gamma, 1000.0);
        assert_eq!(diag.net_call_gamma, 1000.0);
        assert_eq!(diag.gamma_below_spot, 1500.0);
        assert_eq!(diag.gamma_above_spot, 500.0);
        assert_eq!(diag.top_strikes[0].strike, 95.0);
        assert_eq!(diag.top_strikes.len(), 3);
    }
}
