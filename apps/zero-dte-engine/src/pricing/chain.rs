//! Chain IV and Greeks enrichment.
//!
//! Solves implied volatility for every contract in a snapshot and fills in
//! per-share Greeks from the solved volatility. Contracts are independent, so
//! the work is spread across the rayon pool.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::black_scholes::{Greeks, greeks};
use super::iv::{IvSolver, IvSolverConfig, IvStatus};
use crate::config::PricingConfig;
use crate::market::calendar::{session_close_utc, year_fraction_act_365};
use crate::market::{ContractQuote, valid_mid};
use crate::observability::metrics::record_greeks_computation;

/// Price used to back out implied volatility: a quality-checked mid, else the
/// last trade.
#[must_use]
pub fn price_for_iv(quote: &ContractQuote) -> Option<f64> {
    valid_mid(quote.bid, quote.ask).or_else(|| quote.last.filter(|p| p.is_finite() && *p > 0.0))
}

/// Year fraction from `now` to the 16:00 exchange close on the expiry date.
#[must_use]
pub fn time_to_expiry(quote: &ContractQuote, now: DateTime<Utc>) -> f64 {
    session_close_utc(quote.expiration).map_or(0.0, |close| year_fraction_act_365(now, close))
}

/// Per-snapshot solve counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    /// Contracts processed.
    pub total: usize,
    /// Solves that converged.
    pub solved: usize,
    /// Solves that hit the iteration cap.
    pub max_iter: usize,
    /// Solves with no bracket.
    pub no_bracket: usize,
    /// Contracts with no usable price.
    pub unpriced: usize,
}

/// Enriched snapshot plus solve statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedChain {
    /// Contracts with `implied_volatility` and Greeks filled in.
    pub contracts: Vec<ContractQuote>,
    /// Solve counts.
    pub stats: EnrichmentStats,
}

enum Outcome {
    Solved(IvStatus),
    Unpriced,
}

/// Fills implied volatility and Greeks for a chain snapshot.
#[derive(Debug, Clone)]
pub struct ChainEnricher {
    pricing: PricingConfig,
    solver: IvSolver,
}

impl ChainEnricher {
    /// Create an enricher.
    #[must_use]
    pub const fn new(pricing: PricingConfig, solver: IvSolverConfig) -> Self {
        Self {
            pricing,
            solver: IvSolver::new(solver),
        }
    }

    /// Enrich every contract against `spot` as of `now`.
    ///
    /// Greeks are per share (multiplier 1) so downstream exposure math can
    /// apply each contract's own multiplier. Contracts whose solve does not
    /// converge, or that have no usable price, get zero Greeks and no IV.
    #[must_use]
    pub fn enrich(&self, chain: &[ContractQuote], spot: f64, now: DateTime<Utc>) -> EnrichedChain {
        let started = Instant::now();

        let results: Vec<(ContractQuote, Outcome)> = chain
            .par_iter()
            .map(|quote| self.enrich_one(quote, spot, now))
            .collect();

        let mut stats = EnrichmentStats {
            total: results.len(),
            ..EnrichmentStats::default()
        };
        let contracts = results
            .into_iter()
            .map(|(quote, outcome)| {
                match outcome {
                    Outcome::Solved(IvStatus::Ok) => stats.solved += 1,
                    Outcome::Solved(IvStatus::MaxIter) => stats.max_iter += 1,
                    Outcome::Solved(IvStatus::NoBracket) => stats.no_bracket += 1,
                    Outcome::Unpriced => stats.unpriced += 1,
                }
                quote
            })
            .collect();

        record_greeks_computation(started.elapsed().as_secs_f64(), stats.total);
        tracing::debug!(
            total = stats.total,
            solved = stats.solved,
            max_iter = stats.max_iter,
            no_bracket = stats.no_bracket,
            unpriced = stats.unpriced,
            "Chain enriched"
        );

        EnrichedChain { contracts, stats }
    }

    fn enrich_one(
        &self,
        quote: &ContractQuote,
        spot: f64,
        now: DateTime<Utc>,
    ) -> (ContractQuote, Outcome) {
        let mut enriched = quote.clone();
        enriched.underlying_price = Some(spot);

        let Some(target) = price_for_iv(quote) else {
            apply_greeks(&mut enriched, None, Greeks::ZERO);
            return (enriched, Outcome::Unpriced);
        };

        let t = time_to_expiry(quote, now);
        let (r, q) = (self.pricing.risk_free_rate, self.pricing.dividend_yield);
        let solution = self
            .solver
            .solve(target, spot, quote.strike, r, q, t, quote.option_type);

        match solution.converged_sigma().filter(|sigma| *sigma > 0.0) {
            Some(sigma) => {
                let g = greeks(spot, quote.strike, r, q, sigma, t, quote.option_type, 1.0);
                apply_greeks(&mut enriched, Some(sigma), g);
            }
            None => apply_greeks(&mut enriched, None, Greeks::ZERO),
        }
        (enriched, Outcome::Solved(solution.status))
    }
}

fn apply_greeks(quote: &mut ContractQuote, sigma: Option<f64>, g: Greeks) {
    quote.implied_volatility = sigma;
    quote.delta = Some(g.delta);
    quote.gamma = Some(g.gamma);
    quote.theta = Some(g.theta);
    quote.vega = Some(g.vega);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::OptionKind;
    use crate::pricing::black_scholes::price;
    use chrono::{NaiveDate, TimeZone};

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn now() -> DateTime<Utc> {
        // 14:00 ET, two hours before the close
        Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_price_for_iv_prefers_valid_mid() {
        let quote = ContractQuote::new("X", 500.0, expiry(), OptionKind::Call)
            .with_quote(1.0, 1.5)
            .with_last(2.0);
        assert_eq!(price_for_iv(&quote), Some(1.25));

        let wide = ContractQuote::new("X", 500.0, expiry(), OptionKind::Call)
            .with_quote(0.1, 1.0)
            .with_last(0.4);
        assert_eq!(price_for_iv(&wide), Some(0.4));

        let empty = ContractQuote::new("X", 500.0, expiry(), OptionKind::Call);
        assert_eq!(price_for_iv(&empty), None);
    }

    #[test]
    fn test_time_to_expiry_uses_close() {
        let quote = ContractQuote::new("X", 500.0, expiry(), OptionKind::Call);
        let expected = 2.0 / (365.0 * 24.0);
        assert!((time_to_expiry(&quote, now()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_enrich_recovers_vol_and_zeroes_failures() {
        let pricing = PricingConfig::default();
        let spot = 500.0;
        let t = 2.0 / (365.0 * 24.0);
        let model = price(
            spot,
            502.0,
            pricing.risk_free_rate,
            pricing.dividend_yield,
            0.2,
            t,
            OptionKind::Call,
        );

        let chain = vec![
            ContractQuote::new("GOOD", 502.0, expiry(), OptionKind::Call).with_last(model),
            ContractQuote::new("NOPRICE", 505.0, expiry(), OptionKind::Call),
            // worth more than the underlying: no bracket
            ContractQuote::new("BAD", 495.0, expiry(), OptionKind::Put).with_last(900.0),
        ];

        let enricher = ChainEnricher::new(pricing, IvSolverConfig::default());
        let enriched = enricher.enrich(&chain, spot, now());

        assert_eq!(
            enriched.stats,
            EnrichmentStats {
                total: 3,
                solved: 1,
                max_iter: 0,
                no_bracket: 1,
                unpriced: 1,
            }
        );
        let good = &enriched.contracts[0];
        assert!((good.implied_volatility.unwrap() - 0.2).abs() < 1e-4);
        assert!(good.gamma.unwrap() > 0.0);
        assert_eq!(good.underlying_price, Some(spot));

        for failed in &enriched.contracts[1..] {
            assert_eq!(failed.implied_volatility, None);
            assert_eq!(failed.gamma, Some(0.0));
            assert_eq!(failed.delta, Some(0.0));
        }
    }
}
