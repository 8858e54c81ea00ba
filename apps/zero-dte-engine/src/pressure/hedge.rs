//! Dealer hedge pressure from the latest price move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::market::calendar::{exchange_date, is_before_session};
use crate::market::{ContractQuote, MinuteBar, ensure_ascending, mean, median};
use crate::session::{Direction, SessionContext};

/// Minimum bars needed to measure a move.
pub const MIN_BARS: usize = 6;

/// Look-back for the price move, in one-minute bars.
pub const LOOKBACK_MINUTES: usize = 5;

/// One-minute moves in one direction needed to call the move consistent.
pub const CONSISTENT_MOVES: usize = 3;

/// Session bars below which the baseline uses medians instead of means.
pub const ROBUST_BASELINE_BARS: usize = 120;

/// Session bars below which the baseline falls back to the trailing window.
const MIN_SESSION_BASELINE_BARS: usize = 10;

/// Trailing window used when the session is too young.
const FALLBACK_WINDOW: usize = 30;

const BASELINE_EPSILON: f64 = 1e-9;

/// Context multipliers, applied in order.
const ALIGNED_MULTIPLIER: f64 = 1.3;
const COUNTER_TREND_MULTIPLIER: f64 = 1.2;
const EXTREME_MULTIPLIER: f64 = 1.2;
const SURGE_MULTIPLIER: f64 = 1.1;
const SURGE_THRESHOLD: f64 = 1.5;

/// Hedge pressure estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgePressure {
    /// Timestamp of the last bar.
    pub timestamp: DateTime<Utc>,
    /// Last close.
    pub spot: f64,
    /// Price change over the look-back.
    pub price_change: f64,
    /// Individual one-minute moves over the look-back.
    pub recent_moves: Vec<f64>,
    /// Shares dealers trade to re-hedge the move.
    pub hedge_shares: f64,
    /// `hedge_shares × spot`.
    pub hedge_dollars: f64,
    /// Session dollar-volume baseline.
    pub baseline_dollars: f64,
    /// `|hedge_dollars| / baseline`.
    pub pressure_ratio: f64,
    /// Pressure after session-context multipliers.
    pub adjusted_pressure: f64,
    /// Pressure direction; directional only when moves are consistent.
    pub direction: Direction,
    /// At least three of the last five moves share a sign.
    pub consistent: bool,
    /// Direction matches the session trend.
    pub trend_aligned: bool,
    /// Recent dollar volume over the baseline.
    pub volume_surge: f64,
    /// Share of up-moves across the baseline window.
    pub session_up_pct: f64,
}

/// Estimate hedge pressure.
///
/// Only contracts expiring on the last bar's exchange date contribute; an
/// empty result is allowed and yields zero pressure. Without a session
/// context the adjusted pressure equals the raw ratio.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientBars`] for fewer than [`MIN_BARS`] bars
/// and [`EngineError::UnorderedBars`] when bars are not strictly ascending.
pub fn estimate_hedge_pressure(
    chain: &[ContractQuote],
    bars: &[MinuteBar],
    session: Option<&SessionContext>,
) -> Result<HedgePressure, EngineError> {
    if bars.len() < MIN_BARS {
        return Err(EngineError::InsufficientBars {
            required: MIN_BARS,
            actual: bars.len(),
        });
    }
    ensure_ascending(bars)?;

    let last = bars[bars.len() - 1];
    let today = exchange_date(last.timestamp);
    let spot = last.close;

    let window = &bars[bars.len() - LOOKBACK_MINUTES - 1..];
    let price_change = spot - window[0].close;
    let recent_moves: Vec<f64> = window.windows(2).map(|w| w[1].close - w[0].close).collect();
    let up_moves = recent_moves.iter().filter(|m| **m > 0.0).count();
    let down_moves = recent_moves.iter().filter(|m| **m < 0.0).count();
    let consistent = up_moves >= CONSISTENT_MOVES || down_moves >= CONSISTENT_MOVES;

    let baseline_bars = baseline_window(bars, today);
    let session_up_pct = up_fraction(baseline_bars);
    let dollar_volume: Vec<f64> = baseline_bars.iter().map(MinuteBar::dollar_volume).collect();
    let (baseline, recent_volume) = volume_baseline(&dollar_volume);

    let hedge_shares: f64 = chain
        .iter()
        .filter(|c| c.expires_on(today))
        .map(|c| c.open_interest_or_zero() * c.gamma_or_zero() * price_change * c.multiplier_or_default())
        .sum();
    let hedge_dollars = hedge_shares * spot;
    let pressure_ratio = hedge_dollars.abs() / (baseline + BASELINE_EPSILON);
    let volume_surge = if baseline > 0.0 {
        recent_volume / baseline
    } else {
        1.0
    };

    let direction = if consistent && hedge_dollars > 0.0 {
        Direction::Bullish
    } else if consistent && hedge_dollars < 0.0 {
        Direction::Bearish
    } else {
        Direction::Flat
    };

    let (adjusted_pressure, trend_aligned, volume_surge, session_up_pct) = match session {
        Some(ctx) => {
            let trend = ctx.trend();
            let trend_aligned = direction != Direction::Flat && direction == trend;
            let mut adjusted = pressure_ratio;
            adjusted *= if trend_aligned {
                ALIGNED_MULTIPLIER
            } else {
                COUNTER_TREND_MULTIPLIER
            };
            if ctx.position().is_some_and(|p| p.is_extreme()) {
                adjusted *= EXTREME_MULTIPLIER;
            }
            if volume_surge > SURGE_THRESHOLD {
                adjusted *= SURGE_MULTIPLIER;
            }
            (adjusted, trend_aligned, volume_surge, session_up_pct)
        }
        None => (pressure_ratio, false, 1.0, 0.5),
    };

    tracing::debug!(
        spot,
        price_change,
        consistent,
        pressure_ratio,
        adjusted_pressure,
        direction = %direction,
        trend_aligned,
        volume_surge,
        baseline_dollars = baseline,
        "Hedge pressure estimated"
    );

    Ok(HedgePressure {
        timestamp: last.timestamp,
        spot,
        price_change,
        recent_moves,
        hedge_shares,
        hedge_dollars,
        baseline_dollars: baseline,
        pressure_ratio,
        adjusted_pressure,
        direction,
        consistent,
        trend_aligned,
        volume_surge,
        session_up_pct,
    })
}

/// Bars from today's open onward, or the trailing window if the session is
/// too young.
fn baseline_window(bars: &[MinuteBar], today: chrono::NaiveDate) -> &[MinuteBar] {
    // Bars are ascending, so the session starts at the first bar not before the open.
    let start = bars.partition_point(|bar| is_before_session(bar.timestamp, today));
    let session = &bars[start..];
    if session.len() < MIN_SESSION_BASELINE_BARS {
        &bars[bars.len().saturating_sub(FALLBACK_WINDOW)..]
    } else {
        session
    }
}

fn up_fraction(bars: &[MinuteBar]) -> f64 {
    let moves = bars.len().saturating_sub(1);
    if moves == 0 {
        return 0.5;
    }
    let ups = bars.windows(2).filter(|w| w[1].close > w[0].close).count();
    ups as f64 / moves as f64
}

/// `(baseline, recent)` dollar volume.
///
/// Short sessions use medians (baseline over the window, recent over the
/// last 10 bars); longer sessions use means (recent over the last 5).
fn volume_baseline(dollar_volume: &[f64]) -> (f64, f64) {
    if dollar_volume.len() < ROBUST_BASELINE_BARS {
        let tail = &dollar_volume[dollar_volume.len().saturating_sub(10)..];
        (
            median(dollar_volume).unwrap_or(0.0),
            median(tail).unwrap_or(0.0),
        )
    } else {
        let tail = &dollar_volume[dollar_volume.len().saturating_sub(5)..];
        (mean(dollar_volume).unwrap_or(0.0), mean(tail).unwrap_or(0.0))
    }
}
