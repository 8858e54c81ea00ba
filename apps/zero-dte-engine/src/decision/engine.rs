//! Rule cascade turning gamma, session and pressure into a decision.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. End-of-day cutoff
//! 2. Insufficient session data
//! 3. No consistent direction
//! 4. Pin defense (or breakout from the pin at a session extreme)
//! 5. Trend-aligned strong pressure
//! 6. Counter-trend reversal at a session extreme
//! 7. Pin magnetism
//! 8. Default no-trade

use chrono::{DateTime, Utc};

use super::types::{Action, Confidence, Decision, DecisionDetails};
use crate::config::DecisionConfig;
use crate::error::EngineError;
use crate::gamma::{GammaRegime, build_gamma_profile};
use crate::market::calendar::{exchange_date, hours_to_close};
use crate::market::{ContractQuote, MinuteBar, ensure_ascending};
use crate::observability::metrics::record_decision;
use crate::pressure::{MIN_BARS, estimate_hedge_pressure};
use crate::session::{Direction, RangePosition, VwapPosition, build_session_context};

/// Bars used to measure whether price is stuck at the pin.
const PIN_RANGE_BARS: usize = 10;

/// Stateless decision engine.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: DecisionConfig,
}

/// Session labels the cascade reads.
#[derive(Debug, Clone, Copy)]
struct SessionSignals {
    trend: Direction,
    position: RangePosition,
    vwap_position: VwapPosition,
}

/// Scalar inputs to the cascade.
#[derive(Debug, Clone, Copy)]
struct Signals {
    spot: f64,
    pin_strike: f64,
    distance_to_pin_pct: f64,
    minutes_to_close: f64,
    recent_range_pct: f64,
    adjusted_pressure: f64,
    direction: Direction,
    consistent: bool,
    trend_aligned: bool,
    gamma_near_vwap: bool,
    regime: GammaRegime,
    session: Option<SessionSignals>,
}

/// Cascade outcome before the details payload is attached.
#[derive(Debug, Clone, PartialEq)]
struct Verdict {
    action: Action,
    confidence: Confidence,
    reason: String,
    regime: Option<GammaRegime>,
    pinned: bool,
}

impl Verdict {
    fn new(action: Action, confidence: Confidence, reason: impl Into<String>) -> Self {
        Self {
            action,
            confidence,
            reason: reason.into(),
            regime: None,
            pinned: false,
        }
    }

    const fn with_regime(mut self, regime: GammaRegime) -> Self {
        self.regime = Some(regime);
        self
    }

    const fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

const fn action_for(direction: Direction) -> Action {
    match direction {
        Direction::Bullish => Action::Call,
        Direction::Bearish => Action::Put,
        Direction::Flat => Action::NoTrade,
    }
}

impl DecisionEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Decision thresholds.
    #[must_use]
    pub const fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Run one decision cycle.
    ///
    /// `now` defaults to the last bar's timestamp; spot is the last close.
    /// Once inputs are valid the cascade always produces a decision, with
    /// `NO_TRADE` as the fallback.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] for fewer than six bars, bars out of
    /// order, or a chain with nothing expiring on today's exchange date.
    #[tracing::instrument(skip_all, fields(contracts = chain.len(), bars = bars.len()))]
    pub fn decide(
        &self,
        chain: &[ContractQuote],
        bars: &[MinuteBar],
        now: Option<DateTime<Utc>>,
    ) -> Result<Decision, EngineError> {
        if bars.len() < MIN_BARS {
            return Err(EngineError::InsufficientBars {
                required: MIN_BARS,
                actual: bars.len(),
            });
        }
        ensure_ascending(bars)?;

        let last = bars[bars.len() - 1];
        let now = now.unwrap_or(last.timestamp);
        let spot = last.close;
        let today = exchange_date(now);

        let session = build_session_context(bars)?;
        let gamma_profile = build_gamma_profile(chain, spot, today)?;
        let pin_strike = gamma_profile.max_gamma_strike;
        let distance_to_pin_pct = gamma_profile.distance_to_pin_pct(spot);

        let near = |level: f64| (pin_strike - level).abs() / level * 100.0 < self.config.vwap_alignment_pct;
        let (gamma_near_vwap, gamma_near_high) = session
            .levels
            .as_ref()
            .map_or((false, false), |l| (near(l.vwap), near(l.high)));

        let hedge_pressure = estimate_hedge_pressure(chain, bars, Some(&session))?;
        let hours_to_close = hours_to_close(now);

        let recent = &bars[bars.len().saturating_sub(PIN_RANGE_BARS)..];
        let recent_high = recent.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
        let recent_low = recent.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);

        let signals = Signals {
            spot,
            pin_strike,
            distance_to_pin_pct,
            minutes_to_close: hours_to_close * 60.0,
            recent_range_pct: (recent_high - recent_low) / spot * 100.0,
            adjusted_pressure: hedge_pressure.adjusted_pressure,
            direction: hedge_pressure.direction,
            consistent: hedge_pressure.consistent,
            trend_aligned: hedge_pressure.trend_aligned,
            gamma_near_vwap,
            regime: gamma_profile.regime(spot),
            session: session.levels.as_ref().map(|l| SessionSignals {
                trend: l.trend,
                position: l.position,
                vwap_position: l.vwap_position,
            }),
        };
        let verdict = self.cascade(&signals);

        record_decision(verdict.action, verdict.confidence);
        tracing::info!(
            action = %verdict.action,
            confidence = %verdict.confidence,
            spot,
            pin_strike,
            distance_to_pin_pct,
            adjusted_pressure = hedge_pressure.adjusted_pressure,
            direction = %hedge_pressure.direction,
            hours_to_close,
            reason = %verdict.reason,
            "Decision made"
        );

        Ok(Decision {
            action: verdict.action,
            confidence: verdict.confidence,
            reason: verdict.reason,
            details: DecisionDetails {
                gamma_profile,
                hedge_pressure,
                session,
                distance_to_pin_pct,
                regime: verdict.regime,
                hours_to_close,
                gamma_near_vwap,
                gamma_near_high,
                pinned: verdict.pinned,
            },
        })
    }

    fn cascade(&self, s: &Signals) -> Verdict {
        let cfg = &self.config;

        if s.minutes_to_close <= f64::from(cfg.close_avoid_minutes) {
            return Verdict::new(
                Action::NoTrade,
                Confidence::High,
                format!("Final {} minutes: avoid EOD chaos", cfg.close_avoid_minutes),
            );
        }

        let Some(session) = s.session else {
            return Verdict::new(
                Action::NoTrade,
                Confidence::Low,
                "Insufficient session data (market just opened)",
            );
        };

        let regime = s.regime;
        let p = s.adjusted_pressure;

        if s.direction == Direction::Flat {
            return Verdict::new(
                Action::NoTrade,
                Confidence::Low,
                "Choppy price action - no consistent direction",
            )
            .with_regime(regime);
        }
        if !s.consistent {
            return Verdict::new(
                Action::NoTrade,
                Confidence::Low,
                "Price moves inconsistent - wait for clearer signal",
            )
            .with_regime(regime);
        }

        if s.distance_to_pin_pct <= cfg.pin_defense_distance_pct && s.recent_range_pct < cfg.pin_range_pct {
            if session.position.is_extreme() && p >= cfg.breakout_pressure {
                return Verdict::new(
                    action_for(s.direction),
                    Confidence::High,
                    format!(
                        "PIN BREAKOUT SETUP: Strong {} pressure {p:.2}× at ${:.2} pin + session {}",
                        s.direction,
                        s.pin_strike,
                        session.position.describe()
                    ),
                )
                .with_regime(regime)
                .pinned();
            }
            return Verdict::new(
                Action::NoTrade,
                Confidence::High,
                format!(
                    "PIN DEFENSE: Pinned at ${:.2} gamma wall + {}, range-bound expected",
                    s.pin_strike,
                    session.position.describe()
                ),
            )
            .with_regime(regime)
            .pinned();
        }

        if p >= cfg.min_pressure && s.trend_aligned {
            let mut confidence = if p >= cfg.high_confidence_pressure {
                Confidence::High
            } else {
                Confidence::Medium
            };
            let (side, supporting_vwap, wall_note, room_note) = match s.direction {
                Direction::Bearish => (
                    "SELL",
                    VwapPosition::BelowVwap,
                    " (VWAP resistance + gamma wall)",
                    " (mid-range, room to fall)",
                ),
                _ => (
                    "BUY",
                    VwapPosition::AboveVwap,
                    " (VWAP support + gamma wall)",
                    " (mid-range, room to run)",
                ),
            };
            let extra = if s.gamma_near_vwap && session.vwap_position == supporting_vwap {
                confidence = Confidence::High;
                wall_note
            } else if session.position == RangePosition::MidRange {
                room_note
            } else {
                ""
            };
            return Verdict::new(
                action_for(s.direction),
                confidence,
                format!(
                    "Dealer {side} pressure {p:.2}× aligned with {} day{extra}",
                    session.trend
                ),
            )
            .with_regime(regime);
        }

        if p >= cfg.reversal_pressure && !s.trend_aligned {
            match (s.direction, session.position) {
                (Direction::Bearish, RangePosition::NearHigh) => {
                    return Verdict::new(
                        Action::Put,
                        Confidence::Medium,
                        format!(
                            "Counter-trend SELL pressure {p:.2}× at session high - potential reversal"
                        ),
                    )
                    .with_regime(regime);
                }
                (Direction::Bullish, RangePosition::NearLow) => {
                    return Verdict::new(
                        Action::Call,
                        Confidence::Medium,
                        format!(
                            "Counter-trend BUY pressure {p:.2}× at session low - potential reversal"
                        ),
                    )
                    .with_regime(regime);
                }
                _ => {}
            }
        }

        if (cfg.pin_defense_distance_pct..=cfg.pin_magnet_max_distance_pct).contains(&s.distance_to_pin_pct)
            && p >= cfg.pin_magnet_pressure
        {
            let toward_pin = if s.pin_strike > s.spot {
                Direction::Bullish
            } else {
                Direction::Bearish
            };
            if toward_pin == s.direction {
                return Verdict::new(
                    action_for(s.direction),
                    Confidence::Medium,
                    format!(
                        "Pressure {p:.2}× pushing toward gamma pin @ ${:.2}",
                        s.pin_strike
                    ),
                )
                .with_regime(regime);
            }
        }

        // Inconsistent moves never get here: the direction check above returns first.
        let reason = if s.trend_aligned && p >= cfg.pin_magnet_pressure {
            format!(
                "Pressure {p:.2}× aligned with {} trend but below {:.1}× threshold",
                session.trend, cfg.min_pressure
            )
        } else if !s.trend_aligned {
            format!(
                "Pressure {p:.2}× counter to {} trend - waiting for alignment",
                session.trend
            )
        } else {
            format!("Pressure {p:.2}× too weak (need >{:.1}×)", cfg.min_pressure)
        };
        Verdict::new(Action::NoTrade, Confidence::Low, reason).with_regime(regime)
    }
}
