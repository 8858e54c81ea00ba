//! Session context from minute bars.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::market::calendar::{exchange_date, is_before_session, is_regular_session};
use crate::market::{MinuteBar, ensure_ascending};

/// Session bars needed before the full context is computed.
pub const MIN_SESSION_BARS: usize = 10;

/// Percent move beyond which a trend is directional (strict).
pub const TREND_THRESHOLD_PCT: f64 = 0.3;

/// Percent gap beyond which the open counts as a gap (strict).
pub const GAP_THRESHOLD_PCT: f64 = 0.2;

// ============================================================================
// Labels
// ============================================================================

/// Directional label shared by session trend and hedge pressure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Up.
    Bullish,
    /// Down.
    Bearish,
    /// Neither.
    #[default]
    Flat,
}

impl Direction {
    /// Classify a percentage move against the ±0.3% trend band.
    #[must_use]
    pub fn from_move_pct(pct: f64) -> Self {
        if pct > TREND_THRESHOLD_PCT {
            Self::Bullish
        } else if pct < -TREND_THRESHOLD_PCT {
            Self::Bearish
        } else {
            Self::Flat
        }
    }

    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Flat => "FLAT",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening gap classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapType {
    /// Opened more than 0.2% above the prior close.
    GapUp,
    /// Opened more than 0.2% below the prior close.
    GapDown,
    /// Opened within 0.2% of the prior close.
    NoGap,
    /// No prior close available.
    Unknown,
}

/// Where the current price sits in the session range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangePosition {
    /// Top quarter of the range.
    NearHigh,
    /// Bottom quarter of the range.
    NearLow,
    /// In between.
    MidRange,
}

impl RangePosition {
    /// Classify a position-in-range fraction.
    #[must_use]
    pub fn from_fraction(position_in_range: f64) -> Self {
        if position_in_range > 0.75 {
            Self::NearHigh
        } else if position_in_range < 0.25 {
            Self::NearLow
        } else {
            Self::MidRange
        }
    }

    /// Whether the price is at a session extreme.
    #[must_use]
    pub const fn is_extreme(self) -> bool {
        matches!(self, Self::NearHigh | Self::NearLow)
    }

    /// Lower-case phrase for messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::NearHigh => "near high",
            Self::NearLow => "near low",
            Self::MidRange => "mid range",
        }
    }
}

/// Current price relative to VWAP (±0.2% band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VwapPosition {
    /// More than 0.2% above VWAP.
    AboveVwap,
    /// More than 0.2% below VWAP.
    BelowVwap,
    /// Within the band.
    AtVwap,
}

impl VwapPosition {
    /// Classify `current` against `vwap`.
    #[must_use]
    pub fn classify(current: f64, vwap: f64) -> Self {
        if current > vwap * 1.002 {
            Self::AboveVwap
        } else if current < vwap * 0.998 {
            Self::BelowVwap
        } else {
            Self::AtVwap
        }
    }
}

/// Phase of the trading day by hours elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// First hour.
    EarlySession,
    /// Up to 3.5 hours.
    Midday,
    /// Up to 6 hours.
    LateSession,
    /// Final half hour.
    Closing,
}

impl SessionPhase {
    /// Classify hours into the session.
    #[must_use]
    pub fn from_hours(hours: f64) -> Self {
        if hours < 1.0 {
            Self::EarlySession
        } else if hours < 3.5 {
            Self::Midday
        } else if hours < 6.0 {
            Self::LateSession
        } else {
            Self::Closing
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Full session metrics, present once enough session bars exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLevels {
    /// Highest session close.
    pub high: f64,
    /// Lowest session close.
    pub low: f64,
    /// Volume-weighted average price (open when volume is zero).
    pub vwap: f64,
    /// Open minus prior close (0 without a prior close).
    pub gap_size: f64,
    /// Gap classification.
    pub gap_type: GapType,
    /// Whether price has traded back through the prior close.
    pub gap_filled: bool,
    /// Share of the gap retraced, in `[0, 100]`.
    pub gap_fill_pct: f64,
    /// High minus low.
    pub range_size: f64,
    /// Range as a percentage of the open.
    pub range_pct: f64,
    /// `(current - low) / (high - low)`, 0.5 for a flat range.
    pub position_in_range: f64,
    /// Percent move from the open.
    pub dist_from_open_pct: f64,
    /// Percent move from the prior close (from the open when absent).
    pub dist_from_prev_close_pct: f64,
    /// Percent distance from VWAP.
    pub dist_from_vwap_pct: f64,
    /// High minus current.
    pub dist_from_high: f64,
    /// Current minus low.
    pub dist_from_low: f64,
    /// Total trend, measured from the prior close.
    pub trend: Direction,
    /// Intraday trend, measured from the open.
    pub intraday_trend: Direction,
    /// Range position label.
    pub position: RangePosition,
    /// VWAP relationship.
    pub vwap_position: VwapPosition,
    /// Hours into the session.
    pub hours_into_session: f64,
    /// Session phase.
    pub session_phase: SessionPhase,
}

/// Session context for the latest bar's trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Close of the last bar before the session open.
    pub prev_close: Option<f64>,
    /// First session close.
    pub open: Option<f64>,
    /// Last session close.
    pub current: Option<f64>,
    /// Opening gap versus the prior close, percent.
    pub gap_pct: f64,
    /// Number of session bars.
    pub minutes_into_session: usize,
    /// Fewer than [`MIN_SESSION_BARS`] session bars.
    pub insufficient_data: bool,
    /// Full metrics; `None` when data is insufficient.
    pub levels: Option<SessionLevels>,
}

impl SessionContext {
    /// Session trend; `Flat` when data is insufficient.
    #[must_use]
    pub fn trend(&self) -> Direction {
        self.levels.as_ref().map_or(Direction::Flat, |l| l.trend)
    }

    /// Range position; `None` when data is insufficient.
    #[must_use]
    pub fn position(&self) -> Option<RangePosition> {
        self.levels.as_ref().map(|l| l.position)
    }
}

fn compute_gap_pct(open: Option<f64>, prev_close: Option<f64>) -> f64 {
    match (open, prev_close) {
        (Some(open), Some(prev)) if prev != 0.0 => (open - prev) / prev * 100.0,
        _ => 0.0,
    }
}

/// Build the session context.
///
/// Today is the exchange-local date of the last bar; session bars are the
/// bars of today within 09:30 ≤ t < 16:00.
///
/// # Errors
///
/// Returns [`EngineError::EmptySession`] for no bars and
/// [`EngineError::UnorderedBars`] when bars are not strictly ascending.
pub fn build_session_context(bars: &[MinuteBar]) -> Result<SessionContext, EngineError> {
    let last = bars.last().ok_or(EngineError::EmptySession)?;
    ensure_ascending(bars)?;
    let today = exchange_date(last.timestamp);

    let session: Vec<&MinuteBar> = bars
        .iter()
        .filter(|bar| is_regular_session(bar.timestamp, today))
        .collect();
    let prev_close = bars
        .iter()
        .rev()
        .find(|bar| is_before_session(bar.timestamp, today))
        .map(|bar| bar.close);

    let open = session.first().map(|bar| bar.close);
    let current = session.last().map(|bar| bar.close);
    let gap_pct = compute_gap_pct(open, prev_close);
    let minutes_into_session = session.len();

    let (Some(open), Some(current)) = (open, current) else {
        return Ok(insufficient(prev_close, None, None, gap_pct, minutes_into_session));
    };
    if minutes_into_session < MIN_SESSION_BARS {
        return Ok(insufficient(
            prev_close,
            Some(open),
            Some(current),
            gap_pct,
            minutes_into_session,
        ));
    }

    let closes: Vec<f64> = session.iter().map(|bar| bar.close).collect();
    let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = closes.iter().copied().fold(f64::INFINITY, f64::min);

    let gap_size = prev_close.map_or(0.0, |prev| open - prev);
    let (gap_type, gap_filled, gap_fill_pct) = match prev_close {
        None => (GapType::Unknown, false, 0.0),
        Some(prev) if gap_pct > GAP_THRESHOLD_PCT => {
            let fill = if gap_size > 0.0 {
                (open - current) / gap_size * 100.0
            } else {
                0.0
            };
            (GapType::GapUp, current <= prev, fill.clamp(0.0, 100.0))
        }
        Some(prev) if gap_pct < -GAP_THRESHOLD_PCT => {
            let fill = if gap_size == 0.0 {
                0.0
            } else {
                (current - open) / gap_size.abs() * 100.0
            };
            (GapType::GapDown, current >= prev, fill.clamp(0.0, 100.0))
        }
        Some(_) => (GapType::NoGap, false, 0.0),
    };

    let total_volume: u64 = session.iter().map(|bar| bar.volume).sum();
    let vwap = if total_volume > 0 {
        session.iter().map(|bar| bar.dollar_volume()).sum::<f64>() / total_volume as f64
    } else {
        open
    };

    let range_size = high - low;
    let position_in_range = if range_size > 0.0 {
        (current - low) / range_size
    } else {
        0.5
    };
    let dist_from_open_pct = (current - open) / open * 100.0;
    let dist_from_prev_close_pct = match prev_close {
        Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
        _ => dist_from_open_pct,
    };
    let hours_into_session = minutes_into_session as f64 / 60.0;

    let levels = SessionLevels {
        high,
        low,
        vwap,
        gap_size,
        gap_type,
        gap_filled,
        gap_fill_pct,
        range_size,
        range_pct: range_size / open * 100.0,
        position_in_range,
        dist_from_open_pct,
        dist_from_prev_close_pct,
        dist_from_vwap_pct: (current - vwap) / vwap * 100.0,
        dist_from_high: high - current,
        dist_from_low: current - low,
        trend: Direction::from_move_pct(dist_from_prev_close_pct),
        intraday_trend: Direction::from_move_pct(dist_from_open_pct),
        position: RangePosition::from_fraction(position_in_range),
        vwap_position: VwapPosition::classify(current, vwap),
        hours_into_session,
        session_phase: SessionPhase::from_hours(hours_into_session),
    };

    tracing::debug!(
        minutes = minutes_into_session,
        open,
        high,
        low,
        current,
        vwap,
        prev_close = ?prev_close,
        gap_pct,
        trend = %levels.trend,
        "Session context built"
    );

    Ok(SessionContext {
        prev_close,
        open: Some(open),
        current: Some(current),
        gap_pct,
        minutes_into_session,
        insufficient_data: false,
        levels: Some(levels),
    })
}

const fn insufficient(
    prev_close: Option<f64>,
    open: Option<f64>,
    current: Option<f64>,
    gap_pct: f64,
    minutes_into_session: usize,
) -> SessionContext {
    SessionContext {
        prev_close,
        open,
        current,
        gap_pct,
        minutes_into_session,
        insufficient_data: true,
        levels: None,
    }
}
