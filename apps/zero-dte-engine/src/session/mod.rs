//! Trading session context: open, range, VWAP, gap and trend labels.

mod context;

pub use context::{
    Direction, GAP_THRESHOLD_PCT, GapType, MIN_SESSION_BARS, RangePosition, SessionContext,
    SessionLevels, SessionPhase, TREND_THRESHOLD_PCT, VwapPosition, build_session_context,
};
