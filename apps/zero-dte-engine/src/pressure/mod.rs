//! Hedge pressure: how much dealer re-hedging a recent move implies,
//! relative to typical session dollar volume.

mod hedge;

pub use hedge::{
    CONSISTENT_MOVES, HedgePressure, LOOKBACK_MINUTES, MIN_BARS, ROBUST_BASELINE_BARS,
    estimate_hedge_pressure,
};
