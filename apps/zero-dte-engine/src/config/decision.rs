//! Decision cascade thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds for the decision cascade.
///
/// Pressures are multiples of the session dollar-volume baseline; distances
/// and ranges are percentages of spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Minimum adjusted pressure for a trend-aligned trade.
    pub min_pressure: f64,
    /// Accepted for compatibility; no rule reads it.
    pub min_distance_for_momentum_pct: f64,
    /// No trades within this many minutes of the close.
    pub close_avoid_minutes: u32,
    /// Spot within this distance of the pin counts as at the pin.
    pub pin_defense_distance_pct: f64,
    /// Trailing 10-bar range below which price is stuck at the pin.
    pub pin_range_pct: f64,
    /// Pressure needed to break out of a pin at a session extreme.
    pub breakout_pressure: f64,
    /// Pressure at which a trend-aligned trade is high confidence.
    pub high_confidence_pressure: f64,
    /// Pressure needed for a counter-trend reversal.
    pub reversal_pressure: f64,
    /// Upper distance bound for pin magnetism.
    pub pin_magnet_max_distance_pct: f64,
    /// Pressure needed for pin magnetism.
    pub pin_magnet_pressure: f64,
    /// Pin within this distance of VWAP or the session high counts as a wall.
    pub vwap_alignment_pct: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_pressure: 2.5,
            min_distance_for_momentum_pct: 1.0,
            close_avoid_minutes: 15,
            pin_defense_distance_pct: 0.3,
            pin_range_pct: 0.3,
            breakout_pressure: 3.5,
            high_confidence_pressure: 3.5,
            reversal_pressure: 3.0,
            pin_magnet_max_distance_pct: 2.0,
            pin_magnet_pressure: 2.0,
            vwap_alignment_pct: 0.5,
        }
    }
}

impl DecisionConfig {
    /// Threshold fields by name, for validation.
    pub(crate) const fn thresholds(&self) -> [(&'static str, f64); 10] {
        [
            ("min_pressure", self.min_pressure),
            (
                "min_distance_for_momentum_pct",
                self.min_distance_for_momentum_pct,
            ),
            ("pin_defense_distance_pct", self.pin_defense_distance_pct),
            ("pin_range_pct", self.pin_range_pct),
            ("breakout_pressure", self.breakout_pressure),
            ("high_confidence_pressure", self.high_confidence_pressure),
            ("reversal_pressure", self.reversal_pressure),
            (
                "pin_magnet_max_distance_pct",
                self.pin_magnet_max_distance_pct,
            ),
            ("pin_magnet_pressure", self.pin_magnet_pressure),
            ("vwap_alignment_pct", self.vwap_alignment_pct),
        ]
    }
}
