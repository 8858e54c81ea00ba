//! Decision output types.

use serde::{Deserialize, Serialize};

use crate::gamma::{GammaProfile, GammaRegime};
use crate::pressure::HedgePressure;
use crate::session::SessionContext;

/// Recommended action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Buy an ATM call.
    Call,
    /// Buy an ATM put.
    Put,
    /// Stay flat.
    NoTrade,
}

impl Action {
    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
            Self::NoTrade => "NO_TRADE",
        }
    }

    /// Whether the action opens a position.
    #[must_use]
    pub const fn is_trade(self) -> bool {
        !matches!(self, Self::NoTrade)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    /// Weak or missing signal.
    Low,
    /// Signal present but not confirmed.
    Medium,
    /// Strong or confirmed signal.
    High,
    /// Reserved for callers that grade beyond the cascade.
    VeryHigh,
}

impl Confidence {
    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything computed on the way to a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDetails {
    /// Gamma profile of today's expiry.
    pub gamma_profile: GammaProfile,
    /// Hedge pressure with session adjustments.
    pub hedge_pressure: HedgePressure,
    /// Session context.
    pub session: SessionContext,
    /// Distance from spot to the pin, percent.
    pub distance_to_pin_pct: f64,
    /// Gamma regime at spot; `None` for the early exits.
    pub regime: Option<GammaRegime>,
    /// Hours until 16:00 ET.
    pub hours_to_close: f64,
    /// Pin strike within 0.5% of VWAP.
    pub gamma_near_vwap: bool,
    /// Pin strike within 0.5% of the session high.
    pub gamma_near_high: bool,
    /// The pin-defense rule fired.
    pub pinned: bool,
}

/// Result of one decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Recommended action.
    pub action: Action,
    /// Confidence.
    pub confidence: Confidence,
    /// Human-readable reason.
    pub reason: String,
    /// Supporting numbers.
    pub details: DecisionDetails,
}

impl Decision {
    /// Whether this decision opens a position.
    #[must_use]
    pub const fn is_trade(&self) -> bool {
        self.action.is_trade()
    }
}
