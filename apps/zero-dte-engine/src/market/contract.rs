//! Option contract quotes as delivered in a chain snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default contract multiplier (shares per contract).
pub const DEFAULT_MULTIPLIER: f64 = 100.0;

/// Option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionKind {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionKind {
    /// Parse a vendor flag such as `C`, `P`, `call` or `PUT`.
    ///
    /// Only the first character is significant, matching how chain vendors
    /// abbreviate contract types.
    #[must_use]
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag.trim().chars().next()?.to_ascii_uppercase() {
            'C' => Some(Self::Call),
            'P' => Some(Self::Put),
            _ => None,
        }
    }

    /// Returns true for calls.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call)
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// One option contract in a chain snapshot.
///
/// Produced fresh by the data collaborators every cycle and never mutated by
/// the engine. Optional market fields default to neutral values where the
/// engine consumes them (missing gamma is zero, missing open interest is zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractQuote {
    /// Contract symbol (OCC ticker).
    #[serde(default)]
    pub symbol: String,
    /// Underlying ticker.
    #[serde(default)]
    pub underlying: String,
    /// Strike price.
    pub strike: f64,
    /// Expiration date (exchange calendar).
    pub expiration: NaiveDate,
    /// Call or put.
    pub option_type: OptionKind,
    /// Best bid.
    #[serde(default)]
    pub bid: Option<f64>,
    /// Best ask.
    #[serde(default)]
    pub ask: Option<f64>,
    /// Last trade price.
    #[serde(default)]
    pub last: Option<f64>,
    /// Vendor-supplied mid price.
    #[serde(default)]
    pub mid: Option<f64>,
    /// Open interest in contracts.
    #[serde(default)]
    pub open_interest: f64,
    /// Shares per contract.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Delta per share.
    #[serde(default)]
    pub delta: Option<f64>,
    /// Gamma per share.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Theta per share per day.
    #[serde(default)]
    pub theta: Option<f64>,
    /// Vega per share.
    #[serde(default)]
    pub vega: Option<f64>,
    /// Implied volatility (annualised, decimal).
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    /// Underlying price at snapshot time.
    #[serde(default)]
    pub underlying_price: Option<f64>,
}

const fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}

impl ContractQuote {
    /// Create a contract with no market data attached.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        strike: f64,
        expiration: NaiveDate,
        option_type: OptionKind,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: String::new(),
            strike,
            expiration,
            option_type,
            bid: None,
            ask: None,
            last: None,
            mid: None,
            open_interest: 0.0,
            multiplier: DEFAULT_MULTIPLIER,
            delta: None,
            gamma: None,
            theta: None,
            vega: None,
            implied_volatility: None,
            underlying_price: None,
        }
    }

    /// Set the underlying ticker.
    #[must_use]
    pub fn with_underlying(mut self, underlying: impl Into<String>) -> Self {
        self.underlying = underlying.into();
        self
    }

    /// Set gamma.
    #[must_use]
    pub const fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Set open interest.
    #[must_use]
    pub const fn with_open_interest(mut self, open_interest: f64) -> Self {
        self.open_interest = open_interest;
        self
    }

    /// Set bid and ask.
    #[must_use]
    pub const fn with_quote(mut self, bid: f64, ask: f64) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// Set the vendor mid.
    #[must_use]
    pub const fn with_mid(mut self, mid: f64) -> Self {
        self.mid = Some(mid);
        self
    }

    /// Set the last trade price.
    #[must_use]
    pub const fn with_last(mut self, last: f64) -> Self {
        self.last = Some(last);
        self
    }

    /// Set the multiplier.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Gamma, treating a missing or non-finite value as zero.
    #[must_use]
    pub fn gamma_or_zero(&self) -> f64 {
        self.gamma.filter(|g| g.is_finite()).unwrap_or(0.0)
    }

    /// Open interest, treating non-finite values as zero.
    #[must_use]
    pub fn open_interest_or_zero(&self) -> f64 {
        if self.open_interest.is_finite() {
            self.open_interest
        } else {
            0.0
        }
    }

    /// Multiplier, falling back to 100 for non-finite values.
    #[must_use]
    pub fn multiplier_or_default(&self) -> f64 {
        if self.multiplier.is_finite() {
            self.multiplier
        } else {
            DEFAULT_MULTIPLIER
        }
    }

    /// Whether the contract expires on `date`.
    #[must_use]
    pub fn expires_on(&self, date: NaiveDate) -> bool {
        self.expiration == date
    }
}

/// Quote quality check used before trusting a mid for IV solving.
///
/// A mid is usable when both sides are positive, the market is not crossed,
/// and the spread is at most half the mid.
#[must_use]
pub fn valid_mid(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    let (bid, ask) = (bid?, ask?);
    if !bid.is_finite() || !ask.is_finite() || bid <= 0.0 || ask <= 0.0 || ask < bid {
        return None;
    }
    let mid = 0.5 * (bid + ask);
    if mid <= 0.0 || (ask - bid) / mid > 0.5 {
        return None;
    }
    Some(mid)
}
