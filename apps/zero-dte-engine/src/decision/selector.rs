//! ATM contract selection and position sizing.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::market::{ContractQuote, OptionKind};

/// A chosen contract with a suggested size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSelection {
    /// The chosen quote.
    pub quote: ContractQuote,
    /// Mid used for ranking; derived from bid/ask when no row carries a mid.
    pub mid: Option<f64>,
    /// Per-share price used for sizing: the mid, else last, else 0. May be
    /// non-finite when the vendor quoted a NaN mid.
    pub price: f64,
    /// Suggested number of contracts, at least 1.
    pub quantity: u32,
    /// `price × contract_size × quantity`.
    pub estimated_cost: Decimal,
}

/// Picks the at-the-money contract of today's expiry.
#[derive(Debug, Clone)]
pub struct ContractSelector {
    config: SelectionConfig,
}

impl ContractSelector {
    /// Create a selector.
    #[must_use]
    pub const fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Selection settings.
    #[must_use]
    pub const fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Pick the contract of `kind` expiring on `today` whose strike is closest
    /// to `spot`, ties broken by the smaller mid.
    ///
    /// Returns `None` when no contract matches.
    #[must_use]
    pub fn pick_atm(
        &self,
        spot: f64,
        chain: &[ContractQuote],
        kind: OptionKind,
        today: NaiveDate,
    ) -> Option<ContractSelection> {
        let candidates: Vec<&ContractQuote> = chain
            .iter()
            .filter(|c| c.expires_on(today) && c.option_type == kind)
            .collect();
        if candidates.is_empty() {
            tracing::debug!(%kind, %today, "No contracts to select from");
            return None;
        }

        let derive_mid = candidates.iter().all(|c| c.mid.is_none());
        let (quote, mid) = candidates
            .into_iter()
            .map(|c| {
                let mid = if derive_mid {
                    match (c.bid, c.ask) {
                        (Some(bid), Some(ask)) => Some(f64::midpoint(bid, ask)),
                        _ => None,
                    }
                } else {
                    c.mid
                };
                (c, mid)
            })
            .min_by(|(a, a_mid), (b, b_mid)| {
                (a.strike - spot)
                    .abs()
                    .total_cmp(&(b.strike - spot).abs())
                    .then_with(|| cmp_mid(*a_mid, *b_mid))
            })?;

        // Only an absent or zero mid falls back to last; a NaN mid is kept and sizes to one.
        let price = mid
            .filter(|m| *m != 0.0)
            .or_else(|| quote.last.filter(|l| *l != 0.0))
            .unwrap_or(0.0);
        let (quantity, estimated_cost) = self.size(price);

        tracing::debug!(
            symbol = %quote.symbol,
            strike = quote.strike,
            spot,
            price,
            quantity,
            "Selected ATM contract"
        );

        Some(ContractSelection {
            quote: quote.clone(),
            mid,
            price,
            quantity,
            estimated_cost,
        })
    }

    /// Quantity that fits the budget, and its cost.
    fn size(&self, price: f64) -> (u32, Decimal) {
        let contract_size = Decimal::from(self.config.contract_size);
        let per_contract = match Decimal::try_from(price) {
            Ok(p) if price.is_finite() && price > 0.0 => p * contract_size,
            _ => return (1, Decimal::ZERO),
        };
        let quantity = self
            .config
            .budget
            .checked_div(per_contract)
            .and_then(|q| q.floor().to_u32())
            .unwrap_or(0)
            .max(1);
        (quantity, (per_contract * Decimal::from(quantity)).round_dp(2))
    }
}

/// Missing or NaN mids sort last.
fn cmp_mid(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|m| !m.is_nan());
    let b = b.filter(|m| !m.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
