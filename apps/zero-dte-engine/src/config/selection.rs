//! Contract selection and sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position sizing for the ATM selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Budget per trade.
    #[serde(default = "default_budget")]
    pub budget: Decimal,
    /// Shares per contract used for sizing.
    #[serde(default = "default_contract_size")]
    pub contract_size: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            contract_size: default_contract_size(),
        }
    }
}

fn default_budget() -> Decimal {
    Decimal::new(150, 0)
}

const fn default_contract_size() -> u32 {
    100
}
