//! Market data records consumed by the engine.
//!
//! - [`ContractQuote`]: one row of an option-chain snapshot
//! - [`MinuteBar`]: one row of the underlying's minute series
//! - [`calendar`]: exchange session math (America/New_York, 09:30–16:00)
//! - [`schema`]: conversion from loosely typed JSON rows

mod bars;
pub mod calendar;
mod contract;
pub mod schema;

pub use bars::{MinuteBar, ensure_ascending};
pub(crate) use bars::{mean, median};
pub use contract::{ContractQuote, DEFAULT_MULTIPLIER, OptionKind, valid_mid};
pub use schema::{bars_from_json_rows, chain_from_json_rows};
