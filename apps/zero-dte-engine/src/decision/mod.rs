//! Trade decisions and contract selection.
//!
//! [`DecisionEngine`] combines the gamma profile, session context and hedge
//! pressure into a [`Decision`]; [`ContractSelector`] then turns a `CALL` or
//! `PUT` into a concrete ATM contract and size.

mod engine;
mod selector;
mod types;

pub use engine::DecisionEngine;
pub use selector::{ContractSelection, ContractSelector};
pub use types::{Action, Confidence, Decision, DecisionDetails};
