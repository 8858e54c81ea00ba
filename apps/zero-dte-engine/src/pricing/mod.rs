//! Options pricing.
//!
//! This module provides:
//! - Black-Scholes-Merton price and Greeks ([`price_and_greeks`])
//! - Implied volatility by Brent's method ([`IvSolver`])
//! - Snapshot-wide IV/Greeks enrichment ([`ChainEnricher`])
//!
//! # Example
//!
//! ```
//! use zero_dte_engine::market::OptionKind;
//! use zero_dte_engine::pricing::{IvSolver, IvStatus, price_and_greeks};
//!
//! let priced = price_and_greeks(100.0, 100.0, 0.02, 0.0, 0.25, 0.5, OptionKind::Call, 100.0);
//! let solution = IvSolver::default().solve(priced.price, 100.0, 100.0, 0.02, 0.0, 0.5, OptionKind::Call);
//! assert_eq!(solution.status, IvStatus::Ok);
//! assert!((solution.sigma - 0.25).abs() < 1e-4);
//! ```

pub mod black_scholes;
mod chain;
mod iv;

pub use black_scholes::{Greeks, PricedOption, greeks, price, price_and_greeks};
pub use chain::{ChainEnricher, EnrichedChain, EnrichmentStats, price_for_iv, time_to_expiry};
pub use iv::{IvSolution, IvSolver, IvSolverConfig, IvStatus};
