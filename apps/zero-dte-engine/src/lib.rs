// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! 0-DTE Engine - Rust Core Library
//!
//! Synchronous quantitative core for same-day-expiry index options. Each
//! decision cycle is a pure function of an option-chain snapshot, a series
//! of one-minute bars and an optional "now".
//!
//! # Pipeline
//!
//! ```text
//! chain + bars ──► gamma profile ──┐
//!              └─► session context ┼─► hedge pressure ──► decision ──► contract
//!                                  └──────────────────────┘
//! ```
//!
//! - **market**: typed inputs, exchange calendar, JSON row boundary
//! - **pricing**: Black-Scholes kernel, Brent IV solver, chain enrichment
//! - **gamma**: per-strike dealer exposure, pin and zero-gamma strikes
//! - **session**: open, range, VWAP, gap and trend labels
//! - **pressure**: dealer hedge flow relative to session dollar volume
//! - **decision**: rule cascade and ATM contract selection
//!
//! Ambient concerns live in **config** (YAML with `${VAR}` interpolation),
//! **observability** (`tracing` setup and `metrics` recording) and **error**.
//!
//! # Example
//!
//! ```rust,ignore
//! use zero_dte_engine::{DecisionEngine, EngineConfig};
//!
//! let config = EngineConfig::default();
//! let engine = DecisionEngine::new(config.decision);
//! let decision = engine.decide(&chain, &bars, None)?;
//! println!("{} {}: {}", decision.action, decision.confidence, decision.reason);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod decision;
pub mod gamma;
pub mod market;
pub mod pressure;
pub mod pricing;
pub mod session;

// =============================================================================
// Ambient Modules
// =============================================================================

pub mod config;
pub mod error;
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{EngineConfig, load_config, load_config_from_string};
pub use decision::{
    Action, Confidence, ContractSelection, ContractSelector, Decision, DecisionDetails,
    DecisionEngine,
};
pub use error::{EngineError, ErrorCode};
pub use gamma::{GammaProfile, GammaRegime, build_gamma_profile};
pub use market::{ContractQuote, MinuteBar, OptionKind};
pub use pressure::{HedgePressure, estimate_hedge_pressure};
pub use session::{SessionContext, build_session_context};
