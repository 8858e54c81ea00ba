//! Dealer gamma positioning.
//!
//! # Sign convention
//!
//! Open interest is read as customer-long positioning, and dealers are
//! implicitly on the other side. No further sign flip is applied: each
//! contract contributes `+OI × gamma × (spot × 1%) × multiplier`. The hedge
//! pressure estimator uses the same convention so pin, zero-gamma and
//! pressure direction stay consistent with each other.
//!
//! Because per-contract gamma is non-negative for both calls and puts, a
//! ladder built from vendor gammas is usually one-signed and
//! [`GammaProfile::zero_gamma_strike`] is then `None`.

mod profile;

pub use profile::{
    GammaDiagnostics, GammaProfile, GammaRegime, StrikeExposure, TOP_STRIKES,
    build_gamma_profile, signed_exposure_1pct, zero_gamma_crossing,
};
