//! Black-Scholes and IV solver properties.

use proptest::prelude::*;
use test_case::test_case;
use zero_dte_engine::market::OptionKind;
use zero_dte_engine::pricing::black_scholes::discounted_intrinsic;
use zero_dte_engine::pricing::{IvSolver, IvStatus, greeks, price, price_and_greeks};

fn kind() -> impl Strategy<Value = OptionKind> {
    prop_oneof![Just(OptionKind::Call), Just(OptionKind::Put)]
}

proptest! {
    /// Pricing at sigma and solving back recovers sigma.
    ///
    /// Strikes sit within one standard deviation of spot so the option always
    /// carries measurable time value.
    #[test]
    fn iv_round_trip(
        s in 50.0..600.0_f64,
        moneyness in -1.0..1.0_f64,
        r in 0.0..0.05_f64,
        q in 0.0..0.02_f64,
        sigma in 0.05..3.0_f64,
        t in 0.05..2.0_f64,
        kind in kind(),
    ) {
        let k = s * (-moneyness * sigma * t.sqrt()).exp();
        let target = price(s, k, r, q, sigma, t, kind);
        let solution = IvSolver::default().solve(target, s, k, r, q, t, kind);

        prop_assert_eq!(solution.status, IvStatus::Ok);
        prop_assert!(
            (solution.sigma - sigma).abs() < 1e-4,
            "sigma {} solved as {}", sigma, solution.sigma
        );
    }

    /// Expired or zero-vol options are worth discounted intrinsic and carry
    /// no Greeks.
    #[test]
    fn degenerate_inputs_price_at_intrinsic(
        s in 1.0..1000.0_f64,
        k in 1.0..1000.0_f64,
        r in 0.0..0.1_f64,
        q in 0.0..0.05_f64,
        live in 0.01..2.0_f64,
        expired in any::<bool>(),
        kind in kind(),
    ) {
        let (sigma, t) = if expired { (live, 0.0) } else { (0.0, live) };

        let priced = price_and_greeks(s, k, r, q, sigma, t, kind, 100.0);
        prop_assert_eq!(priced.price, discounted_intrinsic(s, k, r, q, t, kind));
        prop_assert!(priced.greeks.is_zero());
        prop_assert!(greeks(s, k, r, q, sigma, t, kind, 1.0).is_zero());
    }

    /// Gamma is identical for calls and puts, and non-negative.
    #[test]
    fn gamma_is_kind_independent(
        s in 50.0..600.0_f64,
        k in 50.0..600.0_f64,
        sigma in 0.05..1.5_f64,
        t in 0.001..1.0_f64,
    ) {
        let call = greeks(s, k, 0.02, 0.0, sigma, t, OptionKind::Call, 1.0);
        let put = greeks(s, k, 0.02, 0.0, sigma, t, OptionKind::Put, 1.0);
        prop_assert!(call.gamma >= 0.0);
        prop_assert!((call.gamma - put.gamma).abs() < 1e-12);
        prop_assert!((call.vega - put.vega).abs() < 1e-9);
    }
}

#[test_case(OptionKind::Call, 500.0, 0.12 ; "zero dte atm call")]
#[test_case(OptionKind::Put, 495.0, 0.18 ; "zero dte otm put")]
#[test_case(OptionKind::Call, 510.0, 0.35 ; "zero dte otm call")]
fn test_same_day_expiry_round_trip(kind: OptionKind, strike: f64, sigma: f64) {
    // Two hours to the close.
    let t = 2.0 / (365.0 * 24.0);
    let target = price(500.0, strike, 0.02, 0.0, sigma, t, kind);
    let solution = IvSolver::default().solve(target, 500.0, strike, 0.02, 0.0, t, kind);
    assert!(solution.is_ok());
    assert!((solution.sigma - sigma).abs() < 1e-4);
}
