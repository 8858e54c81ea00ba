//! Decision cascade scenarios driven through the public entry point.

mod common;

use common::{
    at_minute, linear_closes, session_bars, single_strike_chain, skewed_ladder, today,
};
use zero_dte_engine::config::DecisionConfig;
use zero_dte_engine::market::OptionKind;
use zero_dte_engine::session::Direction;
use zero_dte_engine::{
    Action, Confidence, ContractSelector, DecisionEngine, EngineError, ErrorCode, GammaRegime,
};

fn engine() -> DecisionEngine {
    DecisionEngine::new(DecisionConfig::default())
}

/// 120 bars rising 0.02 from yesterday's 500 close: a +0.48% bullish day
/// with strong call-side hedge flow and the pin far below spot.
fn trending_up() -> (Vec<zero_dte_engine::ContractQuote>, Vec<zero_dte_engine::MinuteBar>) {
    let bars = session_bars(500.0, &linear_closes(500.0, 0.02, 120), 1_000);
    (single_strike_chain(480.0, 10_000.0, 0.05), bars)
}

#[test]
fn test_trend_aligned_pressure_buys_calls() {
    let (chain, bars) = trending_up();
    let decision = engine().decide(&chain, &bars, None).unwrap();

    assert_eq!(decision.action, Action::Call);
    assert_eq!(decision.confidence, Confidence::High);
    assert!(decision.reason.starts_with("Dealer BUY pressure"));
    assert!(decision.reason.ends_with("aligned with BULLISH day"));

    let details = &decision.details;
    assert!(details.hedge_pressure.trend_aligned);
    assert!(details.hedge_pressure.adjusted_pressure >= 3.5);
    assert_eq!(details.regime, Some(GammaRegime::LongGamma));
    assert_eq!(details.gamma_profile.max_gamma_strike, 480.0);
    assert!(!details.pinned);
    // 11:29 ET
    assert!((details.hours_to_close - (4.0 + 31.0 / 60.0)).abs() < 1e-9);
}

#[test]
fn test_end_of_day_cutoff_precedes_strong_pressure() {
    let (chain, bars) = trending_up();
    // 15:50 ET, same inputs that produce a HIGH confidence call above
    let now = at_minute(380);
    let decision = engine().decide(&chain, &bars, Some(now)).unwrap();

    assert_eq!(decision.action, Action::NoTrade);
    assert_eq!(decision.confidence, Confidence::High);
    assert_eq!(decision.reason, "Final 15 minutes: avoid EOD chaos");
    assert_eq!(decision.details.regime, None);
    assert!(decision.details.hedge_pressure.adjusted_pressure >= 3.5);
}

#[test]
fn test_pinned_price_defends_the_wall() {
    // Flat at 500 then a small drift up: stuck within 0.1% of the 500 pin.
    let mut closes = vec![500.0; 110];
    closes.extend(linear_closes(500.05, 0.05, 10));
    let bars = session_bars(500.0, &closes, 1_000);
    let chain = single_strike_chain(500.0, 800.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.action, Action::NoTrade);
    assert_eq!(decision.confidence, Confidence::High);
    assert!(decision.details.pinned);
    assert!(
        decision
            .reason
            .starts_with("PIN DEFENSE: Pinned at $500.00 gamma wall + near high")
    );
}

#[test]
fn test_strong_pressure_breaks_out_of_the_pin() {
    let mut closes = vec![500.0; 110];
    closes.extend(linear_closes(500.05, 0.05, 10));
    let bars = session_bars(500.0, &closes, 1_000);
    let chain = single_strike_chain(500.0, 8_000.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.action, Action::Call);
    assert_eq!(decision.confidence, Confidence::High);
    assert!(decision.details.pinned);
    assert!(decision.reason.starts_with("PIN BREAKOUT SETUP: Strong BULLISH"));
}

#[test]
fn test_counter_trend_selling_at_the_high_reverses() {
    let mut closes = linear_closes(500.0, 0.02, 115);
    let top = closes[114];
    closes.extend((1..=5).map(|k| top - 0.01 * f64::from(k)));
    let bars = session_bars(500.0, &closes, 1_000);
    let chain = single_strike_chain(450.0, 20_000.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.details.session.trend(), Direction::Bullish);
    assert_eq!(decision.details.hedge_pressure.direction, Direction::Bearish);
    assert_eq!(decision.action, Action::Put);
    assert_eq!(decision.confidence, Confidence::Medium);
    assert!(decision.reason.contains("at session high - potential reversal"));
}

#[test]
fn test_pressure_toward_the_pin() {
    // +0.12% on the day: flat trend, drifting up toward a 505 pin.
    let bars = session_bars(500.0, &linear_closes(500.0, 0.005, 120), 1_000);
    let chain = single_strike_chain(505.0, 24_000.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.details.session.trend(), Direction::Flat);
    assert_eq!(decision.action, Action::Call);
    assert_eq!(decision.confidence, Confidence::Medium);
    assert!(decision.reason.ends_with("pushing toward gamma pin @ $505.00"));
}

#[test]
fn test_choppy_tape_stays_flat() {
    let pattern = [0.0, 0.1, 0.1, 0.0, 0.0];
    let closes: Vec<f64> = (0..120).map(|i| 500.0 + pattern[i % 5]).collect();
    let bars = session_bars(500.0, &closes, 1_000);
    let chain = single_strike_chain(480.0, 10_000.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.action, Action::NoTrade);
    assert_eq!(decision.confidence, Confidence::Low);
    assert_eq!(
        decision.reason,
        "Choppy price action - no consistent direction"
    );
    assert!(!decision.details.hedge_pressure.consistent);
}

#[test]
fn test_just_opened_session_is_insufficient() {
    let bars = session_bars(500.0, &linear_closes(500.0, 0.1, 7), 1_000);
    let chain = single_strike_chain(480.0, 10_000.0, 0.05);

    let decision = engine().decide(&chain, &bars, None).unwrap();
    assert_eq!(decision.action, Action::NoTrade);
    assert_eq!(decision.confidence, Confidence::Low);
    assert_eq!(
        decision.reason,
        "Insufficient session data (market just opened)"
    );
    assert!(decision.details.session.insufficient_data);
    assert!(!decision.details.gamma_near_vwap);
}

#[test]
fn test_too_few_bars_is_fatal() {
    let bars = session_bars(500.0, &linear_closes(500.0, 0.1, 4), 1_000);
    let err = engine()
        .decide(&single_strike_chain(480.0, 1.0, 0.05), &bars, None)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientBars {
            required: 6,
            actual: 5
        }
    );
    assert_eq!(err.code(), ErrorCode::InsufficientBars);
    assert!(err.is_invalid_input());
}

#[test]
fn test_unordered_bars_are_fatal() {
    let mut bars = session_bars(500.0, &linear_closes(500.0, 0.1, 20), 1_000);
    bars.swap(5, 6);
    let err = engine()
        .decide(&single_strike_chain(480.0, 1.0, 0.05), &bars, None)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnorderedBars);
}

#[test]
fn test_no_same_day_contracts_is_fatal() {
    let (mut chain, bars) = trending_up();
    for quote in &mut chain {
        quote.expiration = today().succ_opt().unwrap();
    }
    let err = engine().decide(&chain, &bars, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoContractsForExpiry);
}

#[test]
fn test_skewed_ladder_pins_at_500_through_decide() {
    let bars = session_bars(500.0, &linear_closes(500.0, 0.005, 101), 1_000);
    let spot = bars.last().unwrap().close;
    assert!((spot - 500.5).abs() < 1e-9);

    let decision = engine().decide(&skewed_ladder(), &bars, None).unwrap();
    let profile = &decision.details.gamma_profile;
    assert_eq!(profile.max_gamma_strike, 500.0);
    assert_eq!(profile.per_strike.len(), 9);
    assert!((0.0..=1.0).contains(&profile.pin_strength));
    assert!((decision.details.distance_to_pin_pct - (spot - 500.0) / spot * 100.0).abs() < 1e-9);
}

#[test]
fn test_call_decision_selects_atm_contract() {
    let (_, bars) = trending_up();
    let spot = bars.last().unwrap().close;
    let mut chain = skewed_ladder();
    for quote in &mut chain {
        let moneyness = (spot - quote.strike).max(0.0);
        *quote = quote.clone().with_mid(moneyness + 0.75);
    }

    let decision = engine().decide(&chain, &bars, None).unwrap();
    let kind = match decision.action {
        Action::Call => OptionKind::Call,
        Action::Put => OptionKind::Put,
        Action::NoTrade => panic!("expected a trade, got: {}", decision.reason),
    };
    let selection = ContractSelector::new(Default::default())
        .pick_atm(spot, &chain, kind, today())
        .unwrap();
    assert_eq!(selection.quote.strike, 500.0);
    assert_eq!(selection.quote.option_type, kind);
    assert!(selection.quantity >= 1);
}
