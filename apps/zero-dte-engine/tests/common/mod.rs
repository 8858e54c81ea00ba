//! Shared fixtures for integration tests.
//!
//! All scenarios run on Friday 2025-03-14 (EDT, UTC-4): the regular session
//! opens at 13:30 UTC and closes at 20:00 UTC.

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use zero_dte_engine::market::{ContractQuote, MinuteBar, OptionKind};

/// Session date of every fixture.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

/// 09:30 ET on [`today`].
pub fn session_open() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap()
}

/// 15:59 ET on the prior trading day.
pub fn prior_close_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 13, 19, 59, 0).unwrap()
}

/// `minutes` after the open.
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    session_open() + Duration::minutes(minutes)
}

/// One bar of yesterday's close followed by one session bar per close.
pub fn session_bars(prev_close: f64, closes: &[f64], volume: u64) -> Vec<MinuteBar> {
    std::iter::once(MinuteBar::new(prior_close_time(), prev_close, volume))
        .chain(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| MinuteBar::new(at_minute(i as i64), *c, volume)),
        )
        .collect()
}

/// `n` closes starting at `start`, moving `step` per bar.
pub fn linear_closes(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// A 0-DTE contract with open interest and gamma.
pub fn contract(strike: f64, kind: OptionKind, open_interest: f64, gamma: f64) -> ContractQuote {
    let flag = if kind.is_call() { 'C' } else { 'P' };
    ContractQuote::new(format!("SPY250314{flag}{strike:08.0}"), strike, today(), kind)
        .with_underlying("SPY")
        .with_open_interest(open_interest)
        .with_gamma(gamma)
}

/// A chain whose only contract is a call at `pin`, so the pin is known.
pub fn single_strike_chain(pin: f64, open_interest: f64, gamma: f64) -> Vec<ContractQuote> {
    vec![contract(pin, OptionKind::Call, open_interest, gamma)]
}

/// Calls and puts from 480 to 520 in steps of 5, gamma 0.05, open interest
/// 100 except the 500 call (5000) and the 505 put (3000).
pub fn skewed_ladder() -> Vec<ContractQuote> {
    let mut chain = Vec::new();
    for strike in (480..=520).step_by(5) {
        let strike = f64::from(strike);
        let call_oi = if strike == 500.0 { 5_000.0 } else { 100.0 };
        let put_oi = if strike == 505.0 { 3_000.0 } else { 100.0 };
        chain.push(contract(strike, OptionKind::Call, call_oi, 0.05));
        chain.push(contract(strike, OptionKind::Put, put_oi, 0.05));
    }
    chain
}
