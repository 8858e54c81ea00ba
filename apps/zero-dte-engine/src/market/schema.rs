//! Boundary between loosely typed rows and the engine's typed records.
//!
//! Data collaborators normalise vendor field names; this module only checks
//! the canonical schema and converts values. A column counts as present when
//! at least one row carries the key. Individual `null`s in optional market
//! fields are allowed and later default to neutral values.
//!
//! Required chain columns: `strike`, `option_type`, `expiration`, `gamma`,
//! `open_interest`. Required bar columns: `timestamp`, `close`, `volume`.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use super::bars::MinuteBar;
use super::contract::{ContractQuote, DEFAULT_MULTIPLIER, OptionKind};
use crate::error::EngineError;

const CHAIN: &str = "chain";
const BARS: &str = "bars";

/// Required chain columns.
pub const REQUIRED_CHAIN_COLUMNS: [&str; 5] =
    ["strike", "option_type", "expiration", "gamma", "open_interest"];

/// Required minute-bar columns.
pub const REQUIRED_BAR_COLUMNS: [&str; 3] = ["timestamp", "close", "volume"];

/// Convert JSON object rows into contract quotes.
///
/// # Errors
///
/// Returns [`EngineError::MissingColumn`] when a required column is absent
/// from every row, or [`EngineError::InvalidValue`] when a value cannot be
/// converted.
pub fn chain_from_json_rows(rows: &[Value]) -> Result<Vec<ContractQuote>, EngineError> {
    let objects = as_objects(rows, CHAIN)?;
    require_columns(&objects, CHAIN, &REQUIRED_CHAIN_COLUMNS)?;

    objects
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let strike = required_number(obj, CHAIN, "strike", row)?;
            let expiration = required_date(obj, "expiration", row)?;
            let flag = required_str(obj, CHAIN, "option_type", row)?;
            let option_type =
                OptionKind::from_flag(flag).ok_or_else(|| EngineError::InvalidValue {
                    table: CHAIN,
                    column: "option_type",
                    row,
                    message: format!("unrecognised option type '{flag}'"),
                })?;

            Ok(ContractQuote {
                symbol: optional_str(obj, "symbol"),
                underlying: optional_str(obj, "underlying"),
                strike,
                expiration,
                option_type,
                bid: optional_number(obj, CHAIN, "bid", row)?,
                ask: optional_number(obj, CHAIN, "ask", row)?,
                last: optional_number(obj, CHAIN, "last", row)?,
                mid: optional_number(obj, CHAIN, "mid", row)?,
                open_interest: optional_number(obj, CHAIN, "open_interest", row)?.unwrap_or(0.0),
                multiplier: optional_number(obj, CHAIN, "multiplier", row)?
                    .unwrap_or(DEFAULT_MULTIPLIER),
                delta: optional_number(obj, CHAIN, "delta", row)?,
                gamma: optional_number(obj, CHAIN, "gamma", row)?,
                theta: optional_number(obj, CHAIN, "theta", row)?,
                vega: optional_number(obj, CHAIN, "vega", row)?,
                implied_volatility: optional_number(obj, CHAIN, "implied_volatility", row)?,
                underlying_price: optional_number(obj, CHAIN, "underlying_price", row)?,
            })
        })
        .collect()
}

/// Convert JSON object rows into minute bars (order preserved).
///
/// `timestamp` may be an RFC 3339 string or epoch milliseconds.
///
/// # Errors
///
/// Returns [`EngineError::MissingColumn`] or [`EngineError::InvalidValue`].
pub fn bars_from_json_rows(rows: &[Value]) -> Result<Vec<MinuteBar>, EngineError> {
    let objects = as_objects(rows, BARS)?;
    require_columns(&objects, BARS, &REQUIRED_BAR_COLUMNS)?;

    objects
        .iter()
        .enumerate()
        .map(|(row, obj)| {
            let timestamp = required_timestamp(obj, row)?;
            let close = required_number(obj, BARS, "close", row)?;
            if !close.is_finite() || close <= 0.0 {
                return Err(EngineError::InvalidValue {
                    table: BARS,
                    column: "close",
                    row,
                    message: format!("close must be a positive finite price, got {close}"),
                });
            }
            let volume = required_number(obj, BARS, "volume", row)?;
            if !volume.is_finite() || volume < 0.0 {
                return Err(EngineError::InvalidValue {
                    table: BARS,
                    column: "volume",
                    row,
                    message: format!("volume must be finite and non-negative, got {volume}"),
                });
            }
            Ok(MinuteBar::new(timestamp, close, volume.round() as u64))
        })
        .collect()
}

fn as_objects<'a>(
    rows: &'a [Value],
    table: &'static str,
) -> Result<Vec<&'a Map<String, Value>>, EngineError> {
    rows.iter()
        .enumerate()
        .map(|(row, value)| {
            value.as_object().ok_or_else(|| EngineError::InvalidValue {
                table,
                column: "<row>",
                row,
                message: "row is not a JSON object".to_string(),
            })
        })
        .collect()
}

fn require_columns(
    objects: &[&Map<String, Value>],
    table: &'static str,
    columns: &[&'static str],
) -> Result<(), EngineError> {
    if objects.is_empty() {
        return Ok(());
    }
    for &column in columns {
        if !objects.iter().any(|obj| obj.contains_key(column)) {
            return Err(EngineError::MissingColumn { table, column });
        }
    }
    Ok(())
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn optional_number(
    obj: &Map<String, Value>,
    table: &'static str,
    column: &'static str,
    row: usize,
) -> Result<Option<f64>, EngineError> {
    match obj.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => to_number(value)
            .map(Some)
            .ok_or_else(|| EngineError::InvalidValue {
                table,
                column,
                row,
                message: format!("expected a number, got {value}"),
            }),
    }
}

fn required_number(
    obj: &Map<String, Value>,
    table: &'static str,
    column: &'static str,
    row: usize,
) -> Result<f64, EngineError> {
    optional_number(obj, table, column, row)?.ok_or_else(|| EngineError::InvalidValue {
        table,
        column,
        row,
        message: "value is null".to_string(),
    })
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    table: &'static str,
    column: &'static str,
    row: usize,
) -> Result<&'a str, EngineError> {
    obj.get(column)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::InvalidValue {
            table,
            column,
            row,
            message: "expected a string".to_string(),
        })
}

fn optional_str(obj: &Map<String, Value>, column: &str) -> String {
    obj.get(column)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn required_date(
    obj: &Map<String, Value>,
    column: &'static str,
    row: usize,
) -> Result<NaiveDate, EngineError> {
    let raw = required_str(obj, CHAIN, column, row)?;
    let trimmed = raw.trim();
    // Dates may arrive as a bare date or a full timestamp; only the date matters.
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| EngineError::InvalidValue {
        table: CHAIN,
        column,
        row,
        message: format!("cannot parse date '{raw}': {e}"),
    })
}

fn required_timestamp(obj: &Map<String, Value>, row: usize) -> Result<DateTime<Utc>, EngineError> {
    let invalid = |message: String| EngineError::InvalidValue {
        table: BARS,
        column: "timestamp",
        row,
        message,
    };
    match obj.get("timestamp") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| invalid(format!("cannot parse timestamp '{s}': {e}"))),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| invalid(format!("epoch millis out of range: {n}"))),
        Some(other) => Err(invalid(format!("unsupported timestamp {other}"))),
        None => Err(invalid("value is null".to_string())),
    }
}
