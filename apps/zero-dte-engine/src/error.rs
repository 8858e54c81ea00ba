//! Error handling for the 0-DTE engine.
//!
//! Every failure surfaced by the engine is a fatal *input* problem: a
//! required column is missing, a mandatory filter left nothing to work with,
//! or there are too few minute bars. Callers treat any [`EngineError`] as a
//! request to re-fetch or skip the cycle.
//!
//! Numeric non-convergence of the IV solver is deliberately *not* an error;
//! see [`crate::pricing::IvStatus`].
//!
//! # Error Codes
//!
//! | Code | Usage |
//! |------|-------|
//! | `MISSING_COLUMN` | Required field absent from an input row |
//! | `INVALID_VALUE` | Field present but not convertible |
//! | `NO_CONTRACTS_FOR_EXPIRY` | No contracts expire on the session date |
//! | `INSUFFICIENT_BARS` | Too few minute bars for the computation |
//! | `UNORDERED_BARS` | Bars not strictly ascending by timestamp |
//! | `EMPTY_SESSION` | No bars at all to derive a session from |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain for engine errors.
pub const ERROR_DOMAIN: &str = "zero_dte.engine";

/// Error codes for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required column missing from an input table.
    MissingColumn,
    /// Column value could not be converted.
    InvalidValue,
    /// No contracts left after the 0-DTE filter.
    NoContractsForExpiry,
    /// Too few minute bars.
    InsufficientBars,
    /// Minute bars out of order or duplicated.
    UnorderedBars,
    /// No minute bars supplied.
    EmptySession,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingColumn => "MISSING_COLUMN",
            Self::InvalidValue => "INVALID_VALUE",
            Self::NoContractsForExpiry => "NO_CONTRACTS_FOR_EXPIRY",
            Self::InsufficientBars => "INSUFFICIENT_BARS",
            Self::UnorderedBars => "UNORDERED_BARS",
            Self::EmptySession => "EMPTY_SESSION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Fatal input error raised by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A required column is absent.
    #[error("{table}: missing required column '{column}'")]
    MissingColumn {
        /// Input table name (`chain` or `bars`).
        table: &'static str,
        /// Column name.
        column: &'static str,
    },

    /// A column value could not be interpreted.
    #[error("{table}: invalid value for '{column}' at row {row}: {message}")]
    InvalidValue {
        /// Input table name.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Zero-based row index.
        row: usize,
        /// Description of the problem.
        message: String,
    },

    /// No contracts expire on the session date.
    #[error("no 0-DTE contracts for {date} in provided chain (check timezone/expiry fields)")]
    NoContractsForExpiry {
        /// Exchange-local session date.
        date: NaiveDate,
    },

    /// Too few minute bars.
    #[error("need at least {required} minute bars, got {actual}")]
    InsufficientBars {
        /// Minimum number of bars.
        required: usize,
        /// Number supplied.
        actual: usize,
    },

    /// Bars are not strictly ascending.
    #[error("minute bars must be strictly ascending; bar {index} is not after its predecessor")]
    UnorderedBars {
        /// Index of the offending bar.
        index: usize,
    },

    /// No bars supplied.
    #[error("no minute bars supplied")]
    EmptySession,
}

impl EngineError {
    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn { .. } => ErrorCode::MissingColumn,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
            Self::NoContractsForExpiry { .. } => ErrorCode::NoContractsForExpiry,
            Self::InsufficientBars { .. } => ErrorCode::InsufficientBars,
            Self::UnorderedBars { .. } => ErrorCode::UnorderedBars,
            Self::EmptySession => ErrorCode::EmptySession,
        }
    }

    /// Whether the caller should treat this as bad input (re-fetch / skip).
    ///
    /// All engine errors currently are; the method exists so callers do not
    /// have to match on variants.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        true
    }

    /// Key-value context for structured logging.
    #[must_use]
    pub fn context(&self) -> Vec<(String, String)> {
        let mut context = vec![
            ("domain".to_string(), ERROR_DOMAIN.to_string()),
            ("code".to_string(), self.code().reason().to_string()),
        ];
        match self {
            Self::MissingColumn { table, column } => {
                context.push(("table".to_string(), (*table).to_string()));
                context.push(("column".to_string(), (*column).to_string()));
            }
            Self::InvalidValue {
                table, column, row, ..
            } => {
                context.push(("table".to_string(), (*table).to_string()));
                context.push(("column".to_string(), (*column).to_string()));
                context.push(("row".to_string(), row.to_string()));
            }
            Self::NoContractsForExpiry { date } => {
                context.push(("date".to_string(), date.to_string()));
            }
            Self::InsufficientBars { required, actual } => {
                context.push(("required".to_string(), required.to_string()));
                context.push(("actual".to_string(), actual.to_string()));
            }
            Self::UnorderedBars { index } => {
                context.push(("index".to_string(), index.to_string()));
            }
            Self::EmptySession => {}
        }
        context
    }
}
