//! One-minute price/volume bars for the underlying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A one-minute bar of the underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteBar {
    /// Bar timestamp (UTC).
    pub timestamp: DateTime<Utc>,
    /// Closing price.
    pub close: f64,
    /// Shares traded.
    pub volume: u64,
}

impl MinuteBar {
    /// Create a new bar.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, close: f64, volume: u64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }

    /// Dollar volume traded in the bar.
    #[must_use]
    pub fn dollar_volume(&self) -> f64 {
        self.close * self.volume as f64
    }
}

/// Check that bars are strictly ascending by timestamp.
///
/// # Errors
///
/// Returns [`EngineError::UnorderedBars`] with the index of the first bar that
/// is not after its predecessor.
pub fn ensure_ascending(bars: &[MinuteBar]) -> Result<(), EngineError> {
    match bars
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        Some(i) => Err(EngineError::UnorderedBars { index: i + 1 }),
        None => Ok(()),
    }
}

/// Median of a slice; `None` when empty.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(sorted[mid - 1].midpoint(sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of a slice; `None` when empty.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(minute: u32, close: f64) -> MinuteBar {
        MinuteBar::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 14, minute, 0).unwrap(),
            close,
            1_000,
        )
    }

    #[test]
    fn test_ensure_ascending() {
        assert!(ensure_ascending(&[bar(0, 1.0), bar(1, 1.0), bar(2, 1.0)]).is_ok());
        assert!(ensure_ascending(&[]).is_ok());
        assert_eq!(
            ensure_ascending(&[bar(0, 1.0), bar(2, 1.0), bar(2, 1.0)]),
            Err(EngineError::UnorderedBars { index: 2 })
        );
    }

    #[test]
    fn test_dollar_volume() {
        assert_eq!(bar(0, 500.0).dollar_volume(), 500_000.0);
    }

    #[test]
    fn test_median_and_mean() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }
}
