use serde::{Deserialize, Serialize};

/// One OHLCV observation for a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval open time, seconds since epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Check that timestamps are strictly increasing.
///
/// Returns the index of the first candle that breaks ordering.
pub fn find_ordering_violation(candles: &[Candle]) -> Option<usize> {
    candles
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        .map(|i| i + 1)
}

/// Indicator values for a single candle.
///
/// A field is `None` while its indicator is still warming up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub volume_ma: Option<f64>,
}
