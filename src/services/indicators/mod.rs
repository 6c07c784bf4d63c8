//! Technical indicator calculations over candle sequences.
//!
//! Every function returns one value per input candle. Positions that do not
//! yet have enough history are `None`.

pub mod rsi;
pub mod sma;

pub use rsi::rsi;
pub use sma::{simple_moving_average, volume_moving_average};

use crate::types::{Candle, IndicatorSnapshot};

/// Window lengths for the indicator set rendered into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub volume_ma: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            rsi_period: 14,
            volume_ma: 20,
        }
    }
}

impl IndicatorParams {
    /// Number of candles needed before every indicator is defined.
    pub fn warm_up(&self) -> usize {
        self.sma_short
            .max(self.sma_long)
            .max(self.volume_ma)
            .max(self.rsi_period + 1)
    }
}

/// Compute a snapshot for every candle.
pub fn indicator_series(candles: &[Candle], params: &IndicatorParams) -> Vec<IndicatorSnapshot> {
    let sma_short = simple_moving_average(candles, params.sma_short);
    let sma_long = simple_moving_average(candles, params.sma_long);
    let rsi = rsi(candles, params.rsi_period);
    let volume_ma = volume_moving_average(candles, params.volume_ma);

    (0..candles.len())
        .map(|i| IndicatorSnapshot {
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            rsi: rsi[i],
            volume_ma: volume_ma[i],
        })
        .collect()
}

/// Snapshot for the last candle, or `None` for an empty sequence.
pub fn latest_snapshot(candles: &[Candle], params: &IndicatorParams) -> Option<IndicatorSnapshot> {
    indicator_series(candles, params).pop()
}

/// Trailing mean of `window` values ending at each index.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}
