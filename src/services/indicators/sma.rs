//! Simple Moving Average (SMA) indicator.

use super::rolling_mean;
use crate::types::Candle;

/// Arithmetic mean of the trailing `window` closes at each index.
///
/// Index `i` is `None` while `i < window - 1`.
pub fn simple_moving_average(candles: &[Candle], window: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    rolling_mean(&closes, window)
}

/// Same as [`simple_moving_average`] but over volume.
pub fn volume_moving_average(candles: &[Candle], window: usize) -> Vec<Option<f64>> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    rolling_mean(&volumes, window)
}
