//! Relative Strength Index (RSI) indicator.

use super::rolling_mean;
use crate::types::Candle;

/// RSI over closes using a simple trailing mean of gains and losses.
///
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Index `i` is defined once `period` price deltas are available, i.e. for
/// `i >= period`. A window with no losses is 100.
pub fn rsi(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    if candles.is_empty() {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(candles.len() - 1);
    let mut losses = Vec::with_capacity(candles.len() - 1);

    for pair in candles.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    // Index 0 has no delta; delta j belongs to candle j + 1.
    std::iter::once(None)
        .chain(
            avg_gains
                .into_iter()
                .zip(avg_losses)
                .map(|(gain, loss)| Some(rsi_from_averages(gain?, loss?))),
        )
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
