//! Analysis request rendering.

use chrono::{DateTime, Utc};

use crate::services::indicators::{latest_snapshot, IndicatorParams};
use crate::types::Candle;

/// System message sent alongside every analysis request.
pub const SYSTEM_PROMPT: &str = "You are an expert cryptocurrency trading analyst. \
Provide clear, concise trading signals with proper risk management. Always respond with valid JSON.";

/// Renders a candle window and its indicators into a text request.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    params: IndicatorParams,
    context_candles: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            params: IndicatorParams::default(),
            context_candles: 5,
        }
    }
}

impl PromptBuilder {
    pub fn new(params: IndicatorParams, context_candles: usize) -> Self {
        Self {
            params,
            context_candles,
        }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Build the request for `candles[index]`.
    ///
    /// Only `candles[..=index]` is read, so later candles never reach the
    /// request.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn build(&self, candles: &[Candle], index: usize) -> String {
        let history = &candles[..=index];
        let latest = &history[index];
        let previous = index.checked_sub(1).map_or(latest, |i| &history[i]);
        let snapshot = latest_snapshot(history, &self.params).unwrap_or_default();

        let price_change = pct_change(latest.close, Some(previous.close));
        let vs_short = pct_change(latest.close, snapshot.sma_short);
        let vs_long = pct_change(latest.close, snapshot.sma_long);

        let context_start = index.saturating_sub(self.context_candles);
        let context: String = history[context_start..index]
            .iter()
            .map(|candle| {
                format!(
                    "- {} O: {:.2} H: {:.2} L: {:.2} C: {:.2} V: {:.2}\n",
                    format_time(candle.timestamp),
                    candle.open,
                    candle.high,
                    candle.low,
                    candle.close,
                    candle.volume
                )
            })
            .collect();

        format!(
            r#"Analyze the following cryptocurrency market data and provide trading signals:

LATEST CANDLE DATA:
- Timestamp: {timestamp}
- Open: ${open:.2}
- High: ${high:.2}
- Low: ${low:.2}
- Close: ${close:.2}
- Volume: {volume:.2}

TECHNICAL INDICATORS:
- SMA {short}: {sma_short}
- SMA {long}: {sma_long}
- RSI: {rsi}
- Volume MA: {volume_ma}

PRICE ACTION:
- Price change: {price_change}
- Relative to SMA {short}: {vs_short}
- Relative to SMA {long}: {vs_long}

PREVIOUS {context_len} CANDLES:
{context}{contract}"#,
            timestamp = format_time(latest.timestamp),
            open = latest.open,
            high = latest.high,
            low = latest.low,
            close = latest.close,
            volume = latest.volume,
            short = self.params.sma_short,
            long = self.params.sma_long,
            sma_short = format_price(snapshot.sma_short),
            sma_long = format_price(snapshot.sma_long),
            rsi = format_value(snapshot.rsi),
            volume_ma = format_value(snapshot.volume_ma),
            price_change = format_pct(price_change),
            vs_short = format_pct(vs_short),
            vs_long = format_pct(vs_long),
            context_len = index - context_start,
            contract = OUTPUT_CONTRACT,
        )
    }
}

const OUTPUT_CONTRACT: &str = r#"
Respond with a single JSON object and nothing else, using exactly these fields:
{
  "signal": "BUY" | "SELL" | "HOLD",
  "stop_price": number (stop loss price),
  "target_price": number (price target),
  "confidence": number (percentage of capital to allocate, 0-100),
  "timeframe": string (expected holding period, e.g. "1-4 hours"),
  "reasoning": string (detailed reasoning for the signal)
}

Consider:
- Trend direction and strength
- Support/resistance levels
- Volume analysis
- RSI overbought/oversold conditions
- Risk management principles
"#;

fn pct_change(value: f64, reference: Option<f64>) -> Option<f64> {
    let reference = reference?;
    if reference == 0.0 {
        return None;
    }
    Some((value - reference) / reference * 100.0)
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn format_price(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a (insufficient history)".to_string(), |v| format!("${:.2}", v))
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a (insufficient history)".to_string(), |v| format!("{:.2}", v))
}

fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v))
}
