//! Signal pipeline: fetch, plan, and replay.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::services::parser::parse_recommendation;
use crate::services::planner::{parse_target_date, plan_window};
use crate::services::prompt::PromptBuilder;
use crate::sources::{MarketDataSource, RecommendationSource};
use crate::types::{find_ordering_violation, Candle, SignalRecord, SignalsResponse};

/// A `get_signals` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRequest {
    pub symbol: String,
    pub interval_minutes: u32,
    /// ISO-8601 replay date. `None` asks for the latest candle only.
    pub target_date: Option<String>,
}

/// How signals are generated for a fetched sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One signal for the last candle.
    Single,
    /// One signal per candle once indicators are warmed up.
    Replay,
}

impl Mode {
    pub fn select(has_target: bool, candle_count: usize) -> Self {
        if has_target && candle_count > 1 {
            Mode::Replay
        } else {
            Mode::Single
        }
    }
}

/// Drives candles through prompt, recommendation and parsing.
///
/// Steps run one after another. Any failure aborts the whole request and
/// discards records already produced.
#[derive(Clone)]
pub struct ReplayOrchestrator {
    market: Arc<dyn MarketDataSource>,
    recommender: Arc<dyn RecommendationSource>,
    prompt_builder: PromptBuilder,
}

impl ReplayOrchestrator {
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        recommender: Arc<dyn RecommendationSource>,
    ) -> Self {
        Self::with_prompt_builder(market, recommender, PromptBuilder::default())
    }

    pub fn with_prompt_builder(
        market: Arc<dyn MarketDataSource>,
        recommender: Arc<dyn RecommendationSource>,
        prompt_builder: PromptBuilder,
    ) -> Self {
        Self {
            market,
            recommender,
            prompt_builder,
        }
    }

    /// First candle index that gets a signal in replay mode.
    pub fn replay_start_index(&self) -> usize {
        self.prompt_builder.params().warm_up().saturating_sub(1)
    }

    /// Generate signals using the current wall-clock time.
    pub async fn get_signals(&self, request: &SignalRequest) -> Result<SignalsResponse> {
        self.get_signals_at(request, Utc::now().timestamp()).await
    }

    /// Generate signals as if the current time were `now` (epoch seconds).
    pub async fn get_signals_at(&self, request: &SignalRequest, now: i64) -> Result<SignalsResponse> {
        let target = request
            .target_date
            .as_deref()
            .map(parse_target_date)
            .transpose()?;

        let window = plan_window(request.interval_minutes, target, now);
        debug!(
            "Planned window for {}: since={} candles={}",
            request.symbol, window.since, window.candle_count
        );

        let candles = self
            .market
            .fetch_candles(&request.symbol, request.interval_minutes, window.since)
            .await?;

        let Some(last_index) = candles.len().checked_sub(1) else {
            return Err(AppError::NoData(request.symbol.clone()));
        };

        if let Some(index) = find_ordering_violation(&candles) {
            return Err(AppError::MarketData(format!(
                "Candle timestamps not strictly increasing at index {} ({} after {})",
                index,
                candles[index].timestamp,
                candles[index - 1].timestamp
            )));
        }

        let mode = Mode::select(target.is_some(), candles.len());
        info!(
            "Generating {:?} signals for {} ({} candles, {}m)",
            mode,
            request.symbol,
            candles.len(),
            request.interval_minutes
        );

        let signals = match mode {
            Mode::Single => vec![self.signal_for(&candles, last_index).await?],
            Mode::Replay => self.replay(&candles).await?,
        };

        Ok(SignalsResponse {
            symbol: request.symbol.clone(),
            interval: request.interval_minutes,
            total_candles: candles.len(),
            signals,
        })
    }

    async fn replay(&self, candles: &[Candle]) -> Result<Vec<SignalRecord>> {
        let start = self.replay_start_index();
        let mut signals = Vec::with_capacity(candles.len().saturating_sub(start));

        for index in start..candles.len() {
            debug!("Replay step {}/{}", index + 1, candles.len());
            signals.push(self.signal_for(candles, index).await?);
        }

        Ok(signals)
    }

    /// Signal for `candles[index]`, seeing nothing after it.
    async fn signal_for(&self, candles: &[Candle], index: usize) -> Result<SignalRecord> {
        let latest = &candles[index];
        let prompt = self.prompt_builder.build(candles, index);

        let response = self.recommender.complete(&prompt).await?;
        let recommendation = parse_recommendation(&response)?;

        Ok(SignalRecord {
            timestamp: latest.timestamp,
            derived_datetime: format_datetime(latest.timestamp),
            price: latest.close,
            recommendation,
        })
    }
}

fn format_datetime(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_select() {
        assert_eq!(Mode::select(false, 50), Mode::Single);
        assert_eq!(Mode::select(true, 1), Mode::Single);
        assert_eq!(Mode::select(true, 2), Mode::Replay);
        assert_eq!(Mode::select(true, 60), Mode::Replay);
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(1_705_320_000), "2024-01-15T12:00:00+00:00");
    }
}
