//! External collaborators: market data and recommendation text.

pub mod deepseek;
pub mod kraken;

pub use deepseek::DeepSeekClient;
pub use kraken::KrakenClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Candle;

/// Source of historical candles.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch candles for `symbol` starting at `since` (epoch seconds),
    /// ordered by timestamp.
    ///
    /// Fails with `AppError::MarketData` on transport or upstream errors.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval_minutes: u32,
        since: i64,
    ) -> Result<Vec<Candle>>;
}

/// Text-completion service that turns an analysis request into a
/// recommendation.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fails with `AppError::RecommendationService` when unconfigured or on
    /// transport failure.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
