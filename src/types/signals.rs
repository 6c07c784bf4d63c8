use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading action recommended for a candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl TradeSignal {
    /// Parse the exact wire form (`BUY`, `SELL`, `HOLD`).
    ///
    /// Matching is case-sensitive: a lowercase `buy` is malformed output,
    /// not a recommendation.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured recommendation extracted from the recommendation service.
///
/// Only `signal` is validated. Numeric fields are carried through when the
/// service provided something numeric and are `None` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub signal: TradeSignal,
    pub stop_price: Option<f64>,
    pub target_price: Option<f64>,
    /// Confidence or percentage of capital to allocate (0-100).
    pub confidence: Option<f64>,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

/// One emitted signal, tied to the candle it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub timestamp: i64,
    /// `timestamp` rendered as RFC 3339 UTC.
    #[serde(rename = "datetime")]
    pub derived_datetime: String,
    /// Close of the candle at `timestamp`.
    pub price: f64,
    #[serde(rename = "analysis")]
    pub recommendation: Recommendation,
}

/// Result of a `get_signals` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalsResponse {
    pub symbol: String,
    pub interval: u32,
    pub total_candles: usize,
    pub signals: Vec<SignalRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_signal_from_wire() {
        assert_eq!(TradeSignal::from_wire("BUY"), Some(TradeSignal::Buy));
        assert_eq!(TradeSignal::from_wire("SELL"), Some(TradeSignal::Sell));
        assert_eq!(TradeSignal::from_wire("HOLD"), Some(TradeSignal::Hold));
    }

    #[test]
    fn test_trade_signal_is_case_sensitive() {
        assert_eq!(TradeSignal::from_wire("buy"), None);
        assert_eq!(TradeSignal::from_wire("Hold"), None);
        assert_eq!(TradeSignal::from_wire(""), None);
    }

    #[test]
    fn test_trade_signal_serialization() {
        assert_eq!(serde_json::to_string(&TradeSignal::Sell).unwrap(), "\"SELL\"");
        let parsed: TradeSignal = serde_json::from_str("\"HOLD\"").unwrap();
        assert_eq!(parsed, TradeSignal::Hold);
    }

    #[test]
    fn test_signal_record_wire_names() {
        let record = SignalRecord {
            timestamp: 1_700_000_000,
            derived_datetime: "2023-11-14T22:13:20+00:00".to_string(),
            price: 42_000.0,
            recommendation: Recommendation {
                signal: TradeSignal::Buy,
                stop_price: Some(41_000.0),
                target_price: None,
                confidence: Some(60.0),
                reasoning: "trend".to_string(),
                timeframe: None,
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["datetime"], "2023-11-14T22:13:20+00:00");
        assert_eq!(json["analysis"]["signal"], "BUY");
        assert!(json["analysis"]["target_price"].is_null());
        assert!(json["analysis"].get("timeframe").is_none());
    }
}
