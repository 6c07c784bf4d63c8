use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::MarketDataSource;
use crate::error::{AppError, Result};
use crate::types::Candle;

/// Candle intervals (minutes) accepted by the Kraken OHLC endpoint.
pub const SUPPORTED_INTERVALS: &[u32] = &[1, 5, 15, 30, 60, 240, 1440, 10080, 21600];

/// Short symbol -> Kraken trading pair.
pub const SYMBOL_PAIRS: &[(&str, &str)] = &[
    ("btc", "XBTUSD"),
    ("eth", "ETHUSD"),
    ("sol", "SOLUSD"),
    ("xrp", "XRPUSD"),
    ("doge", "XDGUSD"),
    ("ada", "ADAUSD"),
    ("avax", "AVAXUSD"),
    ("dot", "DOTUSD"),
    ("link", "LINKUSD"),
    ("ltc", "LTCUSD"),
    ("atom", "ATOMUSD"),
    ("uni", "UNIUSD"),
    ("xlm", "XLMUSD"),
    ("bch", "BCHUSD"),
];

/// Resolve a user-supplied symbol to a Kraken pair.
///
/// Known short symbols (`btc`, `eth`, ...) are mapped; anything else is
/// passed through uppercased.
pub fn resolve_pair(symbol: &str) -> String {
    let lower = symbol.trim().to_lowercase();
    SYMBOL_PAIRS
        .iter()
        .find(|(s, _)| *s == lower)
        .map(|(_, pair)| pair.to_string())
        .unwrap_or_else(|| symbol.trim().to_uppercase())
}

pub fn is_supported_interval(interval_minutes: u32) -> bool {
    SUPPORTED_INTERVALS.contains(&interval_minutes)
}

/// Kraken OHLC response.
///
/// `result` holds one entry keyed by the pair name plus a `last` cursor.
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    result: Option<HashMap<String, Value>>,
}

/// Kraken REST client for OHLC candles.
#[derive(Clone)]
pub struct KrakenClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl KrakenClient {
    /// Create a new Kraken client.
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("Signalcast/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl MarketDataSource for KrakenClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval_minutes: u32,
        since: i64,
    ) -> Result<Vec<Candle>> {
        let pair = resolve_pair(symbol);
        let url = format!("{}/OHLC", self.base_url);

        debug!(
            "Fetching Kraken OHLC: pair={} interval={} since={}",
            pair, interval_minutes, since
        );

        let mut request = self.client.get(&url).query(&[
            ("pair", pair),
            ("interval", interval_minutes.to_string()),
            ("since", since.to_string()),
        ]);

        if let Some(ref key) = self.api_key {
            request = request.header("API-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::MarketData(format!("Kraken request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Kraken API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::MarketData(format!("Kraken API error: {}", status)));
        }

        let data: KrakenResponse = response
            .json()
            .await
            .map_err(|e| AppError::MarketData(format!("Failed to parse Kraken response: {}", e)))?;

        parse_ohlc_response(data)
    }
}

fn parse_ohlc_response(data: KrakenResponse) -> Result<Vec<Candle>> {
    if !data.error.is_empty() {
        warn!("Kraken API errors: {:?}", data.error);
        return Err(AppError::MarketData(format!(
            "Kraken API error: {}",
            data.error.join(", ")
        )));
    }

    let Some(result) = data.result else {
        return Ok(Vec::new());
    };

    let rows = result
        .into_iter()
        .find_map(|(key, value)| match value {
            Value::Array(rows) if key != "last" => Some(rows),
            _ => None,
        })
        .unwrap_or_default();

    rows.iter().map(parse_row).collect()
}

/// Row layout: `[time, open, high, low, close, vwap, volume, count]`.
fn parse_row(row: &Value) -> Result<Candle> {
    let fields = row
        .as_array()
        .filter(|f| f.len() >= 7)
        .ok_or_else(|| AppError::MarketData(format!("Malformed Kraken OHLC row: {}", row)))?;

    let timestamp = fields[0]
        .as_i64()
        .or_else(|| fields[0].as_f64().map(|t| t as i64))
        .ok_or_else(|| AppError::MarketData(format!("Invalid OHLC timestamp: {}", fields[0])))?;

    Ok(Candle {
        timestamp,
        open: number(&fields[1])?,
        high: number(&fields[2])?,
        low: number(&fields[3])?,
        close: number(&fields[4])?,
        volume: number(&fields[6])?,
    })
}

fn number(value: &Value) -> Result<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| AppError::MarketData(format!("Invalid OHLC value: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> KrakenResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_known_symbol() {
        assert_eq!(resolve_pair("btc"), "XBTUSD");
        assert_eq!(resolve_pair("ETH"), "ETHUSD");
    }

    #[test]
    fn test_resolve_passthrough() {
        assert_eq!(resolve_pair("XBTUSD"), "XBTUSD");
        assert_eq!(resolve_pair("dotusd"), "DOTUSD");
    }

    #[test]
    fn test_symbol_pairs_lowercase_symbols() {
        for (symbol, _) in SYMBOL_PAIRS {
            assert_eq!(*symbol, symbol.to_lowercase());
        }
    }

    #[test]
    fn test_supported_intervals() {
        assert!(is_supported_interval(60));
        assert!(is_supported_interval(1440));
        assert!(!is_supported_interval(2));
        assert!(!is_supported_interval(0));
    }

    #[test]
    fn test_parse_ohlc_success() {
        let data = response(
            r#"{
                "error": [],
                "result": {
                    "XXBTZUSD": [
                        [1705316400, "42800.1", "42950.0", "42700.5", "42900.0", "42850.2", "12.5", 340],
                        [1705320000, "42900.0", "43010.0", "42880.0", "43000.5", "42950.0", "8.25", 210]
                    ],
                    "last": 1705316400
                }
            }"#,
        );

        let candles = parse_ohlc_response(data).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1705316400);
        assert_eq!(candles[0].open, 42800.1);
        assert_eq!(candles[0].close, 42900.0);
        assert_eq!(candles[0].volume, 12.5);
        assert_eq!(candles[1].high, 43010.0);
        assert_eq!(candles[1].low, 42880.0);
    }

    #[test]
    fn test_parse_ohlc_upstream_error() {
        let data = response(r#"{"error": ["EQuery:Unknown asset pair"]}"#);
        let err = parse_ohlc_response(data).unwrap_err();
        assert!(matches!(err, AppError::MarketData(ref msg) if msg.contains("Unknown asset pair")));
    }

    #[test]
    fn test_parse_ohlc_empty() {
        let data = response(r#"{"error": [], "result": {"XXBTZUSD": [], "last": 0}}"#);
        assert!(parse_ohlc_response(data).unwrap().is_empty());

        let data = response(r#"{"error": []}"#);
        assert!(parse_ohlc_response(data).unwrap().is_empty());
    }

    #[test]
    fn test_parse_ohlc_malformed_row() {
        let data = response(
            r#"{"error": [], "result": {"XXBTZUSD": [[1705316400, "abc", "1", "1", "1", "1", "1", 1]], "last": 0}}"#,
        );
        assert!(matches!(
            parse_ohlc_response(data).unwrap_err(),
            AppError::MarketData(_)
        ));

        let data = response(r#"{"error": [], "result": {"XXBTZUSD": [[1705316400, "1"]], "last": 0}}"#);
        assert!(parse_ohlc_response(data).is_err());
    }
}
