//! Signal API endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::SignalRequest;
use crate::sources::kraken::{is_supported_interval, SUPPORTED_INTERVALS};
use crate::types::SignalsResponse;
use crate::AppState;

/// Query parameters for the signals endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SignalsQuery {
    /// Trading pair, e.g. `XBTUSD` or `btc`.
    pub symbol: Option<String>,
    /// Candle interval in minutes.
    pub interval: Option<String>,
    /// ISO-8601 date. When present, signals are replayed for every candle.
    pub date: Option<String>,
}

impl SignalsQuery {
    /// Resolve defaults and validate into a pipeline request.
    pub fn into_request(self, default_symbol: &str, default_interval: u32) -> Result<SignalRequest> {
        let symbol = self
            .symbol
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_symbol.to_string());

        let interval_minutes = match self.interval.as_deref().map(str::trim) {
            None | Some("") => default_interval,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::BadRequest(format!("interval must be a whole number of minutes, got {:?}", raw))
            })?,
        };

        if !is_supported_interval(interval_minutes) {
            return Err(AppError::BadRequest(format!(
                "unsupported interval {}; expected one of {:?}",
                interval_minutes, SUPPORTED_INTERVALS
            )));
        }

        Ok(SignalRequest {
            symbol,
            interval_minutes,
            target_date: self.date.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_signals))
}

/// Get trading signals for the latest candle, or replayed over a window.
async fn get_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalsQuery>,
) -> Result<Json<SignalsResponse>> {
    let request = query.into_request(&state.config.default_symbol, state.config.default_interval)?;
    let response = state.orchestrator.get_signals(&request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(qs: &str) -> SignalsQuery {
        serde_urlencoded::from_str(qs).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let request = query("").into_request("XBTUSD", 60).unwrap();
        assert_eq!(request.symbol, "XBTUSD");
        assert_eq!(request.interval_minutes, 60);
        assert!(request.target_date.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let request = query("symbol=ETHUSD&interval=15&date=2024-01-15T12:00:00Z")
            .into_request("XBTUSD", 60)
            .unwrap();
        assert_eq!(request.symbol, "ETHUSD");
        assert_eq!(request.interval_minutes, 15);
        assert_eq!(request.target_date.as_deref(), Some("2024-01-15T12:00:00Z"));
    }

    #[test]
    fn test_empty_date_is_none() {
        let request = query("date=").into_request("XBTUSD", 60).unwrap();
        assert!(request.target_date.is_none());
    }

    #[test]
    fn test_non_numeric_interval() {
        let err = query("interval=hourly").into_request("XBTUSD", 60).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_unsupported_interval() {
        let err = query("interval=7").into_request("XBTUSD", 60).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
