use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid date format. Use ISO format (e.g., 2024-01-15T12:00:00Z): {0}")]
    InvalidDate(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("No candle data found for {0}")]
    NoData(String),

    #[error("Recommendation service error: {0}")]
    RecommendationService(String),

    #[error("Could not parse recommendation: {0}")]
    UnparsableRecommendation(String),
}

impl AppError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidDate(_) => "invalid_date",
            AppError::BadRequest(_) => "bad_request",
            AppError::MarketData(_) => "market_data_error",
            AppError::NoData(_) => "no_data",
            AppError::RecommendationService(_) => "recommendation_service_error",
            AppError::UnparsableRecommendation(_) => "unparsable_recommendation",
        }
    }

    /// HTTP status this error is surfaced with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDate(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoData(_) => StatusCode::NOT_FOUND,
            AppError::MarketData(_)
            | AppError::RecommendationService(_)
            | AppError::UnparsableRecommendation(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_4xx() {
        assert_eq!(
            AppError::InvalidDate("yesterday".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("interval".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NoData("XBTUSD".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_errors_are_5xx() {
        for err in [
            AppError::MarketData("boom".into()),
            AppError::RecommendationService("boom".into()),
            AppError::UnparsableRecommendation("boom".into()),
        ] {
            assert!(err.status().is_server_error(), "{} should be 5xx", err.code());
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            AppError::InvalidDate(String::new()).code(),
            AppError::BadRequest(String::new()).code(),
            AppError::MarketData(String::new()).code(),
            AppError::NoData(String::new()).code(),
            AppError::RecommendationService(String::new()).code(),
            AppError::UnparsableRecommendation(String::new()).code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_message_includes_detail() {
        let err = AppError::NoData("XBTUSD".into());
        assert_eq!(err.to_string(), "No candle data found for XBTUSD");
    }
}
