//! Recommendation extraction from free-form service responses.
//!
//! The recommendation service is asked for bare JSON but regularly wraps it
//! in code fences or surrounds it with prose. Extraction is an ordered list
//! of strategies; the first one that yields a JSON object wins, and that
//! object is then validated.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::{Recommendation, TradeSignal};

/// A single extraction attempt.
pub type ParseStrategy = fn(&str) -> Option<Map<String, Value>>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, ParseStrategy)] = &[
    ("json_fence", json_fence as ParseStrategy),
    ("generic_fence", generic_fence as ParseStrategy),
    ("whole_text", whole_text as ParseStrategy),
    ("brace_span", brace_span as ParseStrategy),
];

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Extract and validate a recommendation from `text`.
pub fn parse_recommendation(text: &str) -> Result<Recommendation> {
    let (strategy, object) = STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(text).map(|object| (*name, object)))
        .ok_or_else(|| {
            AppError::UnparsableRecommendation(format!(
                "no JSON object found in response: {}",
                preview(text)
            ))
        })?;

    debug!("Recommendation extracted with {} strategy", strategy);
    recommendation_from_object(&object)
}

/// Content between the first ```json fence and the next closing fence.
pub fn json_fence(text: &str) -> Option<Map<String, Value>> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let body = fenced_body(&text[start..])?;
    parse_object(body)
}

/// Content between the first pair of ``` fences.
///
/// An info string on the opening fence line (`javascript`, `JSON`, ...) is
/// skipped.
pub fn generic_fence(text: &str) -> Option<Map<String, Value>> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let body = fenced_body(rest)?;

    let body = match body.split_once('\n') {
        Some((info, content)) if is_info_string(info) => content,
        _ => body,
    };
    parse_object(body)
}

/// The whole response as JSON.
pub fn whole_text(text: &str) -> Option<Map<String, Value>> {
    parse_object(text)
}

/// The span from the leftmost `{` to the rightmost `}`.
pub fn brace_span(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&text[start..=end])
}

fn fenced_body(rest: &str) -> Option<&str> {
    let end = rest.find(FENCE)?;
    Some(&rest[..end])
}

fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Build a [`Recommendation`] from a parsed JSON object.
///
/// `signal` must be exactly `BUY`, `SELL` or `HOLD`. The other fields are
/// best-effort and accept the older `target`, `percentOfCapital` and
/// `reason` names.
pub fn recommendation_from_object(object: &Map<String, Value>) -> Result<Recommendation> {
    let signal = match object.get("signal") {
        Some(Value::String(s)) => TradeSignal::from_wire(s).ok_or_else(|| {
            AppError::UnparsableRecommendation(format!("invalid signal value {:?}", s))
        })?,
        Some(other) => {
            return Err(AppError::UnparsableRecommendation(format!(
                "invalid signal value {}",
                other
            )))
        }
        None => {
            return Err(AppError::UnparsableRecommendation(
                "response has no signal field".to_string(),
            ))
        }
    };

    Ok(Recommendation {
        signal,
        stop_price: number_field(object, &["stop_price", "stop_loss"]),
        target_price: number_field(object, &["target_price", "target"]),
        confidence: number_field(
            object,
            &["confidence", "percentOfCapital", "percent_of_capital", "allocation"],
        ),
        reasoning: text_field(object, &["reasoning", "reason"]).unwrap_or_default(),
        timeframe: text_field(object, &["timeframe"]),
    })
}

fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    })
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
