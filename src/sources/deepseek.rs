use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::RecommendationSource;
use crate::config::DeepSeekConfig;
use crate::error::{AppError, Result};
use crate::services::prompt::SYSTEM_PROMPT;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for the DeepSeek API.
#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    config: DeepSeekConfig,
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("Signalcast/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl RecommendationSource for DeepSeekClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::RecommendationService("DeepSeek API key not configured".to_string())
        })?;

        debug!("Requesting DeepSeek completion ({} prompt chars)", prompt.len());

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| AppError::RecommendationService(format!("DeepSeek request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                "DeepSeek API returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            );
            return Err(AppError::RecommendationService(format!(
                "DeepSeek API error: {}",
                status
            )));
        }

        let data: ChatResponse = response.json().await.map_err(|e| {
            AppError::RecommendationService(format!("Failed to parse DeepSeek response: {}", e))
        })?;

        extract_content(data)
    }
}

fn extract_content(data: ChatResponse) -> Result<String> {
    data.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            AppError::RecommendationService("DeepSeek response has no message content".to_string())
        })
}
