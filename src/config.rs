use std::env;

/// Settings for the chat-completions service that produces recommendations.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// Chat completions endpoint.
    pub api_url: String,
    /// Bearer token. Requests fail when this is unset.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token limit.
    pub max_tokens: u32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "deepseek-chat".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Kraken public REST base URL.
    pub kraken_api_url: String,
    /// Kraken API key (optional, the OHLC endpoint is public).
    pub kraken_api_key: Option<String>,
    /// Recommendation service settings.
    pub deepseek: DeepSeekConfig,
    /// Pair used when a request omits `symbol`.
    pub default_symbol: String,
    /// Candle interval in minutes used when a request omits `interval`.
    pub default_interval: u32,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = DeepSeekConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            kraken_api_url: env::var("KRAKEN_API_URL")
                .unwrap_or_else(|_| "https://api.kraken.com/0/public".to_string()),
            kraken_api_key: env::var("KRAKEN_API_KEY").ok().filter(|k| !k.is_empty()),
            deepseek: DeepSeekConfig {
                api_url: env::var("DEEPSEEK_API_URL").unwrap_or(defaults.api_url),
                api_key: env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("DEEPSEEK_MODEL").unwrap_or(defaults.model),
                temperature: env::var("DEEPSEEK_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.temperature),
                max_tokens: env::var("DEEPSEEK_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_tokens),
            },
            default_symbol: env::var("DEFAULT_SYMBOL").unwrap_or_else(|_| "XBTUSD".to_string()),
            default_interval: env::var("DEFAULT_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_config_defaults() {
        let config = DeepSeekConfig::default();
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 1000);
        assert!(config.api_key.is_none());
        assert!(config.api_url.ends_with("/chat/completions"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            kraken_api_url: "http://localhost:9000".to_string(),
            kraken_api_key: None,
            deepseek: DeepSeekConfig::default(),
            default_symbol: "ETHUSD".to_string(),
            default_interval: 15,
            http_timeout_secs: 5,
        };

        let cloned = config.clone();
        assert_eq!(cloned.port, 8080);
        assert_eq!(cloned.default_symbol, "ETHUSD");
        assert_eq!(cloned.default_interval, 15);
    }
}
