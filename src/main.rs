use axum::Router;
use signalcast::config::Config;
use signalcast::services::ReplayOrchestrator;
use signalcast::sources::{DeepSeekClient, KrakenClient};
use signalcast::{api, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalcast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Signalcast server on {}:{}", config.host, config.port);

    if config.deepseek.api_key.is_none() {
        warn!("DEEPSEEK_API_KEY not set; signal requests will fail until it is configured");
    }

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let market = Arc::new(KrakenClient::new(
        config.kraken_api_url.clone(),
        config.kraken_api_key.clone(),
        timeout,
    ));
    let recommender = Arc::new(DeepSeekClient::new(config.deepseek.clone(), timeout));

    let state = AppState {
        config: config.clone(),
        orchestrator: Arc::new(ReplayOrchestrator::new(market, recommender)),
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Signalcast server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
