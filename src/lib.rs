//! Signalcast - candle indicator pipeline and historical signal replay

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::ReplayOrchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<ReplayOrchestrator>,
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::*;
