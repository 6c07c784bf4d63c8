//! Core signal pipeline.

pub mod indicators;
pub mod parser;
pub mod planner;
pub mod prompt;
pub mod replay;

pub use indicators::IndicatorParams;
pub use parser::parse_recommendation;
pub use planner::{parse_target_date, plan_window, FetchWindow};
pub use prompt::PromptBuilder;
pub use replay::{Mode, ReplayOrchestrator, SignalRequest};
