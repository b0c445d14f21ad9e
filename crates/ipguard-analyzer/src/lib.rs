//! Event-driven risk analyzer: new-discovery promotion, vision-feedback intake, and the
//! periodic rescore tick (§4.12).

pub mod config;
pub mod error;
pub mod handlers;
pub mod publish;
pub mod rescore;
pub mod tick;

pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use handlers::{handle_new_discovery, handle_vision_feedback};
pub use rescore::{rescore_one, rescore_with_fresh_views};
pub use tick::{run_rescore_tick, TickReport};
