mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod persistence;

pub use app::run_app;
pub use config::load_config;
pub use logging::{initialize as initialize_logging, LogDestination};
