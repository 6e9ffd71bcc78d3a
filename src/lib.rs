//! Phase Timer - workout phase countdown and set tracking
//! 
//! This library provides the phase controller that walks a workout through its
//! warmup, working-set and rest activities, the per-exercise set tracker, and
//! a small HTTP service that drives them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, PhaseController};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
