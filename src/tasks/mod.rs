//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod phase_timer;

// Re-export main functions
pub use phase_timer::phase_timer_task;
