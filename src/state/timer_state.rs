//! Timer state structure and snapshots

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a phase controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    /// Between an advance and the automatic start of the next activity
    Advancing,
    Finished,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished)
    }
}

/// Mutable progress state owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub current_index: usize,
    pub seconds_remaining: u32,
    pub is_running: bool,
}

impl TimerState {
    /// Create a stopped state positioned on the first activity
    pub fn new() -> Self {
        Self {
            current_index: 0,
            seconds_remaining: 0,
            is_running: false,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a controller, broadcast to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub phase: Phase,
    pub total_activities: usize,
    pub progress: f64,
    pub is_last_activity: bool,
    /// Whether a one-second tick source is currently armed
    pub ticking: bool,
    /// Incremented every time a new tick source is armed
    pub tick_generation: u64,
}

impl TimerSnapshot {
    /// Snapshot used before any session exists
    pub fn empty() -> Self {
        Self {
            state: TimerState::new(),
            phase: Phase::Idle,
            total_activities: 0,
            progress: 0.0,
            is_last_activity: false,
            ticking: false,
            tick_generation: 0,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
