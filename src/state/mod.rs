//! State management module
//! 
//! This module contains the phase controller, set tracking and the shared
//! application state that the HTTP layer and timer task operate on.

pub mod activity;
pub mod app_state;
pub mod phase_controller;
pub mod plan;
pub mod set_record;
pub mod timer_state;

// Re-export main types
pub use activity::{index_activities, Activity, ActivityKind, ActivityRequest};
pub use app_state::{AppState, SessionError};
pub use phase_controller::{
    PhaseController, SkipBehavior, TimerError, TimerEvent, TimerEventKind, TimerOptions,
};
pub use plan::{ExercisePlan, PlanDefaults, PlanError, WarmupItem, WorkoutPlan};
pub use set_record::{SetError, SetPrescription, SetRecord, SetTracker};
pub use timer_state::{Phase, TimerSnapshot, TimerState};
