//! Phase timer and set-advance controller
//!
//! The controller tracks progress through a fixed sequence of activities. It
//! is purely synchronous: something else (see `tasks::phase_timer`) delivers
//! one `tick(generation)` per second for the armed tick source, and calls
//! `complete_advance()` once the advance delay has elapsed.

use std::{fmt, sync::Arc, time::Duration};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::haptics::{HapticIntensity, HapticService, NoHaptics};
use super::{Activity, Phase, TimerSnapshot, TimerState};

pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_WARNING_THRESHOLD_SECONDS: u32 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Activity sequence must contain at least one activity")]
    EmptySequence,
    #[error("Activity at position {expected} has index {found}")]
    IndexMismatch { expected: usize, found: usize },
    #[error("Sequence already finished")]
    AlreadyFinished,
    #[error("Controller has been disposed")]
    Disposed,
}

/// What `skip()` does on a non-final activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipBehavior {
    /// Terminate the whole sequence
    #[default]
    EndSequence,
    /// Move on to the next activity
    NextActivity,
}

#[derive(Debug, Clone)]
pub struct TimerOptions {
    pub advance_delay: Duration,
    pub warning_threshold_seconds: u32,
    pub skip_behavior: SkipBehavior,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            advance_delay: DEFAULT_ADVANCE_DELAY,
            warning_threshold_seconds: DEFAULT_WARNING_THRESHOLD_SECONDS,
            skip_behavior: SkipBehavior::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerEventKind {
    Started,
    Ticked,
    /// Countdown entered the warning window
    Warning,
    Paused,
    Resumed,
    Advancing,
    Finished,
}

/// Notification delivered to observers after every state mutation
#[derive(Debug, Clone, Serialize)]
pub struct TimerEvent {
    pub kind: TimerEventKind,
    pub snapshot: TimerSnapshot,
}

pub type Observer = Box<dyn Fn(&TimerEvent) + Send>;
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

pub struct PhaseController {
    activities: Vec<Activity>,
    state: TimerState,
    phase: Phase,
    options: TimerOptions,
    /// Generation of the armed tick source, if any
    tick_source: Option<u64>,
    tick_generation: u64,
    disposed: bool,
    haptics: Arc<dyn HapticService>,
    observers: Vec<Observer>,
    on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseController")
            .field("activities", &self.activities.len())
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("tick_source", &self.tick_source)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl PhaseController {
    /// Create a controller over a non-empty sequence whose indices match their positions
    pub fn new(activities: Vec<Activity>, options: TimerOptions) -> Result<Self, TimerError> {
        if activities.is_empty() {
            return Err(TimerError::EmptySequence);
        }
        for (expected, activity) in activities.iter().enumerate() {
            if activity.index != expected {
                return Err(TimerError::IndexMismatch { expected, found: activity.index });
            }
        }

        Ok(Self {
            activities,
            state: TimerState::new(),
            phase: Phase::Idle,
            options,
            tick_source: None,
            tick_generation: 0,
            disposed: false,
            haptics: Arc::new(NoHaptics),
            observers: Vec::new(),
            on_complete: None,
        })
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn HapticService>) -> Self {
        self.haptics = haptics;
        self
    }

    /// Set the callback invoked once when the sequence finishes
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Continue tick-source generations after `base`, so a replacement
    /// controller never reuses a generation its predecessor published
    pub fn with_generation_base(mut self, base: u64) -> Self {
        self.tick_generation = base;
        self
    }

    /// Register an observer called synchronously on every state mutation
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&TimerEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.disposed {
            return Err(TimerError::Disposed);
        }
        if self.phase.is_terminal() {
            return Err(TimerError::AlreadyFinished);
        }
        if self.phase == Phase::Running {
            warn!("start() while running, restarting countdown for activity {}", self.state.current_index);
        }

        let activity = self.current_activity();
        let (timed, seconds) = (activity.is_timed(), activity.initial_seconds());
        self.state.seconds_remaining = seconds;
        self.state.is_running = true;
        self.phase = Phase::Running;

        if timed {
            self.arm_tick_source();
        } else {
            // Rep-based activities wait for a manual advance
            self.tick_source = None;
        }

        info!(
            "Started activity {} ({}) with {}s",
            self.state.current_index,
            self.current_activity().name,
            self.state.seconds_remaining
        );
        self.notify(TimerEventKind::Started);
        Ok(())
    }

    /// One periodic tick from tick source `generation`; ignored unless that
    /// source is the one currently armed
    pub fn tick(&mut self, generation: u64) {
        if self.disposed || self.phase != Phase::Running {
            debug!("Ignoring tick in phase {:?}", self.phase);
            return;
        }
        if self.tick_source != Some(generation) {
            debug!("Ignoring tick from cancelled source {} (armed: {:?})", generation, self.tick_source);
            return;
        }

        if self.state.seconds_remaining > 0 {
            self.state.seconds_remaining -= 1;
            self.notify(TimerEventKind::Ticked);

            let remaining = self.state.seconds_remaining;
            if remaining > 0 && remaining <= self.options.warning_threshold_seconds {
                self.haptics.pulse(HapticIntensity::Light);
                self.notify(TimerEventKind::Warning);
            }
        }

        if self.state.seconds_remaining == 0 {
            self.advance();
        }
    }

    pub fn pause(&mut self) {
        if self.disposed || self.phase != Phase::Running {
            return;
        }
        self.tick_source = None;
        self.state.is_running = false;
        self.phase = Phase::Paused;
        info!("Paused with {}s remaining", self.state.seconds_remaining);
        self.notify(TimerEventKind::Paused);
    }

    pub fn resume(&mut self) {
        if self.disposed || self.phase != Phase::Paused {
            return;
        }
        let timed = self.current_activity().is_timed();
        if timed && self.state.seconds_remaining == 0 {
            debug!("Nothing left to resume");
            return;
        }

        self.state.is_running = true;
        self.phase = Phase::Running;
        if timed {
            self.arm_tick_source();
        }
        info!("Resumed with {}s remaining", self.state.seconds_remaining);
        self.notify(TimerEventKind::Resumed);
    }

    /// Move to the next activity, or finish on the last one
    pub fn advance(&mut self) {
        if self.disposed || self.phase.is_terminal() {
            return;
        }
        self.tick_source = None;

        if self.is_last_activity() {
            self.finish();
            return;
        }

        self.state.current_index += 1;
        self.state.is_running = false;
        self.state.seconds_remaining = 0;
        self.phase = Phase::Advancing;
        info!("Advancing to activity {}", self.state.current_index);
        self.notify(TimerEventKind::Advancing);
    }

    /// Start the next activity once the advance delay has elapsed
    pub fn complete_advance(&mut self) {
        if self.disposed || self.phase != Phase::Advancing {
            return;
        }
        if let Err(e) = self.start() {
            warn!("Failed to start activity {} after advance: {}", self.state.current_index, e);
        }
    }

    pub fn skip(&mut self) {
        if self.disposed || self.phase.is_terminal() {
            return;
        }
        self.tick_source = None;
        match self.options.skip_behavior {
            SkipBehavior::EndSequence => {
                info!("Skipping remaining activities from {}", self.state.current_index);
                self.finish();
            }
            SkipBehavior::NextActivity => {
                info!("Skipping activity {}", self.state.current_index);
                self.advance();
            }
        }
    }

    pub fn finish(&mut self) {
        if self.disposed || self.phase.is_terminal() {
            return;
        }
        self.tick_source = None;
        self.state.is_running = false;
        self.phase = Phase::Finished;
        info!("Sequence finished at activity {}", self.state.current_index);

        self.haptics.pulse(HapticIntensity::Heavy);
        self.notify(TimerEventKind::Finished);
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }

    /// Cancel any tick source; safe to call repeatedly from any state
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.tick_source = None;
        self.state.is_running = false;
        self.disposed = true;
        self.observers.clear();
        debug!("Controller disposed in phase {:?}", self.phase);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn options(&self) -> &TimerOptions {
        &self.options
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn current_activity(&self) -> &Activity {
        &self.activities[self.state.current_index]
    }

    pub fn is_last_activity(&self) -> bool {
        self.state.current_index >= self.activities.len() - 1
    }

    /// Fraction of the sequence reached, in (0, 1]
    pub fn progress(&self) -> f64 {
        (self.state.current_index + 1) as f64 / self.activities.len() as f64
    }

    /// Generation of the armed tick source, if any
    pub fn tick_source(&self) -> Option<u64> {
        self.tick_source
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_source.is_some()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state.clone(),
            phase: self.phase,
            total_activities: self.activities.len(),
            progress: self.progress(),
            is_last_activity: self.is_last_activity(),
            ticking: self.tick_source.is_some(),
            tick_generation: self.tick_generation,
        }
    }

    /// Replace any armed tick source with a fresh one
    fn arm_tick_source(&mut self) {
        self.tick_generation += 1;
        self.tick_source = Some(self.tick_generation);
    }

    fn notify(&self, kind: TimerEventKind) {
        if self.observers.is_empty() {
            return;
        }
        let event = TimerEvent {
            kind,
            snapshot: self.snapshot(),
        };
        for observer in &self.observers {
            observer(&event);
        }
    }
}
