//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::services::{haptics::HapticService, preferences::Preferences};
use super::{
    Activity, PhaseController, PlanDefaults, PlanError, SetError, SetPrescription, SetRecord, SetTracker,
    TimerError, TimerOptions, TimerSnapshot, WorkoutPlan,
};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No active session")]
    NoSession,
    #[error("No exercise is open")]
    NoExercise,
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Sets(#[from] SetError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Failed to lock {0}")]
    Lock(String),
}

/// Main application state holding the active session and its collaborators
pub struct AppState {
    /// Active phase controller, if a session was created
    pub controller: Arc<Mutex<Option<PhaseController>>>,
    /// Set tracker for the currently open exercise
    pub sets: Arc<Mutex<Option<SetTracker>>>,
    pub preferences: Arc<Preferences>,
    pub haptics: Arc<dyn HapticService>,
    pub timer_options: TimerOptions,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// When the current session reached Finished
    pub completed_at: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest controller snapshot, followed by the timer task
    pub timer_update_tx: Arc<watch::Sender<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        timer_options: TimerOptions,
        preferences: Arc<Preferences>,
        haptics: Arc<dyn HapticService>,
    ) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerSnapshot::empty());

        Self {
            controller: Arc::new(Mutex::new(None)),
            sets: Arc::new(Mutex::new(None)),
            preferences,
            haptics,
            timer_options,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            completed_at: Arc::new(Mutex::new(None)),
            timer_update_tx: Arc::new(timer_update_tx),
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Replace any active session with a new one over `activities`
    pub fn create_session(&self, activities: Vec<Activity>) -> Result<TimerSnapshot, SessionError> {
        let completed_at = Arc::clone(&self.completed_at);
        let tx = Arc::clone(&self.timer_update_tx);

        // Publish under the guard so a concurrent action's snapshot is never overwritten
        let mut slot = self.lock_controller()?;
        let generation = slot
            .as_ref()
            .map(|c| c.snapshot().tick_generation)
            .unwrap_or_default()
            .max(self.timer_update_tx.borrow().tick_generation);
        let mut controller = PhaseController::new(activities, self.timer_options.clone())?
            .with_generation_base(generation)
            .with_haptics(Arc::clone(&self.haptics))
            .on_complete(move || {
                info!("Workout sequence complete");
                if let Ok(mut done) = completed_at.lock() {
                    *done = Some(Utc::now());
                }
            });
        controller.subscribe(move |event| {
            tx.send_replace(event.snapshot.clone());
        });

        if let Some(mut previous) = slot.take() {
            info!("Replacing active session");
            previous.dispose();
        }
        if let Ok(mut done) = self.completed_at.lock() {
            *done = None;
        }

        let snapshot = controller.snapshot();
        self.publish(snapshot.clone());
        *slot = Some(controller);
        drop(slot);

        info!("Session created with {} activities", snapshot.total_activities);
        self.record_action("create");
        Ok(snapshot)
    }

    /// Create a session from a workout plan, filling open durations from preferences
    pub fn create_session_from_plan(&self, plan: &WorkoutPlan) -> Result<TimerSnapshot, SessionError> {
        let defaults = PlanDefaults {
            warmup_duration_minutes: self.preferences.warmup_duration_minutes(),
            rest_seconds: self.preferences.rest_seconds(),
        };
        self.create_session(plan.activities(defaults)?)
    }

    /// Apply a user action to the active controller and record it
    pub fn update_session<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, SessionError>
    where
        F: FnOnce(&mut PhaseController) -> Result<(), TimerError>,
    {
        let snapshot = {
            let mut slot = self.lock_controller()?;
            let controller = slot.as_mut().ok_or(SessionError::NoSession)?;
            updater(controller)?;
            controller.snapshot()
        };

        self.record_action(action);
        Ok(snapshot)
    }

    pub fn start(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("start", |c| c.start())
    }

    pub fn pause(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("pause", |c| {
            c.pause();
            Ok(())
        })
    }

    pub fn resume(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("resume", |c| {
            c.resume();
            Ok(())
        })
    }

    pub fn advance(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("advance", |c| {
            c.advance();
            Ok(())
        })
    }

    pub fn skip(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("skip", |c| {
            c.skip();
            Ok(())
        })
    }

    pub fn finish(&self) -> Result<TimerSnapshot, SessionError> {
        self.update_session("finish", |c| {
            c.finish();
            Ok(())
        })
    }

    /// Deliver one periodic tick from tick source `generation` (timer task only)
    pub fn tick(&self, generation: u64) -> Result<(), SessionError> {
        let mut slot = self.lock_controller()?;
        if let Some(controller) = slot.as_mut() {
            controller.tick(generation);
        }
        Ok(())
    }

    /// Start the next activity after the advance delay (timer task only)
    pub fn complete_advance(&self) -> Result<(), SessionError> {
        let mut slot = self.lock_controller()?;
        if let Some(controller) = slot.as_mut() {
            controller.complete_advance();
        }
        Ok(())
    }

    /// Dispose and drop the active session; succeeds when none exists
    pub fn dispose_session(&self) -> Result<(), SessionError> {
        let disposed = {
            let mut slot = self.lock_controller()?;
            let previous = slot.take();
            let generation = previous
                .as_ref()
                .map(|c| c.snapshot().tick_generation)
                .unwrap_or_default()
                .max(self.timer_update_tx.borrow().tick_generation);
            let disposed = previous.is_some();
            if let Some(mut controller) = previous {
                controller.dispose();
            }
            self.publish(TimerSnapshot {
                tick_generation: generation,
                ..TimerSnapshot::empty()
            });
            disposed
        };
        if disposed {
            info!("Session disposed");
            self.record_action("dispose");
        }
        Ok(())
    }

    pub fn get_timer_snapshot(&self) -> Result<TimerSnapshot, SessionError> {
        let slot = self.lock_controller()?;
        Ok(slot.as_ref().map(|c| c.snapshot()).unwrap_or_default())
    }

    /// Snapshot and current activity read under one lock
    pub fn get_session_view(&self) -> Result<(TimerSnapshot, Option<Activity>), SessionError> {
        let slot = self.lock_controller()?;
        Ok(match slot.as_ref() {
            Some(controller) => (controller.snapshot(), Some(controller.current_activity().clone())),
            None => (TimerSnapshot::default(), None),
        })
    }

    pub fn get_completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.lock().ok().and_then(|t| *t)
    }

    /// Open an exercise, replacing the previous tracker
    pub fn open_sets(&self, prescription: &SetPrescription) -> Result<Vec<SetRecord>, SessionError> {
        let tracker = SetTracker::new(prescription)?.with_haptics(Arc::clone(&self.haptics));
        let records = tracker.records().to_vec();
        *self.lock_sets()? = Some(tracker);
        self.record_action("open-sets");
        Ok(records)
    }

    pub fn get_sets(&self) -> Result<(String, Vec<SetRecord>), SessionError> {
        let slot = self.lock_sets()?;
        let tracker = slot.as_ref().ok_or(SessionError::NoExercise)?;
        Ok((tracker.exercise().to_string(), tracker.records().to_vec()))
    }

    pub fn complete_set(&self, set_number: u32, reps: Option<u32>) -> Result<SetRecord, SessionError> {
        let record = {
            let mut slot = self.lock_sets()?;
            let tracker = slot.as_mut().ok_or(SessionError::NoExercise)?;
            tracker.complete_set(set_number, reps)?.clone()
        };
        self.record_action("complete-set");
        Ok(record)
    }

    pub fn set_weight(&self, set_number: u32, weight: f64) -> Result<SetRecord, SessionError> {
        let record = {
            let mut slot = self.lock_sets()?;
            let tracker = slot.as_mut().ok_or(SessionError::NoExercise)?;
            tracker.set_weight(set_number, weight)?.clone()
        };
        self.record_action("set-weight");
        Ok(record)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        self.timer_update_tx.send_replace(snapshot);
    }

    fn lock_controller(&self) -> Result<std::sync::MutexGuard<'_, Option<PhaseController>>, SessionError> {
        self.controller.lock()
            .map_err(|e| SessionError::Lock(format!("controller: {}", e)))
    }

    fn lock_sets(&self) -> Result<std::sync::MutexGuard<'_, Option<SetTracker>>, SessionError> {
        self.sets.lock()
            .map_err(|e| SessionError::Lock(format!("set tracker: {}", e)))
    }
}
