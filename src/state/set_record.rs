//! Per-set tracking for a single exercise

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::services::haptics::{HapticIntensity, HapticService, NoHaptics};

/// Most sets a single exercise may have
pub const MAX_SETS: u32 = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetError {
    #[error("Exercise must have at least one set")]
    NoSets,
    #[error("Exercise may have at most {max} sets")]
    TooManySets { max: u32 },
    #[error("Invalid rep range {min}-{max}")]
    InvalidRepRange { min: u32, max: u32 },
    #[error("Set {0} does not exist")]
    UnknownSet(u32),
    #[error("Weight must be a non-negative number, got {0}")]
    InvalidWeight(f64),
}

/// Tracking record for one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// 1-based position within the exercise
    pub set_number: u32,
    pub is_warmup: bool,
    pub weight: Option<f64>,
    pub rep_range: String,
    pub actual_reps: Option<u32>,
    pub is_completed: bool,
}

/// Prescription used to open a tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPrescription {
    pub exercise: String,
    #[serde(default)]
    pub warmup_sets: u32,
    pub working_sets: u32,
    pub min_reps: u32,
    pub max_reps: u32,
}

/// Format a prescribed rep range, collapsing equal bounds
pub fn rep_range(min: u32, max: u32) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    }
}

/// Set records for one open exercise
pub struct SetTracker {
    exercise: String,
    records: Vec<SetRecord>,
    haptics: Arc<dyn HapticService>,
}

impl SetTracker {
    /// Create warmup sets followed by working sets
    pub fn new(prescription: &SetPrescription) -> Result<Self, SetError> {
        let total = prescription.warmup_sets
            .checked_add(prescription.working_sets)
            .filter(|&total| total <= MAX_SETS)
            .ok_or(SetError::TooManySets { max: MAX_SETS })?;
        if total == 0 {
            return Err(SetError::NoSets);
        }
        if prescription.min_reps == 0 || prescription.min_reps > prescription.max_reps {
            return Err(SetError::InvalidRepRange {
                min: prescription.min_reps,
                max: prescription.max_reps,
            });
        }

        let range = rep_range(prescription.min_reps, prescription.max_reps);
        let records = (1..=total)
            .map(|set_number| SetRecord {
                set_number,
                is_warmup: set_number <= prescription.warmup_sets,
                weight: None,
                rep_range: range.clone(),
                actual_reps: None,
                is_completed: false,
            })
            .collect();

        debug!(
            "Opened {} with {} warmup and {} working sets",
            prescription.exercise, prescription.warmup_sets, prescription.working_sets
        );
        Ok(Self {
            exercise: prescription.exercise.clone(),
            records,
            haptics: Arc::new(NoHaptics),
        })
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn HapticService>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    pub fn records(&self) -> &[SetRecord] {
        &self.records
    }

    pub fn set_weight(&mut self, set_number: u32, weight: f64) -> Result<&SetRecord, SetError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(SetError::InvalidWeight(weight));
        }
        let record = self.record_mut(set_number)?;
        record.weight = Some(weight);
        Ok(record)
    }

    /// Mark a set completed; completing an already completed set changes nothing
    pub fn complete_set(&mut self, set_number: u32, reps: Option<u32>) -> Result<&SetRecord, SetError> {
        let haptics = Arc::clone(&self.haptics);
        let exercise = self.exercise.clone();
        let record = self.record_mut(set_number)?;
        if record.is_completed {
            debug!("Set {} of {} already completed", set_number, exercise);
            return Ok(record);
        }

        record.is_completed = true;
        record.actual_reps = reps;
        info!("Completed set {} of {} ({:?} reps)", set_number, exercise, reps);
        haptics.pulse(HapticIntensity::Medium);
        Ok(record)
    }

    pub fn completed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_completed).count()
    }

    /// First set not yet completed
    pub fn next_incomplete(&self) -> Option<&SetRecord> {
        self.records.iter().find(|r| !r.is_completed)
    }

    pub fn is_complete(&self) -> bool {
        self.records.iter().all(|r| r.is_completed)
    }

    fn record_mut(&mut self, set_number: u32) -> Result<&mut SetRecord, SetError> {
        self.records
            .iter_mut()
            .find(|r| r.set_number == set_number)
            .ok_or(SetError::UnknownSet(set_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prescription(warmup_sets: u32, working_sets: u32) -> SetPrescription {
        SetPrescription {
            exercise: "Bench press".to_string(),
            warmup_sets,
            working_sets,
            min_reps: 8,
            max_reps: 12,
        }
    }

    #[test]
    fn builds_warmup_then_working_sets() {
        let tracker = SetTracker::new(&prescription(2, 3)).unwrap();
        let records = tracker.records();
        assert_eq!(records.len(), 5);
        assert!(records[0].is_warmup && records[1].is_warmup);
        assert!(!records[2].is_warmup);
        assert_eq!(records[4].set_number, 5);
        assert!(records.iter().all(|r| r.rep_range == "8-12" && !r.is_completed));
    }

    #[test]
    fn equal_rep_bounds_collapse() {
        assert_eq!(rep_range(5, 5), "5");
        assert_eq!(rep_range(6, 10), "6-10");
    }

    #[test]
    fn rejects_empty_or_inverted_prescriptions() {
        assert!(matches!(SetTracker::new(&prescription(0, 0)), Err(SetError::NoSets)));

        let mut bad = prescription(0, 3);
        bad.min_reps = 12;
        bad.max_reps = 8;
        assert!(matches!(SetTracker::new(&bad), Err(SetError::InvalidRepRange { .. })));
    }

    #[test]
    fn oversized_prescriptions_are_rejected() {
        let overflowing = prescription(u32::MAX, 1);
        assert!(matches!(SetTracker::new(&overflowing), Err(SetError::TooManySets { max: MAX_SETS })));

        let huge = prescription(0, 4_000_000_000);
        assert!(matches!(SetTracker::new(&huge), Err(SetError::TooManySets { .. })));

        let at_limit = prescription(10, MAX_SETS - 10);
        assert_eq!(SetTracker::new(&at_limit).unwrap().records().len(), MAX_SETS as usize);
    }

    #[test]
    fn completion_is_one_way() {
        let mut tracker = SetTracker::new(&prescription(1, 2)).unwrap();
        tracker.complete_set(2, Some(10)).unwrap();
        let record = tracker.complete_set(2, Some(3)).unwrap();
        assert!(record.is_completed);
        assert_eq!(record.actual_reps, Some(10));
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.next_incomplete().map(|r| r.set_number), Some(1));
        assert!(!tracker.is_complete());
    }

    #[test]
    fn weight_updates_and_validation() {
        let mut tracker = SetTracker::new(&prescription(0, 2)).unwrap();
        assert_eq!(tracker.set_weight(1, 60.0).unwrap().weight, Some(60.0));
        assert_eq!(tracker.set_weight(1, -1.0), Err(SetError::InvalidWeight(-1.0)));
        assert_eq!(tracker.set_weight(9, 10.0), Err(SetError::UnknownSet(9)));
        assert_eq!(tracker.complete_set(9, None), Err(SetError::UnknownSet(9)));
    }
}
