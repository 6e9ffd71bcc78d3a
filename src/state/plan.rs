//! Expansion of a workout plan into an activity sequence

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Activity, ActivityKind};

/// Most activities a plan may expand into
pub const MAX_PLAN_ACTIVITIES: usize = 500;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Plan expands to more than {max} activities")]
    TooManyActivities { max: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupItem {
    pub name: String,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub name: String,
    pub working_sets: u32,
    /// Rest between sets; the preference value is used when absent
    #[serde(default)]
    pub rest_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub warmups: Vec<WarmupItem>,
    #[serde(default)]
    pub exercises: Vec<ExercisePlan>,
}

/// Defaults applied to plan items that leave durations open
#[derive(Debug, Clone, Copy)]
pub struct PlanDefaults {
    pub warmup_duration_minutes: u32,
    pub rest_seconds: u32,
}

impl WorkoutPlan {
    /// Build the activity sequence: warmups, then each exercise's sets with rests between them
    pub fn activities(&self, defaults: PlanDefaults) -> Result<Vec<Activity>, PlanError> {
        let total_sets: u64 = self.exercises.iter().map(|e| u64::from(e.working_sets)).sum();
        // Every set but the last is followed by a rest
        let expected = (self.warmups.len() as u64)
            .saturating_add(total_sets.saturating_mul(2).saturating_sub(1));
        if expected > MAX_PLAN_ACTIVITIES as u64 {
            return Err(PlanError::TooManyActivities { max: MAX_PLAN_ACTIVITIES });
        }

        let mut activities = Vec::with_capacity(expected as usize);

        let open_warmups = self.warmups.iter().filter(|w| w.duration_seconds.is_none()).count() as u32;
        let share = if open_warmups > 0 {
            defaults.warmup_duration_minutes.saturating_mul(60) / open_warmups
        } else {
            0
        };
        for warmup in &self.warmups {
            let seconds = warmup.duration_seconds.unwrap_or(share);
            activities.push(Activity::timed(activities.len(), ActivityKind::WarmupExercise, &warmup.name, seconds));
        }

        let mut sets_seen = 0;
        for exercise in &self.exercises {
            let rest = exercise.rest_seconds.unwrap_or(defaults.rest_seconds);
            for set in 1..=exercise.working_sets {
                sets_seen += 1;
                activities.push(Activity::untimed(
                    activities.len(),
                    ActivityKind::WorkingSet,
                    format!("{} set {}", exercise.name, set),
                ));
                if sets_seen < total_sets {
                    activities.push(Activity::timed(activities.len(), ActivityKind::RestPeriod, "Rest", rest));
                }
            }
        }

        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: PlanDefaults = PlanDefaults {
        warmup_duration_minutes: 5,
        rest_seconds: 120,
    };

    #[test]
    fn open_warmups_share_the_default_duration() {
        let plan = WorkoutPlan {
            warmups: vec![
                WarmupItem { name: "Arm circles".into(), duration_seconds: None },
                WarmupItem { name: "Jog".into(), duration_seconds: Some(90) },
                WarmupItem { name: "Leg swings".into(), duration_seconds: None },
            ],
            exercises: Vec::new(),
        };

        let activities = plan.activities(DEFAULTS).unwrap();
        let durations: Vec<_> = activities.iter().map(|a| a.duration_seconds).collect();
        assert_eq!(durations, vec![Some(150), Some(90), Some(150)]);
    }

    #[test]
    fn sets_are_separated_by_rests_without_trailing_rest() {
        let plan = WorkoutPlan {
            warmups: vec![WarmupItem { name: "Jog".into(), duration_seconds: Some(60) }],
            exercises: vec![
                ExercisePlan { name: "Squat".into(), working_sets: 2, rest_seconds: Some(90) },
                ExercisePlan { name: "Row".into(), working_sets: 1, rest_seconds: None },
            ],
        };

        let activities = plan.activities(DEFAULTS).unwrap();
        let kinds: Vec<_> = activities.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::WarmupExercise,
                ActivityKind::WorkingSet,
                ActivityKind::RestPeriod,
                ActivityKind::WorkingSet,
                ActivityKind::RestPeriod,
                ActivityKind::WorkingSet,
            ]
        );
        assert_eq!(activities[2].duration_seconds, Some(90));
        assert_eq!(activities[4].duration_seconds, Some(90));
        assert!(activities.iter().enumerate().all(|(i, a)| a.index == i));
    }

    #[test]
    fn huge_plans_are_rejected_without_overflow() {
        let plan = WorkoutPlan {
            warmups: vec![WarmupItem { name: "Jog".into(), duration_seconds: None }],
            exercises: vec![
                ExercisePlan { name: "Squat".into(), working_sets: u32::MAX, rest_seconds: None },
                ExercisePlan { name: "Row".into(), working_sets: u32::MAX, rest_seconds: None },
            ],
        };
        assert_eq!(
            plan.activities(DEFAULTS),
            Err(PlanError::TooManyActivities { max: MAX_PLAN_ACTIVITIES })
        );
    }

    #[test]
    fn oversized_warmup_default_saturates() {
        let plan = WorkoutPlan {
            warmups: vec![WarmupItem { name: "Jog".into(), duration_seconds: None }],
            exercises: Vec::new(),
        };
        let defaults = PlanDefaults { warmup_duration_minutes: 100_000_000, rest_seconds: 120 };
        let activities = plan.activities(defaults).unwrap();
        assert_eq!(activities[0].duration_seconds, Some(u32::MAX));
    }
}
