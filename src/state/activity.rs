//! Activity definitions for a timed workout sequence

use serde::{Deserialize, Serialize};

/// What an activity represents within a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    WarmupExercise,
    WorkingSet,
    RestPeriod,
}

/// One timed or countable step in a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Position in the sequence, 0-based
    pub index: usize,
    /// Display label, usually the exercise name
    pub name: String,
    pub kind: ActivityKind,
    /// Nominal duration; absent for rep-based sets
    pub duration_seconds: Option<u32>,
}

impl Activity {
    /// Create a time-based activity
    pub fn timed(index: usize, kind: ActivityKind, name: impl Into<String>, seconds: u32) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
            duration_seconds: Some(seconds),
        }
    }

    /// Create a rep-based activity with no countdown
    pub fn untimed(index: usize, kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
            duration_seconds: None,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.duration_seconds.is_some()
    }

    /// Seconds the countdown starts from (0 for untimed activities)
    pub fn initial_seconds(&self) -> u32 {
        self.duration_seconds.unwrap_or(0)
    }
}

/// Activity description without an index, as received from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub name: String,
    pub kind: ActivityKind,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

/// Assign stable indices to requested activities by their position
pub fn index_activities(requests: Vec<ActivityRequest>) -> Vec<Activity> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, req)| Activity {
            index,
            name: req.name,
            kind: req.kind,
            duration_seconds: req.duration_seconds,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&ActivityKind::WarmupExercise).unwrap();
        assert_eq!(json, "\"warmup-exercise\"");

        let kind: ActivityKind = serde_json::from_str("\"rest-period\"").unwrap();
        assert_eq!(kind, ActivityKind::RestPeriod);
    }

    #[test]
    fn indices_follow_request_order() {
        let requests = vec![
            ActivityRequest { name: "Jumping jacks".into(), kind: ActivityKind::WarmupExercise, duration_seconds: Some(30) },
            ActivityRequest { name: "Squat".into(), kind: ActivityKind::WorkingSet, duration_seconds: None },
        ];

        let activities = index_activities(requests);
        assert_eq!(activities[0].index, 0);
        assert_eq!(activities[1].index, 1);
        assert!(activities[0].is_timed());
        assert_eq!(activities[1].initial_seconds(), 0);
    }
}
