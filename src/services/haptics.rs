//! Haptic feedback service

use std::{fmt, str::FromStr, sync::Arc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::preferences::Preferences;

/// Strength of a single haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticIntensity {
    Light,
    Medium,
    Heavy,
}

/// User-selected haptic level, stored as a preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticLevel {
    Off,
    Light,
    Medium,
    Heavy,
}

impl HapticLevel {
    /// Intensity actually delivered at this level: pulses stronger than the
    /// level are downgraded to it, and nothing is delivered when off
    pub fn cap(&self, intensity: HapticIntensity) -> Option<HapticIntensity> {
        let max = match self {
            HapticLevel::Off => return None,
            HapticLevel::Light => HapticIntensity::Light,
            HapticLevel::Medium => HapticIntensity::Medium,
            HapticLevel::Heavy => HapticIntensity::Heavy,
        };
        Some(intensity.min(max))
    }
}

impl FromStr for HapticLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(HapticLevel::Off),
            "light" => Ok(HapticLevel::Light),
            "medium" => Ok(HapticLevel::Medium),
            "heavy" => Ok(HapticLevel::Heavy),
            other => Err(format!("Unknown haptic level: {}", other)),
        }
    }
}

impl fmt::Display for HapticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HapticLevel::Off => "off",
            HapticLevel::Light => "light",
            HapticLevel::Medium => "medium",
            HapticLevel::Heavy => "heavy",
        };
        f.write_str(s)
    }
}

/// Fire-and-forget haptic pulses
pub trait HapticService: Send + Sync {
    fn pulse(&self, intensity: HapticIntensity);
}

/// Discards every pulse
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticService for NoHaptics {
    fn pulse(&self, _intensity: HapticIntensity) {}
}

/// Emits pulses as tracing events, capped by the `haptic_level` preference
pub struct TracingHaptics {
    preferences: Arc<Preferences>,
}

impl TracingHaptics {
    pub fn new(preferences: Arc<Preferences>) -> Self {
        Self { preferences }
    }
}

impl HapticService for TracingHaptics {
    fn pulse(&self, intensity: HapticIntensity) {
        let level = self.preferences.haptic_level();
        match level.cap(intensity) {
            Some(delivered) if delivered != intensity => {
                info!("Haptic pulse: {:?} (requested {:?}, level {})", delivered, intensity, level);
            }
            Some(delivered) => info!("Haptic pulse: {:?}", delivered),
            None => debug!("Haptic pulse {:?} suppressed, haptics off", intensity),
        }
    }
}
