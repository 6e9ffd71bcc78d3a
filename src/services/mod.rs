//! External collaborator module
//! 
//! Haptic feedback and the local preference store, injected into the
//! controller and application state rather than reached through globals.

pub mod haptics;
pub mod preferences;

// Re-export main types
pub use haptics::{HapticIntensity, HapticLevel, HapticService, NoHaptics, TracingHaptics};
pub use preferences::{
    JsonPreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore, PreferenceValue,
    Preferences,
};
