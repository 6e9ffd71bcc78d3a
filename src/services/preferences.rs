//! Local key-value preference store

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::haptics::HapticLevel;

pub const FONT_SCALE: &str = "font_scale";
pub const HAPTIC_LEVEL: &str = "haptic_level";
pub const ACCESSIBILITY_MODE: &str = "accessibility_mode";
pub const AUDIO_DUCKING: &str = "audio_ducking";
pub const WARMUP_DURATION_MINUTES: &str = "warmup_duration_minutes";
pub const REST_SECONDS: &str = "rest_seconds";

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("I/O error accessing preference file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse preference file (JSON): {0}")]
    Json(#[from] serde_json::Error),
    #[error("Preference '{key}' expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("Preference '{key}' must be between {min} and {max}")]
    OutOfRange { key: String, min: i64, max: i64 },
    #[error("Failed to lock preference store: {0}")]
    Lock(String),
}

/// Primitive value stored under a preference key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PreferenceValue {
    fn type_name(&self) -> &'static str {
        match self {
            PreferenceValue::Bool(_) => "boolean",
            PreferenceValue::Int(_) => "integer",
            PreferenceValue::Float(_) => "float",
            PreferenceValue::Text(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PreferenceValue::Float(f) => Some(*f),
            PreferenceValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PreferenceValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Documented default for a known key
pub fn default_for(key: &str) -> Option<PreferenceValue> {
    match key {
        FONT_SCALE => Some(PreferenceValue::Float(1.0)),
        HAPTIC_LEVEL => Some(PreferenceValue::Text("medium".to_string())),
        ACCESSIBILITY_MODE => Some(PreferenceValue::Bool(false)),
        AUDIO_DUCKING => Some(PreferenceValue::Bool(true)),
        WARMUP_DURATION_MINUTES => Some(PreferenceValue::Int(5)),
        REST_SECONDS => Some(PreferenceValue::Int(120)),
        _ => None,
    }
}

/// Accepted range for integer-valued keys
pub fn range_for(key: &str) -> Option<(i64, i64)> {
    match key {
        WARMUP_DURATION_MINUTES => Some((1, 180)),
        REST_SECONDS => Some((0, 3600)),
        _ => None,
    }
}

pub const KNOWN_KEYS: [&str; 6] = [
    FONT_SCALE,
    HAPTIC_LEVEL,
    ACCESSIBILITY_MODE,
    AUDIO_DUCKING,
    WARMUP_DURATION_MINUTES,
    REST_SECONDS,
];

/// Storage backend for preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<PreferenceValue>;
    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError>;
    fn entries(&self) -> BTreeMap<String, PreferenceValue>;
}

/// In-memory store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, PreferenceValue>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.values.lock().ok().and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError> {
        let mut values = self.values.lock()
            .map_err(|e| PreferenceError::Lock(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, PreferenceValue> {
        self.values.lock().map(|values| values.clone()).unwrap_or_default()
    }
}

/// Store backed by a JSON file, rewritten on every successful set
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, PreferenceValue>>,
}

impl JsonPreferenceStore {
    /// Open the store at `path`; a missing file reads as empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!("Preference file {:?} not found, starting empty", path);
            BTreeMap::new()
        };

        info!("Loaded {} preferences from {:?}", values.len(), path);
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, PreferenceValue>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.values.lock().ok().and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError> {
        let mut values = self.values.lock()
            .map_err(|e| PreferenceError::Lock(e.to_string()))?;

        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        // Memory only changes once the file write succeeded
        self.write(&updated)?;
        *values = updated;
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, PreferenceValue> {
        self.values.lock().map(|values| values.clone()).unwrap_or_default()
    }
}

/// Typed accessors over a store with per-setting defaults
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Preferences held only in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferenceStore::new()))
    }

    /// Stored value, or the documented default for known keys
    pub fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.store.get(key).or_else(|| default_for(key))
    }

    /// Store a value, rejecting values of the wrong type or range for known keys
    pub fn set(&self, key: &str, value: PreferenceValue) -> Result<(), PreferenceError> {
        let value = match default_for(key) {
            Some(default) => coerce(key, &default, value)?,
            None => value,
        };
        if let (Some((min, max)), Some(v)) = (range_for(key), value.as_i64()) {
            if !(min..=max).contains(&v) {
                return Err(PreferenceError::OutOfRange { key: key.to_string(), min, max });
            }
        }
        debug!("Setting preference {} = {:?}", key, value);
        self.store.set(key, value)
    }

    /// All known keys with their effective values, plus any extra stored keys
    pub fn all(&self) -> BTreeMap<String, PreferenceValue> {
        let mut all = self.store.entries();
        for key in KNOWN_KEYS {
            if !all.contains_key(key) {
                if let Some(default) = default_for(key) {
                    all.insert(key.to_string(), default);
                }
            }
        }
        all
    }

    pub fn font_scale(&self) -> f64 {
        self.store.get(FONT_SCALE).and_then(|v| v.as_f64()).unwrap_or(1.0)
    }

    pub fn haptic_level(&self) -> HapticLevel {
        match self.store.get(HAPTIC_LEVEL).and_then(|v| v.as_str().map(str::to_string)) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to medium", e);
                HapticLevel::Medium
            }),
            None => HapticLevel::Medium,
        }
    }

    pub fn accessibility_mode(&self) -> bool {
        self.store.get(ACCESSIBILITY_MODE).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn audio_ducking(&self) -> bool {
        self.store.get(AUDIO_DUCKING).and_then(|v| v.as_bool()).unwrap_or(true)
    }

    pub fn warmup_duration_minutes(&self) -> u32 {
        self.bounded(WARMUP_DURATION_MINUTES, 5)
    }

    pub fn rest_seconds(&self) -> u32 {
        self.bounded(REST_SECONDS, 120)
    }

    /// Integer value for `key`; values edited into the file outside the range read as the default
    fn bounded(&self, key: &str, default: u32) -> u32 {
        let (min, max) = range_for(key).unwrap_or((0, i64::from(u32::MAX)));
        match self.store.get(key).and_then(|v| v.as_i64()) {
            Some(v) if (min..=max).contains(&v) => u32::try_from(v).unwrap_or(default),
            Some(v) => {
                warn!("Ignoring out-of-range {} = {}", key, v);
                default
            }
            None => default,
        }
    }
}

fn coerce(
    key: &str,
    default: &PreferenceValue,
    value: PreferenceValue,
) -> Result<PreferenceValue, PreferenceError> {
    let mismatch = || PreferenceError::TypeMismatch {
        key: key.to_string(),
        expected: default.type_name(),
    };

    match (default, value) {
        (PreferenceValue::Float(_), PreferenceValue::Int(i)) => Ok(PreferenceValue::Float(i as f64)),
        (PreferenceValue::Text(_), PreferenceValue::Text(s)) if key == HAPTIC_LEVEL => {
            s.parse::<HapticLevel>().map_err(|_| mismatch())?;
            Ok(PreferenceValue::Text(s.to_lowercase()))
        }
        (default, value) if std::mem::discriminant(default) == std::mem::discriminant(&value) => Ok(value),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.font_scale(), 1.0);
        assert_eq!(prefs.haptic_level(), HapticLevel::Medium);
        assert_eq!(prefs.warmup_duration_minutes(), 5);
        assert_eq!(prefs.rest_seconds(), 120);
        assert!(!prefs.accessibility_mode());
        assert_eq!(prefs.get("unknown"), None);
    }

    #[test]
    fn stored_values_override_defaults() {
        let prefs = Preferences::in_memory();
        prefs.set(REST_SECONDS, PreferenceValue::Int(90)).unwrap();
        prefs.set(HAPTIC_LEVEL, PreferenceValue::Text("Heavy".into())).unwrap();
        prefs.set(FONT_SCALE, PreferenceValue::Int(2)).unwrap();

        assert_eq!(prefs.rest_seconds(), 90);
        assert_eq!(prefs.haptic_level(), HapticLevel::Heavy);
        assert_eq!(prefs.font_scale(), 2.0);
    }

    #[test]
    fn wrong_type_for_known_key_is_rejected() {
        let prefs = Preferences::in_memory();
        let err = prefs.set(ACCESSIBILITY_MODE, PreferenceValue::Text("yes".into())).unwrap_err();
        assert!(matches!(err, PreferenceError::TypeMismatch { .. }));

        let err = prefs.set(HAPTIC_LEVEL, PreferenceValue::Text("buzz".into())).unwrap_err();
        assert!(matches!(err, PreferenceError::TypeMismatch { .. }));
        assert!(!prefs.accessibility_mode());
    }

    #[test]
    fn durations_outside_their_range_are_rejected() {
        let prefs = Preferences::in_memory();
        for (key, value) in [
            (WARMUP_DURATION_MINUTES, 100_000_000),
            (WARMUP_DURATION_MINUTES, 0),
            (REST_SECONDS, -30),
            (REST_SECONDS, 3601),
        ] {
            let err = prefs.set(key, PreferenceValue::Int(value)).unwrap_err();
            assert!(matches!(err, PreferenceError::OutOfRange { .. }), "{} = {}", key, value);
        }
        assert_eq!(prefs.warmup_duration_minutes(), 5);
        assert_eq!(prefs.rest_seconds(), 120);

        prefs.set(WARMUP_DURATION_MINUTES, PreferenceValue::Int(180)).unwrap();
        prefs.set(REST_SECONDS, PreferenceValue::Int(0)).unwrap();
        assert_eq!(prefs.warmup_duration_minutes(), 180);
        assert_eq!(prefs.rest_seconds(), 0);
    }

    #[test]
    fn unknown_keys_are_stored_as_given() {
        let prefs = Preferences::in_memory();
        prefs.set("sound_type", PreferenceValue::Text("bell".into())).unwrap();
        assert_eq!(prefs.get("sound_type"), Some(PreferenceValue::Text("bell".into())));
        assert!(prefs.all().contains_key(REST_SECONDS));
        assert!(prefs.all().contains_key("sound_type"));
    }

    #[test]
    fn untagged_values_deserialize_to_narrowest_type() {
        let v: PreferenceValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, PreferenceValue::Int(3));
        let v: PreferenceValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, PreferenceValue::Float(1.5));
        let v: PreferenceValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, PreferenceValue::Bool(true));
    }
}
