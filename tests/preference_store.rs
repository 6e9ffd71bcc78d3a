use std::sync::Arc;

use phase_timer::services::{
    haptics::HapticLevel, JsonPreferenceStore, PreferenceError, PreferenceStore, PreferenceValue,
    Preferences,
};

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonPreferenceStore::open(dir.path().join("prefs.json")).unwrap();
    assert!(store.entries().is_empty());
    assert_eq!(store.get("font_scale"), None);
}

#[test]
fn values_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prefs.json");

    {
        let prefs = Preferences::new(Arc::new(JsonPreferenceStore::open(&path).unwrap()));
        prefs.set("haptic_level", PreferenceValue::Text("light".into())).unwrap();
        prefs.set("warmup_duration_minutes", PreferenceValue::Int(8)).unwrap();
    }

    let prefs = Preferences::new(Arc::new(JsonPreferenceStore::open(&path).unwrap()));
    assert_eq!(prefs.haptic_level(), HapticLevel::Light);
    assert_eq!(prefs.warmup_duration_minutes(), 8);
    assert_eq!(prefs.rest_seconds(), 120);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonPreferenceStore::open(&path).unwrap_err();
    assert!(matches!(err, PreferenceError::Json(_)));
}

#[test]
fn hand_edited_out_of_range_values_read_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r#"{ "warmup_duration_minutes": 100000000, "rest_seconds": -5 }"#).unwrap();

    let prefs = Preferences::new(Arc::new(JsonPreferenceStore::open(&path).unwrap()));
    assert_eq!(prefs.warmup_duration_minutes(), 5);
    assert_eq!(prefs.rest_seconds(), 120);
}
