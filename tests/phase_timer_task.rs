use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

use phase_timer::{
    services::{NoHaptics, Preferences},
    state::{Activity, ActivityKind, AppState, Phase, TimerOptions},
    tasks::phase_timer_task,
};

fn app_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        TimerOptions::default(),
        Arc::new(Preferences::in_memory()),
        Arc::new(NoHaptics),
    ))
}

fn sequence(durations: &[u32]) -> Vec<Activity> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &secs)| Activity::timed(i, ActivityKind::WarmupExercise, format!("warmup {}", i), secs))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn countdown_advances_and_restarts_after_delay() {
    let state = app_state();
    state.create_session(sequence(&[30, 45, 20])).unwrap();
    tokio::spawn(phase_timer_task(Arc::clone(&state)));

    state.start().unwrap();
    sleep(Duration::from_millis(29_500)).await;
    let snapshot = state.get_timer_snapshot().unwrap();
    assert_eq!(snapshot.state.current_index, 0);
    assert_eq!(snapshot.state.seconds_remaining, 1);

    // Inside the advance delay
    sleep(Duration::from_millis(600)).await;
    let snapshot = state.get_timer_snapshot().unwrap();
    assert_eq!(snapshot.phase, Phase::Advancing);
    assert_eq!(snapshot.state.current_index, 1);
    assert!(!snapshot.state.is_running);

    sleep(Duration::from_millis(400)).await;
    let snapshot = state.get_timer_snapshot().unwrap();
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.state.seconds_remaining, 45);
    assert!(snapshot.state.is_running);
}

#[tokio::test(start_paused = true)]
async fn paused_countdown_stays_frozen() {
    let state = app_state();
    state.create_session(sequence(&[30, 45, 20])).unwrap();
    tokio::spawn(phase_timer_task(Arc::clone(&state)));

    state.start().unwrap();
    sleep(Duration::from_millis(10_500)).await;
    let paused = state.pause().unwrap();
    assert_eq!(paused.state.seconds_remaining, 20);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(state.get_timer_snapshot().unwrap().state.seconds_remaining, 20);

    let resumed = state.resume().unwrap();
    assert!(resumed.state.is_running);
    assert_eq!(resumed.state.seconds_remaining, 20);

    sleep(Duration::from_millis(1_200)).await;
    assert_eq!(state.get_timer_snapshot().unwrap().state.seconds_remaining, 19);
}

#[tokio::test(start_paused = true)]
async fn restart_keeps_a_single_tick_source() {
    let state = app_state();
    state.create_session(sequence(&[30, 45])).unwrap();
    tokio::spawn(phase_timer_task(Arc::clone(&state)));

    state.start().unwrap();
    sleep(Duration::from_millis(5_500)).await;
    state.start().unwrap();

    // A leaked tick source would double the rate
    sleep(Duration::from_millis(4_200)).await;
    assert_eq!(state.get_timer_snapshot().unwrap().state.seconds_remaining, 26);
}

#[tokio::test(start_paused = true)]
async fn last_activity_finishes_once_and_stops_ticking() {
    let state = app_state();
    state.create_session(sequence(&[2])).unwrap();
    tokio::spawn(phase_timer_task(Arc::clone(&state)));

    state.start().unwrap();
    sleep(Duration::from_millis(2_500)).await;
    let snapshot = state.get_timer_snapshot().unwrap();
    assert_eq!(snapshot.phase, Phase::Finished);
    assert!(!snapshot.ticking);
    let completed_at = state.get_completed_at();
    assert!(completed_at.is_some());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(state.get_completed_at(), completed_at);
}

#[tokio::test(start_paused = true)]
async fn disposed_session_is_replaced_cleanly() {
    let state = app_state();
    state.create_session(sequence(&[30])).unwrap();
    tokio::spawn(phase_timer_task(Arc::clone(&state)));

    state.start().unwrap();
    sleep(Duration::from_millis(2_500)).await;
    state.dispose_session().unwrap();
    state.dispose_session().unwrap();
    assert_eq!(state.get_timer_snapshot().unwrap().phase, Phase::Idle);

    state.create_session(sequence(&[10])).unwrap();
    state.start().unwrap();
    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(state.get_timer_snapshot().unwrap().state.seconds_remaining, 7);
}
