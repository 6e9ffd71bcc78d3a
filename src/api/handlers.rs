//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    services::PreferenceError,
    state::{
        index_activities, AppState, SessionError, SetPrescription, SetRecord, TimerError,
        TimerSnapshot, WorkoutPlan,
    },
};
use super::responses::{
    ApiResponse, CompleteSetRequest, ErrorResponse, HealthResponse, PreferenceRequest,
    PreferencesResponse, SessionRequest, SetsResponse, StatusResponse, WeightRequest,
};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a session error onto an HTTP status with an error body
fn session_error(e: SessionError) -> ApiError {
    let status = match &e {
        SessionError::NoSession | SessionError::NoExercise => StatusCode::NOT_FOUND,
        SessionError::Timer(TimerError::EmptySequence | TimerError::IndexMismatch { .. }) => {
            StatusCode::BAD_REQUEST
        }
        SessionError::Timer(TimerError::AlreadyFinished | TimerError::Disposed) => StatusCode::CONFLICT,
        SessionError::Sets(_) | SessionError::Plan(_) => StatusCode::BAD_REQUEST,
        SessionError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Session operation failed: {}", e);
    } else {
        warn!("Session operation rejected: {}", e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn preference_error(e: PreferenceError) -> ApiError {
    let status = match &e {
        PreferenceError::TypeMismatch { .. } | PreferenceError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Preference update failed: {}", e);
    } else {
        warn!("Preference update rejected: {}", e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn reply(result: Result<TimerSnapshot, SessionError>, message: &str) -> Result<Json<ApiResponse>, ApiError> {
    let timer = result.map_err(session_error)?;
    Ok(Json(ApiResponse::ok(message.to_string(), timer)))
}

/// Handle POST /session - Create a session from explicit activities
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let activities = index_activities(request.activities);
    info!("Creating session with {} activities", activities.len());
    reply(state.create_session(activities), "Session created")
}

/// Handle POST /session/plan - Create a session from a workout plan
pub async fn create_plan_session_handler(
    State(state): State<Arc<AppState>>,
    Json(plan): Json<WorkoutPlan>,
) -> Result<Json<ApiResponse>, ApiError> {
    info!(
        "Creating session from plan with {} warmups and {} exercises",
        plan.warmups.len(),
        plan.exercises.len()
    );
    reply(state.create_session_from_plan(&plan), "Session created from plan")
}

/// Handle DELETE /session - Dispose the active session
pub async fn dispose_session_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.dispose_session().map_err(session_error)?;
    Ok(Json(ApiResponse::ok("Session disposed".to_string(), TimerSnapshot::empty())))
}

/// Handle POST /session/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.start(), "Timer started")
}

/// Handle POST /session/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.pause(), "Timer paused")
}

/// Handle POST /session/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.resume(), "Timer resumed")
}

/// Handle POST /session/advance
pub async fn advance_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.advance(), "Advanced")
}

/// Handle POST /session/skip
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.skip(), "Skipped")
}

/// Handle POST /session/finish
pub async fn finish_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    reply(state.finish(), "Finished")
}

/// Handle GET /status - Return current timer and session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let (timer, current_activity) = state.get_session_view().map_err(session_error)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        current_activity,
        completed_at: state.get_completed_at(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle POST /sets - Open an exercise for set tracking
pub async fn open_sets_handler(
    State(state): State<Arc<AppState>>,
    Json(prescription): Json<SetPrescription>,
) -> Result<Json<SetsResponse>, ApiError> {
    let sets = state.open_sets(&prescription).map_err(session_error)?;
    info!("Opened {} for set tracking", prescription.exercise);
    Ok(Json(SetsResponse {
        exercise: prescription.exercise,
        sets,
    }))
}

/// Handle GET /sets
pub async fn get_sets_handler(State(state): State<Arc<AppState>>) -> Result<Json<SetsResponse>, ApiError> {
    let (exercise, sets) = state.get_sets().map_err(session_error)?;
    Ok(Json(SetsResponse { exercise, sets }))
}

/// Handle POST /sets/:set_number/complete
pub async fn complete_set_handler(
    State(state): State<Arc<AppState>>,
    Path(set_number): Path<u32>,
    body: Option<Json<CompleteSetRequest>>,
) -> Result<Json<SetRecord>, ApiError> {
    let reps = body.and_then(|Json(request)| request.reps);
    let record = state.complete_set(set_number, reps).map_err(session_error)?;
    Ok(Json(record))
}

/// Handle PUT /sets/:set_number/weight
pub async fn set_weight_handler(
    State(state): State<Arc<AppState>>,
    Path(set_number): Path<u32>,
    Json(request): Json<WeightRequest>,
) -> Result<Json<SetRecord>, ApiError> {
    let record = state.set_weight(set_number, request.weight).map_err(session_error)?;
    Ok(Json(record))
}

/// Handle GET /preferences
pub async fn get_preferences_handler(State(state): State<Arc<AppState>>) -> Json<PreferencesResponse> {
    Json(PreferencesResponse {
        preferences: state.preferences.all(),
    })
}

/// Handle PUT /preferences/:key
pub async fn set_preference_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<PreferenceRequest>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    state.preferences.set(&key, request.value).map_err(preference_error)?;
    info!("Preference {} updated", key);
    Ok(Json(PreferencesResponse {
        preferences: state.preferences.all(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
