use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "salary-predictor",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Artifacts are loaded before the listener binds, so a running server is ready
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let encoders = &state.predictor.artifacts().encoders;
    (StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "salary-predictor",
        "features": state.predictor.artifacts().model.feature_names().len(),
        "countries": encoders.country.len(),
        "active_sessions": state.sessions.len(),
        "oldest_session_started_at": state
            .sessions
            .oldest_started_at()
            .map(|started| started.to_rfc3339()),
    })))
}
