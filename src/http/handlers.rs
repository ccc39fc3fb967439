use super::state::AppState;
use crate::error::ScribeError;
use crate::session::EncounterStats;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub stats: EncounterStats,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub note: Option<crate::notes::DraftedNote>,
    pub facts: Option<crate::notes::ClinicalFacts>,
    pub generation_notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map domain errors onto HTTP status codes
fn error_response(err: ScribeError) -> axum::response::Response {
    let status = match &err {
        ScribeError::CaptureUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ScribeError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ScribeError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!("Request failed: {}", err);

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /encounters/record/start
/// Start recording an encounter
pub async fn start_recording(
    State(state): State<AppState>,
    Json(req): Json<StartRecordingRequest>,
) -> impl IntoResponse {
    match state.manager.start_recording(req.session_id).await {
        Ok(session_id) => (
            StatusCode::OK,
            Json(RecordingResponse {
                session_id,
                status: "active".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /encounters/record/pause
pub async fn pause_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.pause_recording().await {
        Ok(session_id) => (
            StatusCode::OK,
            Json(RecordingResponse {
                session_id,
                status: "paused".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /encounters/record/resume
pub async fn resume_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.resume_recording().await {
        Ok(session_id) => (
            StatusCode::OK,
            Json(RecordingResponse {
                session_id,
                status: "active".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /encounters/record/stop
/// Stop the active recording and finalize the session
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.stop_recording().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StopRecordingResponse {
                session_id: stats.session_id.clone(),
                status: "completed".to_string(),
                stats,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /encounters/:session_id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.stats(&session_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /encounters/:session_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.transcript(&session_id).await {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /encounters/:session_id/note
/// Generated documentation for a session
pub async fn get_note(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.session(&session_id).await {
        Ok(session) => (
            StatusCode::OK,
            Json(NoteResponse {
                note: session.note,
                facts: session.facts,
                generation_notice: session.generation_notice,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /encounters/:session_id/view
/// Switch the viewed session
pub async fn view_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.view_session(&session_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /encounters/:session_id/notice/dismiss
pub async fn dismiss_notice(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.dismiss_notice(&session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /encounters
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.list_sessions().await {
        Ok(ids) => (StatusCode::OK, Json(ids)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /signal
/// Live signal quality of the active recording
pub async fn get_signal(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.manager.signal().await;
    (StatusCode::OK, Json(report)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
