use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/encounters/record/start", post(handlers::start_recording))
        .route("/encounters/record/pause", post(handlers::pause_recording))
        .route(
            "/encounters/record/resume",
            post(handlers::resume_recording),
        )
        .route("/encounters/record/stop", post(handlers::stop_recording))
        // Session queries
        .route("/encounters", get(handlers::list_sessions))
        .route("/encounters/:session_id/status", get(handlers::get_status))
        .route(
            "/encounters/:session_id/transcript",
            get(handlers::get_transcript),
        )
        .route("/encounters/:session_id/note", get(handlers::get_note))
        // View selection and notices
        .route("/encounters/:session_id/view", post(handlers::view_session))
        .route(
            "/encounters/:session_id/notice/dismiss",
            post(handlers::dismiss_notice),
        )
        // Live signal quality
        .route("/signal", get(handlers::get_signal))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
