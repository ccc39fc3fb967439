//! HTTP API server for external control (the charting front end)
//!
//! This module provides a REST API for controlling recording sessions:
//! - POST /encounters/record/start - Start recording an encounter
//! - POST /encounters/record/pause | /resume | /stop - Lifecycle control
//! - GET /encounters/:id/status | /transcript | /note - Session queries
//! - POST /encounters/:id/view - Switch the viewed session
//! - GET /signal - Live signal quality
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
