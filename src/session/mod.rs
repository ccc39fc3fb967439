//! Recording session management
//!
//! This module provides:
//! - The session data model (status, transcript, metadata, documentation)
//! - `Recorder`: the capture lifecycle state machine
//! - `SessionManager`: orchestration of recording, chunk transcription,
//!   and documentation across the currently open sessions

mod manager;
mod model;
mod recorder;

pub use manager::{ManagerSettings, SessionManager, SignalReport};
pub use model::{
    EncounterSession, EncounterStats, SessionMetadata, SessionStatus, Speaker, TranscriptSegment,
};
pub use recorder::Recorder;

use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory view model of a session, shared between the assembler, the
/// documentation trigger, and the HTTP surface
pub type SharedSession = Arc<Mutex<EncounterSession>>;
