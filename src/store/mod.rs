//! Session persistence
//!
//! Key-value persistence keyed by session id with partial field updates,
//! last-write-wins per field. The in-memory session state remains the
//! source of truth until the next successful write.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::notes::{ClinicalFacts, DraftedNote};
use crate::session::{EncounterSession, SessionStatus, TranscriptSegment};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Partial update of a stored session. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub duration_secs: Option<f64>,
    pub transcript: Option<Vec<TranscriptSegment>>,
    pub note: Option<DraftedNote>,
    pub facts: Option<ClinicalFacts>,
    /// `Some(None)` clears the notice, `Some(Some(_))` sets it
    pub generation_notice: Option<Option<String>>,
}

impl SessionPatch {
    pub fn apply(self, session: &mut EncounterSession) {
        if let Some(status) = self.status {
            session.status = status;
        }
        if let Some(duration_secs) = self.duration_secs {
            session.metadata.duration_secs = duration_secs;
        }
        if let Some(transcript) = self.transcript {
            session.transcript = transcript;
        }
        if let Some(note) = self.note {
            session.note = Some(note);
        }
        if let Some(facts) = self.facts {
            session.facts = Some(facts);
        }
        if let Some(notice) = self.generation_notice {
            session.generation_notice = notice;
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &EncounterSession) -> Result<()>;

    async fn get(&self, session_id: &str) -> Result<Option<EncounterSession>>;

    /// Apply a partial update to the stored record. Fails with
    /// `Persistence` if the session does not exist.
    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<()>;

    async fn list(&self) -> Result<Vec<String>>;
}
