use super::diarize;
use super::service::RawSegment;
use crate::nats::{NatsClient, TranscriptEvent};
use crate::session::{EncounterSession, SharedSession, TranscriptSegment};
use crate::store::{SessionPatch, SessionStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Merges newly transcribed segments into the session transcript with
/// correct ordering and speaker attribution.
///
/// The transcript is mutated only here; all other components read a
/// snapshot. Persistence and event publishing run as background tasks that
/// never block the in-memory update.
pub struct TranscriptAssembler {
    store: Arc<dyn SessionStore>,
    /// Optional bus for transcript events consumed by external listeners
    events: Option<Arc<NatsClient>>,
}

impl TranscriptAssembler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    pub fn with_events(mut self, client: Arc<NatsClient>) -> Self {
        self.events = Some(client);
        self
    }

    /// Merge a batch into the in-memory session. Returns the appended
    /// segments.
    ///
    /// Base timestamp is one past the last existing segment (or 1 for an
    /// empty transcript); each batch entry gets the next value, so
    /// timestamps stay strictly increasing and unique across repeated
    /// merges. Empty-text results are dropped; an empty batch is a no-op;
    /// existing segments are never reordered.
    pub fn merge(session: &mut EncounterSession, batch: Vec<RawSegment>) -> Vec<TranscriptSegment> {
        let mut appended = Vec::new();
        let mut next_timestamp = session.last_timestamp() + 1;

        for raw in batch {
            let text = raw.text.trim();
            if text.is_empty() {
                continue;
            }

            let speaker = diarize::identify_speaker(text, &session.transcript);
            let segment = TranscriptSegment {
                id: Uuid::new_v4().to_string(),
                timestamp: next_timestamp,
                speaker,
                text: text.to_string(),
                confidence: raw.confidence,
            };
            next_timestamp += 1;

            session.transcript.push(segment.clone());
            appended.push(segment);
        }

        appended
    }

    /// Merge a batch into the live session and persist the result in the
    /// background. Returns how many segments were appended.
    pub async fn merge_into(&self, live: &SharedSession, batch: Vec<RawSegment>) -> usize {
        let (session_id, appended, snapshot) = {
            let mut session = live.lock().await;
            let appended = Self::merge(&mut session, batch);
            (session.id.clone(), appended, session.transcript.clone())
        };

        if appended.is_empty() {
            debug!("Empty transcription batch, nothing to merge");
            return 0;
        }

        debug!(
            "Merged {} segments into session {} ({} total)",
            appended.len(),
            session_id,
            snapshot.len()
        );

        // Background write; failures are logged, never propagated. The
        // in-memory transcript stays the source of truth until the next
        // successful write.
        let store = Arc::clone(&self.store);
        let persist_id = session_id.clone();
        tokio::spawn(async move {
            let patch = SessionPatch {
                transcript: Some(snapshot),
                ..SessionPatch::default()
            };
            if let Err(e) = store.update(&persist_id, patch).await {
                warn!("Failed to persist transcript for {}: {}", persist_id, e);
            }
        });

        if let Some(events) = &self.events {
            let events = Arc::clone(events);
            let event = TranscriptEvent {
                session_id: session_id.clone(),
                segments: appended.clone(),
                timestamp: Utc::now().to_rfc3339(),
            };
            let subject = format!("encounter.transcript.{}", session_id);
            tokio::spawn(async move {
                if let Err(e) = events.publish_json(&subject, &event).await {
                    warn!("Failed to publish transcript event: {}", e);
                }
            });
        }

        appended.len()
    }
}
