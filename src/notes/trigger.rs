use super::generator::{DraftedNote, GenerationService, NoteTemplate};
use crate::session::SharedSession;
use crate::store::{SessionPatch, SessionStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The single source of truth for "which session is the user viewing".
///
/// Every asynchronous completion handler captures its session id at spawn
/// time and compares it against this context before mutating in-memory
/// view state; results for a session the user has navigated away from are
/// persisted but never applied to the live view.
#[derive(Clone, Default)]
pub struct ViewContext {
    viewed: Arc<RwLock<Option<String>>>,
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_viewed(&self, session_id: Option<String>) {
        *self.viewed.write().await = session_id;
    }

    pub async fn viewed(&self) -> Option<String> {
        self.viewed.read().await.clone()
    }

    pub async fn is_viewed(&self, session_id: &str) -> bool {
        self.viewed.read().await.as_deref() == Some(session_id)
    }
}

/// Map of in-memory session view models currently held open
pub type OpenSessions = Arc<RwLock<HashMap<String, SharedSession>>>;

/// Invokes clinical-fact extraction and note drafting against the
/// generation service once sufficient transcript exists, without blocking
/// transcript display.
///
/// Failures surface as a dismissible notice on the session and never roll
/// back merged transcript data.
pub struct DocumentationTrigger {
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn SessionStore>,
    view: ViewContext,
    open: OpenSessions,
    extraction_in_flight: AtomicBool,
}

impl DocumentationTrigger {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        store: Arc<dyn SessionStore>,
        view: ViewContext,
        open: OpenSessions,
    ) -> Self {
        Self {
            generator,
            store,
            view,
            open,
            extraction_in_flight: AtomicBool::new(false),
        }
    }

    /// Background fact extraction after a chunk merge yielded new material.
    ///
    /// Coalesced: a request already in flight means this merge's material
    /// is picked up by a later trigger instead of queueing a second call.
    pub fn spawn_extraction(self: &Arc<Self>, live: &SharedSession) -> Option<JoinHandle<()>> {
        if self.extraction_in_flight.swap(true, Ordering::SeqCst) {
            debug!("Fact extraction already in flight, skipping trigger");
            return None;
        }

        let trigger = Arc::clone(self);
        let live = Arc::clone(live);

        Some(tokio::spawn(async move {
            let (session_id, transcript) = {
                let session = live.lock().await;
                (session.id.clone(), session.transcript_text())
            };

            if transcript.is_empty() {
                trigger.extraction_in_flight.store(false, Ordering::SeqCst);
                return;
            }

            let result = trigger
                .generator
                .extract_facts(&session_id, &transcript)
                .await;
            trigger.extraction_in_flight.store(false, Ordering::SeqCst);

            match result {
                Ok(facts) => {
                    let patch = SessionPatch {
                        facts: Some(facts),
                        ..SessionPatch::default()
                    };
                    trigger.apply(&session_id, patch).await;
                }
                Err(e) => {
                    // Non-fatal: the next merge triggers a fresh attempt
                    warn!("Fact extraction failed for {}: {}", session_id, e);
                }
            }
        }))
    }

    /// Full documentation pass at session stop: fact extraction and note
    /// drafting run concurrently. Issued exactly once per stop.
    pub fn spawn_documentation(
        self: &Arc<Self>,
        live: &SharedSession,
        template: NoteTemplate,
    ) -> JoinHandle<()> {
        let trigger = Arc::clone(self);
        let live = Arc::clone(live);

        tokio::spawn(async move {
            let (session_id, transcript) = {
                let session = live.lock().await;
                (session.id.clone(), session.transcript_text())
            };

            if transcript.is_empty() {
                debug!("Session {} has no transcript, skipping documentation", session_id);
                return;
            }

            info!("Generating documentation for session {}", session_id);

            let (facts, note) = futures::join!(
                trigger.generator.extract_facts(&session_id, &transcript),
                trigger
                    .generator
                    .draft_note(&session_id, &transcript, &template),
            );

            let mut patch = SessionPatch::default();
            let mut failed = Vec::new();

            match facts {
                Ok(facts) => patch.facts = Some(facts),
                Err(e) => {
                    warn!("Fact extraction failed for {}: {}", session_id, e);
                    failed.push("fact extraction");
                }
            }

            match note {
                Ok(text) => {
                    patch.note = Some(DraftedNote {
                        template_id: template.id.clone(),
                        text,
                        generated_at: Utc::now(),
                    })
                }
                Err(e) => {
                    warn!("Note drafting failed for {}: {}", session_id, e);
                    failed.push("note drafting");
                }
            }

            if !failed.is_empty() {
                patch.generation_notice = Some(Some(format!(
                    "{} failed. The transcript is unaffected; retry from the note panel.",
                    failed.join(" and ")
                )));
            }

            trigger.apply(&session_id, patch).await;
        })
    }

    /// Apply a completion result: persist it for the owning session, then
    /// update the in-memory view model only if that session is still the
    /// one being viewed.
    async fn apply(&self, session_id: &str, patch: SessionPatch) {
        if let Err(e) = self.store.update(session_id, patch.clone()).await {
            warn!("Failed to persist documentation for {}: {}", session_id, e);
        }

        if !self.view.is_viewed(session_id).await {
            info!(
                "Session {} is no longer viewed; result persisted, view state untouched",
                session_id
            );
            return;
        }

        let live = { self.open.read().await.get(session_id).cloned() };
        if let Some(live) = live {
            let mut session = live.lock().await;
            patch.apply(&mut session);
        }
    }
}
