use crate::audio::{CaptureConfig, CaptureProvider};
use crate::error::{Result, ScribeError};
use crate::monitor::{MonitorConfig, QualitySample, SignalQuality, SignalWarning};
use crate::notes::{
    DocumentationTrigger, GenerationService, NoteTemplate, OpenSessions, ViewContext,
};
use crate::session::{
    EncounterSession, EncounterStats, Recorder, SessionStatus, SharedSession, TranscriptSegment,
};
use crate::store::{SessionPatch, SessionStore};
use crate::transcribe::{
    ChunkScheduler, SchedulerConfig, TranscriptAssembler, TranscriptionPass, TranscriptionRequest,
    TranscriptionService,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub capture: CaptureConfig,
    pub monitor: MonitorConfig,
    pub scheduler: SchedulerConfig,
    pub default_template: NoteTemplate,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            monitor: MonitorConfig::default(),
            scheduler: SchedulerConfig::default(),
            default_template: NoteTemplate::named("soap"),
        }
    }
}

/// Live signal state for the currently active recording
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub sample: QualitySample,
    pub quality: SignalQuality,
    pub warnings: Vec<SignalWarning>,
}

struct ActiveEncounter {
    session_id: String,
    recorder: Arc<Recorder>,
    live: SharedSession,
    scheduler: Option<ChunkScheduler>,
}

/// Orchestrates the recording pipeline across the currently open sessions.
///
/// One recording may be active per service instance; the capture handle is
/// exclusively owned by its recorder. The persisted transcript is mutated
/// only through the assembler; asynchronous completion handlers consult the
/// `ViewContext` before touching in-memory view state.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn CaptureProvider>,
    transcriber: Arc<dyn TranscriptionService>,
    assembler: Arc<TranscriptAssembler>,
    trigger: Arc<DocumentationTrigger>,
    view: ViewContext,
    open: OpenSessions,
    settings: ManagerSettings,
    active: Mutex<Option<ActiveEncounter>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn CaptureProvider>,
        transcriber: Arc<dyn TranscriptionService>,
        generator: Arc<dyn GenerationService>,
        assembler: Arc<TranscriptAssembler>,
        settings: ManagerSettings,
    ) -> Self {
        let view = ViewContext::new();
        let open: OpenSessions = Arc::new(RwLock::new(HashMap::new()));
        let trigger = Arc::new(DocumentationTrigger::new(
            generator,
            Arc::clone(&store),
            view.clone(),
            Arc::clone(&open),
        ));

        Self {
            store,
            provider,
            transcriber,
            assembler,
            trigger,
            view,
            open,
            settings,
            active: Mutex::new(None),
        }
    }

    /// Start recording, creating the session entity if needed. Viewing
    /// switches to the started session.
    pub async fn start_recording(&self, requested_id: Option<String>) -> Result<String> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            warn!(
                "Cannot start recording: session {} is already recording",
                current.session_id
            );
            return Err(ScribeError::invalid_transition("start", "active"));
        }

        let session_id = requested_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut session = match self.store.get(&session_id).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                let session = EncounterSession::new(session_id.clone());
                if let Err(e) = self.store.create(&session).await {
                    warn!("Failed to persist new session {}: {}", session_id, e);
                }
                session
            }
            Err(e) => {
                warn!("Failed to load session {}: {}", session_id, e);
                EncounterSession::new(session_id.clone())
            }
        };

        if !matches!(
            session.status,
            SessionStatus::Idle | SessionStatus::Completed
        ) {
            return Err(ScribeError::invalid_transition(
                "start",
                session.status.as_str(),
            ));
        }

        let recorder = Arc::new(Recorder::new(
            session_id.clone(),
            Arc::clone(&self.provider),
            self.settings.capture.clone(),
            self.settings.monitor.clone(),
        ));

        // CaptureUnavailable propagates before any state changes hands
        recorder.start().await?;

        session.status = SessionStatus::Active;
        let live: SharedSession = Arc::new(Mutex::new(session));

        self.open
            .write()
            .await
            .insert(session_id.clone(), Arc::clone(&live));
        self.view.set_viewed(Some(session_id.clone())).await;

        let scheduler = ChunkScheduler::start(
            session_id.clone(),
            Arc::clone(&recorder),
            Arc::clone(&live),
            Arc::clone(&self.transcriber),
            Arc::clone(&self.assembler),
            Arc::clone(&self.trigger),
            self.settings.scheduler.clone(),
        );

        *active = Some(ActiveEncounter {
            session_id: session_id.clone(),
            recorder,
            live,
            scheduler: Some(scheduler),
        });

        self.persist_patch(
            &session_id,
            SessionPatch {
                status: Some(SessionStatus::Active),
                ..SessionPatch::default()
            },
        );

        info!("Recording started for session {}", session_id);
        Ok(session_id)
    }

    pub async fn pause_recording(&self) -> Result<String> {
        let mut active = self.active.lock().await;
        let encounter = active
            .as_mut()
            .ok_or_else(|| ScribeError::invalid_transition("pause", "idle"))?;

        // The scheduler is torn down on pause; resume starts a fresh one
        if let Some(scheduler) = encounter.scheduler.take() {
            scheduler.shutdown().await;
        }
        encounter.recorder.pause().await?;

        encounter.live.lock().await.status = SessionStatus::Paused;
        self.persist_patch(
            &encounter.session_id,
            SessionPatch {
                status: Some(SessionStatus::Paused),
                ..SessionPatch::default()
            },
        );

        Ok(encounter.session_id.clone())
    }

    pub async fn resume_recording(&self) -> Result<String> {
        let mut active = self.active.lock().await;
        let encounter = active
            .as_mut()
            .ok_or_else(|| ScribeError::invalid_transition("resume", "idle"))?;

        encounter.recorder.resume().await?;

        encounter.live.lock().await.status = SessionStatus::Active;
        encounter.scheduler = Some(ChunkScheduler::start(
            encounter.session_id.clone(),
            Arc::clone(&encounter.recorder),
            Arc::clone(&encounter.live),
            Arc::clone(&self.transcriber),
            Arc::clone(&self.assembler),
            Arc::clone(&self.trigger),
            self.settings.scheduler.clone(),
        ));

        self.persist_patch(
            &encounter.session_id,
            SessionPatch {
                status: Some(SessionStatus::Active),
                ..SessionPatch::default()
            },
        );

        Ok(encounter.session_id.clone())
    }

    /// Stop recording: tear down the scheduler, run the final full-audio
    /// transcription pass, persist the finalized record, and trigger
    /// documentation generation exactly once.
    pub async fn stop_recording(&self) -> Result<EncounterStats> {
        let mut active = self.active.lock().await;
        let encounter = active
            .take()
            .ok_or_else(|| ScribeError::invalid_transition("stop", "idle"))?;
        drop(active);

        // Tear down the tick loop first so no further chunks are submitted
        // and a pending response is discarded on arrival
        let chunks_submitted = match &encounter.scheduler {
            Some(scheduler) => {
                scheduler.shutdown().await;
                scheduler.chunks_submitted()
            }
            None => 0,
        };

        let duration_secs = encounter.recorder.stop().await?;

        // Final non-chunked pass over the full captured audio, in addition
        // to any chunk-level results already merged
        if let Some(chunk) = encounter.recorder.full_audio() {
            match chunk.to_wav_bytes() {
                Ok(payload) => {
                    let request = TranscriptionRequest {
                        session_id: encounter.session_id.clone(),
                        payload,
                        mime_type: self.settings.scheduler.mime_type.clone(),
                        pass: TranscriptionPass::Final,
                    };
                    match self.transcriber.transcribe(request).await {
                        Ok(outcome) => {
                            self.assembler
                                .merge_into(&encounter.live, outcome.segments)
                                .await;
                        }
                        Err(e) => warn!(
                            "Final transcription pass failed for {}: {}",
                            encounter.session_id, e
                        ),
                    }
                }
                Err(e) => warn!(
                    "Failed to encode full audio for {}: {}",
                    encounter.session_id, e
                ),
            }
        }

        let (stats, transcript) = {
            let mut session = encounter.live.lock().await;
            session.status = SessionStatus::Completed;
            session.metadata.duration_secs = duration_secs;
            (
                EncounterStats {
                    session_id: session.id.clone(),
                    status: SessionStatus::Completed,
                    started_at: session.created_at,
                    duration_secs,
                    chunks_submitted,
                    segment_count: session.transcript.len(),
                },
                session.transcript.clone(),
            )
        };

        let patch = SessionPatch {
            status: Some(SessionStatus::Completed),
            duration_secs: Some(duration_secs),
            transcript: Some(transcript),
            ..SessionPatch::default()
        };
        if let Err(e) = self.store.update(&encounter.session_id, patch).await {
            warn!(
                "Failed to persist finalized session {}: {}",
                encounter.session_id, e
            );
        }

        if stats.segment_count > 0 {
            self.trigger
                .spawn_documentation(&encounter.live, self.settings.default_template.clone());
        }

        info!(
            "Recording stopped for session {} ({} segments, {} chunks)",
            encounter.session_id, stats.segment_count, chunks_submitted
        );

        Ok(stats)
    }

    /// Switch the viewed session, loading its record into memory if needed
    pub async fn view_session(&self, session_id: &str) -> Result<EncounterSession> {
        let existing = { self.open.read().await.get(session_id).cloned() };

        let live = match existing {
            Some(live) => live,
            None => {
                let stored = self.store.get(session_id).await?.ok_or_else(|| {
                    ScribeError::SessionNotFound {
                        session_id: session_id.to_string(),
                    }
                })?;
                let live: SharedSession = Arc::new(Mutex::new(stored));
                self.open
                    .write()
                    .await
                    .insert(session_id.to_string(), Arc::clone(&live));
                live
            }
        };

        self.view.set_viewed(Some(session_id.to_string())).await;

        let session = live.lock().await.clone();
        Ok(session)
    }

    /// Snapshot of a session: the in-memory view model when open, the
    /// stored record otherwise
    pub async fn session(&self, session_id: &str) -> Result<EncounterSession> {
        if let Some(live) = self.open.read().await.get(session_id).cloned() {
            return Ok(live.lock().await.clone());
        }

        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| ScribeError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    pub async fn transcript(&self, session_id: &str) -> Result<Vec<TranscriptSegment>> {
        Ok(self.session(session_id).await?.transcript)
    }

    pub async fn stats(&self, session_id: &str) -> Result<EncounterStats> {
        {
            let active = self.active.lock().await;
            if let Some(encounter) = active.as_ref().filter(|e| e.session_id == session_id) {
                let session = encounter.live.lock().await;
                return Ok(EncounterStats {
                    session_id: session.id.clone(),
                    status: encounter.recorder.status(),
                    started_at: session.created_at,
                    duration_secs: encounter.recorder.duration_secs(),
                    chunks_submitted: encounter
                        .scheduler
                        .as_ref()
                        .map(|s| s.chunks_submitted())
                        .unwrap_or(0),
                    segment_count: session.transcript.len(),
                });
            }
        }

        let session = self.session(session_id).await?;
        Ok(EncounterStats {
            session_id: session.id.clone(),
            status: session.status,
            started_at: session.created_at,
            duration_secs: session.metadata.duration_secs,
            chunks_submitted: 0,
            segment_count: session.transcript.len(),
        })
    }

    /// Signal state of the active recording, if any
    pub async fn signal(&self) -> SignalReport {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(encounter) => {
                let monitor = encounter.recorder.monitor();
                SignalReport {
                    sample: monitor.sample(),
                    quality: monitor.quality(),
                    warnings: monitor.active_warnings(),
                }
            }
            None => SignalReport {
                sample: QualitySample::default(),
                quality: SignalQuality::None,
                warnings: Vec::new(),
            },
        }
    }

    /// Clear a dismissible generation notice
    pub async fn dismiss_notice(&self, session_id: &str) -> Result<()> {
        if let Some(live) = self.open.read().await.get(session_id).cloned() {
            live.lock().await.generation_notice = None;
        }

        if let Err(e) = self
            .store
            .update(
                session_id,
                SessionPatch {
                    generation_notice: Some(None),
                    ..SessionPatch::default()
                },
            )
            .await
        {
            warn!("Failed to persist notice dismissal for {}: {}", session_id, e);
        }

        Ok(())
    }

    pub async fn list_sessions(&self) -> Result<Vec<String>> {
        self.store.list().await
    }

    pub async fn viewed_session(&self) -> Option<String> {
        self.view.viewed().await
    }

    fn persist_patch(&self, session_id: &str, patch: SessionPatch) {
        let store = Arc::clone(&self.store);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.update(&session_id, patch).await {
                warn!("Failed to persist session {}: {}", session_id, e);
            }
        });
    }
}
