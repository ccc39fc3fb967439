use super::assembler::TranscriptAssembler;
use super::service::{TranscriptionPass, TranscriptionRequest, TranscriptionService};
use crate::notes::DocumentationTrigger;
use crate::session::{Recorder, SessionStatus, SharedSession};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Cadence of chunk submission (nominal 8 seconds)
    pub interval: Duration,
    /// Declared MIME type of chunk payloads
    pub mime_type: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(8),
            mime_type: "audio/wav".to_string(),
        }
    }
}

struct SchedulerInner {
    session_id: String,
    recorder: Arc<Recorder>,
    live: SharedSession,
    transcriber: Arc<dyn TranscriptionService>,
    assembler: Arc<TranscriptAssembler>,
    trigger: Arc<DocumentationTrigger>,
    config: SchedulerConfig,
    in_flight: AtomicBool,
    chunks_submitted: AtomicUsize,
    failure_streak: AtomicU32,
}

/// Submits chunk audio to the transcription service on a fixed interval
/// while the session is active.
///
/// At most one transcription request is in flight at any time; a tick that
/// finds a prior request still pending is skipped entirely, not queued.
/// The scheduler holds its own state (session id, in-flight flag, shutdown
/// channel) rather than closing over ambient mutable state, and tears down
/// deterministically: after `shutdown` returns, no further ticks fire and
/// any late-arriving response is discarded.
pub struct ChunkScheduler {
    inner: Arc<SchedulerInner>,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ChunkScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        session_id: String,
        recorder: Arc<Recorder>,
        live: SharedSession,
        transcriber: Arc<dyn TranscriptionService>,
        assembler: Arc<TranscriptAssembler>,
        trigger: Arc<DocumentationTrigger>,
        config: SchedulerConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(SchedulerInner {
            session_id,
            recorder,
            live,
            transcriber,
            assembler,
            trigger,
            config,
            in_flight: AtomicBool::new(false),
            chunks_submitted: AtomicUsize::new(0),
            failure_streak: AtomicU32::new(0),
        });

        let task = tokio::spawn(Self::run(Arc::clone(&inner), shutdown_rx));

        Self {
            inner,
            task: Mutex::new(Some(task)),
            shutdown_tx,
        }
    }

    /// Number of chunk requests actually submitted (skipped ticks excluded)
    pub fn chunks_submitted(&self) -> usize {
        self.inner.chunks_submitted.load(Ordering::SeqCst)
    }

    /// Stop the tick loop. In-flight requests are not aborted; their
    /// results are discarded on arrival.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Chunk scheduler task panicked: {}", e);
            }
        }
    }

    async fn run(inner: Arc<SchedulerInner>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(inner.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick completes immediately; the first chunk
        // should wait a full period
        ticker.tick().await;

        debug!(
            "Chunk scheduler started for session {} (every {:?})",
            inner.session_id, inner.config.interval
        );

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    Self::tick(&inner, &shutdown_rx);
                }
            }
        }

        debug!("Chunk scheduler stopped for session {}", inner.session_id);
    }

    fn tick(inner: &Arc<SchedulerInner>, shutdown_rx: &watch::Receiver<bool>) {
        if inner.recorder.status() != SessionStatus::Active {
            return;
        }

        if inner.in_flight.load(Ordering::SeqCst) {
            debug!(
                "Skipping tick for session {}: prior request still pending",
                inner.session_id
            );
            return;
        }

        let Some(chunk) = inner.recorder.extract_chunk(true) else {
            debug!("Skipping tick for session {}: no new audio", inner.session_id);
            return;
        };

        let payload = match chunk.to_wav_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode chunk for session {}: {}", inner.session_id, e);
                return;
            }
        };

        inner.in_flight.store(true, Ordering::SeqCst);
        inner.chunks_submitted.fetch_add(1, Ordering::SeqCst);

        let inner = Arc::clone(inner);
        let shutdown_rx = shutdown_rx.clone();

        tokio::spawn(async move {
            let request = TranscriptionRequest {
                session_id: inner.session_id.clone(),
                payload,
                mime_type: inner.config.mime_type.clone(),
                pass: TranscriptionPass::Chunk,
            };

            match inner.transcriber.transcribe(request).await {
                Ok(outcome) => {
                    if *shutdown_rx.borrow() {
                        debug!(
                            "Discarding late chunk response for torn-down session {}",
                            inner.session_id
                        );
                    } else {
                        inner.failure_streak.store(0, Ordering::SeqCst);
                        let appended =
                            inner.assembler.merge_into(&inner.live, outcome.segments).await;
                        if appended > 0 {
                            inner.trigger.spawn_extraction(&inner.live);
                        }
                    }
                }
                Err(e) => {
                    // Best-effort: the chunk is not retried, its audio is
                    // superseded by the final full pass
                    let streak = inner.failure_streak.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(
                        "Chunk transcription failed for session {} ({} consecutive): {}",
                        inner.session_id, streak, e
                    );
                }
            }

            inner.in_flight.store(false, Ordering::SeqCst);
        });
    }
}
