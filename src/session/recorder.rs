use crate::audio::{
    AudioBackend, AudioChunk, AudioFrame, CaptureBuffer, CaptureConfig, CaptureProvider,
};
use crate::error::{Result, ScribeError};
use crate::monitor::{MonitorConfig, SignalMonitor};
use crate::session::SessionStatus;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The capture lifecycle state machine of one recording attempt.
///
/// Owns the capture handle (open exactly while `active`), the captured
/// sample buffer with its chunk-extraction cursor, the signal monitor,
/// and duration accounting. `stopped` is terminal for a recording attempt
/// but the session entity persists.
pub struct Recorder {
    session_id: String,
    provider: Arc<dyn CaptureProvider>,
    capture_config: CaptureConfig,
    monitor: Arc<SignalMonitor>,
    buffer: Arc<StdMutex<CaptureBuffer>>,
    status: StdMutex<SessionStatus>,
    backend: Mutex<Option<Box<dyn AudioBackend>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    active_since: StdMutex<Option<Instant>>,
    active_duration: StdMutex<Duration>,
}

impl Recorder {
    pub fn new(
        session_id: String,
        provider: Arc<dyn CaptureProvider>,
        capture_config: CaptureConfig,
        monitor_config: MonitorConfig,
    ) -> Self {
        let buffer = CaptureBuffer::new(
            session_id.clone(),
            capture_config.sample_rate,
            capture_config.channels,
        );

        Self {
            session_id,
            provider,
            capture_config,
            monitor: Arc::new(SignalMonitor::new(monitor_config)),
            buffer: Arc::new(StdMutex::new(buffer)),
            status: StdMutex::new(SessionStatus::Idle),
            backend: Mutex::new(None),
            pump: Mutex::new(None),
            active_since: StdMutex::new(None),
            active_duration: StdMutex::new(Duration::ZERO),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap()
    }

    pub fn monitor(&self) -> Arc<SignalMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Begin a recording attempt. Valid from `idle` or `completed`; fails
    /// with `CaptureUnavailable` when no capture handle can be acquired.
    pub async fn start(&self) -> Result<()> {
        let status = self.status();
        if !matches!(status, SessionStatus::Idle | SessionStatus::Completed) {
            return Err(ScribeError::invalid_transition("start", status.as_str()));
        }

        info!("Starting recording for session {}", self.session_id);

        // Acquire before touching any state so a denied capture leaves the
        // machine where it was
        let mut backend = self.provider.acquire(&self.capture_config).await?;
        let audio_rx = backend.start().await?;

        {
            let mut buffer = self.buffer.lock().unwrap();
            buffer.reset();
        }
        *self.active_duration.lock().unwrap() = Duration::ZERO;

        self.monitor.start();
        self.spawn_pump(audio_rx).await;
        *self.backend.lock().await = Some(backend);

        *self.active_since.lock().unwrap() = Some(Instant::now());
        self.set_status(SessionStatus::Active);

        Ok(())
    }

    /// Pause capture. The capture handle is released; `resume` re-acquires.
    pub async fn pause(&self) -> Result<()> {
        let status = self.status();
        if status != SessionStatus::Active {
            return Err(ScribeError::invalid_transition("pause", status.as_str()));
        }

        info!("Pausing recording for session {}", self.session_id);

        self.release_capture().await;
        self.accrue_active_time();
        self.monitor.stop();
        self.set_status(SessionStatus::Paused);

        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let status = self.status();
        if status != SessionStatus::Paused {
            return Err(ScribeError::invalid_transition("resume", status.as_str()));
        }

        info!("Resuming recording for session {}", self.session_id);

        let mut backend = self.provider.acquire(&self.capture_config).await?;
        let audio_rx = backend.start().await?;

        self.monitor.start();
        self.spawn_pump(audio_rx).await;
        *self.backend.lock().await = Some(backend);

        *self.active_since.lock().unwrap() = Some(Instant::now());
        self.set_status(SessionStatus::Active);

        Ok(())
    }

    /// End the recording attempt. Releases the capture handle and finalizes
    /// the accumulated duration; returns the active-recording seconds.
    pub async fn stop(&self) -> Result<f64> {
        let status = self.status();
        if !matches!(status, SessionStatus::Active | SessionStatus::Paused) {
            return Err(ScribeError::invalid_transition("stop", status.as_str()));
        }

        if status == SessionStatus::Active {
            self.release_capture().await;
            self.accrue_active_time();
        }
        self.monitor.stop();
        self.set_status(SessionStatus::Completed);

        let duration_secs = self.duration_secs();
        info!(
            "Recording stopped for session {} ({:.1}s active)",
            self.session_id, duration_secs
        );

        Ok(duration_secs)
    }

    /// Audio captured since the previous extraction. See
    /// [`CaptureBuffer::extract_chunk`] for the `flush` contract.
    pub fn extract_chunk(&self, flush: bool) -> Option<AudioChunk> {
        self.buffer.lock().unwrap().extract_chunk(flush)
    }

    /// The entire captured audio of this attempt, for the final
    /// transcription pass
    pub fn full_audio(&self) -> Option<AudioChunk> {
        self.buffer.lock().unwrap().full_audio()
    }

    pub fn chunks_extracted(&self) -> u32 {
        self.buffer.lock().unwrap().chunks_extracted()
    }

    /// Accumulated active-recording seconds, including the running segment
    pub fn duration_secs(&self) -> f64 {
        let mut total = *self.active_duration.lock().unwrap();
        if let Some(since) = *self.active_since.lock().unwrap() {
            total += since.elapsed();
        }
        total.as_secs_f64()
    }

    async fn spawn_pump(&self, mut audio_rx: mpsc::Receiver<AudioFrame>) {
        let buffer = Arc::clone(&self.buffer);
        let monitor = Arc::clone(&self.monitor);

        let task = tokio::spawn(async move {
            while let Some(frame) = audio_rx.recv().await {
                monitor.ingest(&frame);
                buffer.lock().unwrap().push(&frame);
            }
        });

        *self.pump.lock().await = Some(task);
    }

    async fn release_capture(&self) {
        if let Some(mut backend) = self.backend.lock().await.take() {
            if let Err(e) = backend.stop().await {
                error!("Failed to stop capture backend: {}", e);
            }
        }

        // The frame channel closes once the backend stops delivering
        if let Some(task) = self.pump.lock().await.take() {
            if let Err(e) = task.await {
                error!("Frame pump task panicked: {}", e);
            }
        }
    }

    fn accrue_active_time(&self) {
        let mut since = self.active_since.lock().unwrap();
        if let Some(started) = since.take() {
            *self.active_duration.lock().unwrap() += started.elapsed();
        }
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap() = status;
    }
}
