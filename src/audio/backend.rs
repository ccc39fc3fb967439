use crate::error::{Result, ScribeError};
use async_trait::async_trait;
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture handle
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz for speech-to-text
            channels: 1,        // Mono
            buffer_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// One backend instance is the exclusive capture handle of a recording
/// session: open while the session is active, released on pause/stop.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture acquisition seam
///
/// Acquisition fails with `CaptureUnavailable` when the platform denies
/// access or no input device exists.
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    async fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn AudioBackend>>;
}

/// Provider for deployments with no capture integration wired in; every
/// acquisition fails so recording attempts surface `CaptureUnavailable`
/// instead of hanging.
pub struct NullCaptureProvider;

#[async_trait]
impl CaptureProvider for NullCaptureProvider {
    async fn acquire(&self, _config: &CaptureConfig) -> Result<Box<dyn AudioBackend>> {
        Err(ScribeError::capture_unavailable(
            "no capture integration configured",
        ))
    }
}

/// Capture provider backed by a WAV file, replayed as a live frame stream.
///
/// Used for batch transcription of pre-recorded encounters and as the
/// capture lane in integration tests.
pub struct FileCaptureProvider {
    path: PathBuf,
    /// Pace frame delivery at wall-clock speed instead of draining at once
    paced: bool,
}

impl FileCaptureProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            paced: true,
        }
    }

    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }
}

#[async_trait]
impl CaptureProvider for FileCaptureProvider {
    async fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn AudioBackend>> {
        let backend = FileBackend::open(&self.path, config.clone(), self.paced)?;
        Ok(Box::new(backend))
    }
}

/// File-backed capture handle
pub struct FileBackend {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    config: CaptureConfig,
    paced: bool,
    capturing: Arc<AtomicBool>,
}

impl FileBackend {
    pub fn open(path: &Path, config: CaptureConfig, paced: bool) -> Result<Self> {
        let reader = WavReader::open(path).map_err(|e| {
            ScribeError::capture_unavailable(format!(
                "failed to open {}: {}",
                path.display(),
                e
            ))
        })?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                ScribeError::capture_unavailable(format!("failed to read samples: {}", e))
            })?;

        info!(
            "Audio file loaded: {} ({} samples, {}Hz, {} channels)",
            path.display(),
            samples.len(),
            spec.sample_rate,
            spec.channels
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            config,
            paced,
            capturing: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[async_trait]
impl AudioBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(100);

        let samples = self.samples.clone();
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let frame_ms = self.config.buffer_duration_ms.max(10);
        let paced = self.paced;
        let capturing = Arc::clone(&self.capturing);

        capturing.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let samples_per_frame =
                (sample_rate as u64 * channels as u64 * frame_ms / 1000) as usize;
            let mut timestamp_ms = 0u64;

            for window in samples.chunks(samples_per_frame.max(1)) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: window.to_vec(),
                    sample_rate,
                    channels,
                    timestamp_ms,
                };
                timestamp_ms += frame_ms;

                if tx.send(frame).await.is_err() {
                    break;
                }

                if paced {
                    tokio::time::sleep(std::time::Duration::from_millis(frame_ms)).await;
                }
            }

            capturing.store(false, Ordering::SeqCst);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
