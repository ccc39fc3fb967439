// Shared test doubles for the encounter recording pipeline.
//
// Capture, transcription, and generation are trait seams; the doubles here
// stand in for the platform audio stack and the remote services so the
// orchestration logic can be driven deterministically.

#![allow(dead_code)]

use async_trait::async_trait;
use encounter_scribe::audio::{AudioBackend, AudioFrame, CaptureConfig, CaptureProvider};
use encounter_scribe::error::{Result as ScribeResult, ScribeError};
use encounter_scribe::notes::{ClinicalFacts, GenerationService, NoteTemplate, VitalSign};
use encounter_scribe::store::MemoryStore;
use encounter_scribe::transcribe::{
    RawSegment, TranscriptionOutcome, TranscriptionPass, TranscriptionRequest,
    TranscriptionService,
};
use encounter_scribe::{ManagerSettings, SchedulerConfig, SessionManager, TranscriptAssembler};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Capture doubles
// ============================================================================

/// Capture provider that synthesizes frames of constant amplitude
pub struct TestCaptureProvider {
    amplitude: i16,
    frame_samples: usize,
    frame_period: Duration,
    fail_acquire: bool,
    acquired: AtomicUsize,
}

impl TestCaptureProvider {
    pub fn new(amplitude: i16) -> Self {
        Self {
            amplitude,
            frame_samples: 320, // 20ms at 16kHz
            frame_period: Duration::from_millis(5),
            fail_acquire: false,
            acquired: AtomicUsize::new(0),
        }
    }

    /// Provider whose acquisition always fails, as when the platform
    /// denies microphone access
    pub fn unavailable() -> Self {
        let mut provider = Self::new(0);
        provider.fail_acquire = true;
        provider
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureProvider for TestCaptureProvider {
    async fn acquire(&self, _config: &CaptureConfig) -> ScribeResult<Box<dyn AudioBackend>> {
        if self.fail_acquire {
            return Err(ScribeError::capture_unavailable("no input device"));
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestBackend {
            amplitude: self.amplitude,
            frame_samples: self.frame_samples,
            frame_period: self.frame_period,
            capturing: Arc::new(AtomicBool::new(false)),
        }))
    }
}

pub struct TestBackend {
    amplitude: i16,
    frame_samples: usize,
    frame_period: Duration,
    capturing: Arc<AtomicBool>,
}

#[async_trait]
impl AudioBackend for TestBackend {
    async fn start(&mut self) -> ScribeResult<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(100);
        self.capturing.store(true, Ordering::SeqCst);

        let capturing = Arc::clone(&self.capturing);
        let amplitude = self.amplitude;
        let frame_samples = self.frame_samples;
        let frame_period = self.frame_period;

        tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            while capturing.load(Ordering::SeqCst) {
                let frame = AudioFrame {
                    samples: vec![amplitude; frame_samples],
                    sample_rate: 16000,
                    channels: 1,
                    timestamp_ms,
                };
                timestamp_ms += frame_period.as_millis() as u64;

                if tx.send(frame).await.is_err() {
                    break;
                }
                tokio::time::sleep(frame_period).await;
            }
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> ScribeResult<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "test"
    }
}

// ============================================================================
// Transcription double
// ============================================================================

pub struct MockTranscriber {
    chunk_delay: Duration,
    chunk_batch: usize,
    final_batch: usize,
    fail_chunks: bool,
    chunk_calls: AtomicUsize,
    final_calls: AtomicUsize,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            chunk_delay: Duration::ZERO,
            chunk_batch: 2,
            final_batch: 1,
            fail_chunks: false,
            chunk_calls: AtomicUsize::new(0),
            final_calls: AtomicUsize::new(0),
        }
    }

    /// Delay applied to chunk-pass responses only
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn with_batches(mut self, chunk_batch: usize, final_batch: usize) -> Self {
        self.chunk_batch = chunk_batch;
        self.final_batch = final_batch;
        self
    }

    pub fn failing_chunks(mut self) -> Self {
        self.fail_chunks = true;
        self
    }

    pub fn chunk_calls(&self) -> usize {
        self.chunk_calls.load(Ordering::SeqCst)
    }

    pub fn final_calls(&self) -> usize {
        self.final_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionService for MockTranscriber {
    async fn transcribe(&self, request: TranscriptionRequest) -> ScribeResult<TranscriptionOutcome> {
        assert!(!request.payload.is_empty(), "submitted chunk must not be empty");

        match request.pass {
            TranscriptionPass::Chunk => {
                let call = self.chunk_calls.fetch_add(1, Ordering::SeqCst);

                if self.chunk_delay > Duration::ZERO {
                    tokio::time::sleep(self.chunk_delay).await;
                }
                if self.fail_chunks {
                    return Err(ScribeError::transcription("mock chunk failure"));
                }

                Ok(TranscriptionOutcome {
                    segments: (0..self.chunk_batch)
                        .map(|i| RawSegment {
                            text: format!("chunk {} segment {}", call, i),
                            confidence: Some(0.9),
                        })
                        .collect(),
                })
            }
            TranscriptionPass::Final => {
                self.final_calls.fetch_add(1, Ordering::SeqCst);

                Ok(TranscriptionOutcome {
                    segments: (0..self.final_batch)
                        .map(|i| RawSegment {
                            text: format!("final segment {}", i),
                            confidence: Some(0.95),
                        })
                        .collect(),
                })
            }
        }
    }
}

// ============================================================================
// Generation double
// ============================================================================

pub struct MockGenerator {
    delay: Duration,
    fail_facts: bool,
    fail_notes: bool,
    extract_calls: AtomicUsize,
    draft_calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_facts: false,
            fail_notes: false,
            extract_calls: AtomicUsize::new(0),
            draft_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_facts = true;
        self.fail_notes = true;
        self
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn draft_calls(&self) -> usize {
        self.draft_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn extract_facts(&self, _session_id: &str, transcript: &str) -> ScribeResult<ClinicalFacts> {
        assert!(!transcript.is_empty(), "extraction needs transcript text");
        self.extract_calls.fetch_add(1, Ordering::SeqCst);

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_facts {
            return Err(ScribeError::generation("mock extraction failure"));
        }

        Ok(ClinicalFacts {
            vital_signs: vec![VitalSign {
                name: "blood pressure".to_string(),
                value: "120/80".to_string(),
                unit: Some("mmHg".to_string()),
            }],
            action_items: vec!["order a complete blood count".to_string()],
        })
    }

    async fn draft_note(
        &self,
        session_id: &str,
        _transcript: &str,
        template: &NoteTemplate,
    ) -> ScribeResult<String> {
        self.draft_calls.fetch_add(1, Ordering::SeqCst);

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_notes {
            return Err(ScribeError::generation("mock drafting failure"));
        }

        Ok(format!("{} note for session {}", template.id, session_id))
    }
}

// ============================================================================
// Manager harness
// ============================================================================

pub struct TestHarness {
    pub manager: Arc<SessionManager>,
    pub store: Arc<MemoryStore>,
    pub provider: Arc<TestCaptureProvider>,
    pub transcriber: Arc<MockTranscriber>,
    pub generator: Arc<MockGenerator>,
}

/// Wire a manager around in-memory doubles with a short chunk cadence
pub fn harness(
    transcriber: MockTranscriber,
    generator: MockGenerator,
    chunk_interval: Duration,
) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(TestCaptureProvider::new(3000));
    let transcriber = Arc::new(transcriber);
    let generator = Arc::new(generator);

    let store_handle: Arc<dyn encounter_scribe::SessionStore> = store.clone();
    let assembler = Arc::new(TranscriptAssembler::new(Arc::clone(&store_handle)));

    let settings = ManagerSettings {
        scheduler: SchedulerConfig {
            interval: chunk_interval,
            mime_type: "audio/wav".to_string(),
        },
        ..ManagerSettings::default()
    };

    let manager = Arc::new(SessionManager::new(
        store_handle,
        provider.clone(),
        transcriber.clone(),
        generator.clone(),
        assembler,
        settings,
    ));

    TestHarness {
        manager,
        store,
        provider,
        transcriber,
        generator,
    }
}
