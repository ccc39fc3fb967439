pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod monitor;
pub mod nats;
pub mod notes;
pub mod session;
pub mod store;
pub mod transcribe;

pub use audio::{
    AudioBackend, AudioChunk, AudioFrame, CaptureBuffer, CaptureConfig, CaptureProvider,
    FileCaptureProvider,
};
pub use config::Config;
pub use error::{Result, ScribeError};
pub use http::{create_router, AppState};
pub use monitor::{MonitorConfig, QualitySample, SignalMonitor, SignalQuality, SignalWarning};
pub use nats::NatsClient;
pub use notes::{
    ClinicalFacts, DocumentationTrigger, DraftedNote, GenerationService, NoteTemplate, ViewContext,
};
pub use session::{
    EncounterSession, EncounterStats, ManagerSettings, Recorder, SessionManager, SessionStatus,
    SignalReport, Speaker, TranscriptSegment,
};
pub use store::{JsonStore, MemoryStore, SessionPatch, SessionStore};
pub use transcribe::{
    ChunkScheduler, RawSegment, SchedulerConfig, TranscriptAssembler, TranscriptionOutcome,
    TranscriptionPass, TranscriptionRequest, TranscriptionService,
};
