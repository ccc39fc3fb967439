//! Incremental transcription pipeline
//!
//! Chunk scheduling, the external speech-to-text seam, transcript
//! assembly, and speaker diarization.

mod assembler;
pub mod diarize;
mod scheduler;
mod service;

pub use assembler::TranscriptAssembler;
pub use scheduler::{ChunkScheduler, SchedulerConfig};
pub use service::{
    NatsTranscriptionService, RawSegment, TranscriptionOutcome, TranscriptionPass,
    TranscriptionRequest, TranscriptionService,
};
