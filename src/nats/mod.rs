pub mod client;
pub mod messages;

pub use client::NatsClient;
pub use messages::{
    FactsReply, GenerationRequestMessage, NoteReply, SegmentPayload, TemplatePayload,
    TranscriptEvent, TranscriptionReply, TranscriptionRequestMessage,
};
