use crate::notes::ClinicalFacts;
use crate::session::TranscriptSegment;
use serde::{Deserialize, Serialize};

/// Transcription request sent to the speech-to-text service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionRequestMessage {
    pub session_id: String,
    /// Base64-encoded audio payload
    pub audio: String,
    pub mime_type: String,
    /// "chunk" for incremental passes, "final" for the full-audio pass
    pub pass: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// Reply from the speech-to-text service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionReply {
    #[serde(default)]
    pub segments: Vec<SegmentPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentPayload {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Request sent to the generation service (fact extraction and note drafting)
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequestMessage {
    pub session_id: String,
    /// Speaker-tagged transcript text
    pub transcript: String,
    /// Template descriptor, present only for note drafting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplatePayload>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Reply from the fact-extraction endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct FactsReply {
    #[serde(default)]
    pub facts: Option<ClinicalFacts>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply from the note-drafting endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transcript event published after each merge for external listeners
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub session_id: String,
    pub segments: Vec<TranscriptSegment>,
    pub timestamp: String, // RFC3339 timestamp
}
