use crate::notes::{ClinicalFacts, DraftedNote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recording lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Active,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Speaker attribution assigned by the diarization heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Provider,
    Patient,
    Unknown,
}

/// One merged transcript segment.
///
/// Created by the assembler when a transcription result is merged; never
/// mutated afterward, only appended. Timestamps are strictly increasing
/// across the sequence for a given session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Unique within the session
    pub id: String,
    pub timestamp: u64,
    pub speaker: Speaker,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Accumulated active-recording seconds; updated only by the state
    /// machine on start/stop transitions
    pub duration_secs: f64,
}

/// One recorded clinical encounter, including its transcript and generated
/// documentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    /// Insertion order is chronological order; append-only during a
    /// session, mutable only through the assembler
    pub transcript: Vec<TranscriptSegment>,
    pub metadata: SessionMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<DraftedNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<ClinicalFacts>,
    /// Dismissible notice left by a failed generation attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_notice: Option<String>,
}

impl EncounterSession {
    pub fn new(id: String) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            status: SessionStatus::Idle,
            transcript: Vec::new(),
            metadata: SessionMetadata::default(),
            note: None,
            facts: None,
            generation_notice: None,
        }
    }

    /// Timestamp of the most recent segment, or 0 for an empty transcript
    pub fn last_timestamp(&self) -> u64 {
        self.transcript.last().map(|s| s.timestamp).unwrap_or(0)
    }

    /// Speaker-tagged plain text of the whole transcript, the input shape
    /// of the generation service
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|s| {
                let speaker = match s.speaker {
                    Speaker::Provider => "Provider",
                    Speaker::Patient => "Patient",
                    Speaker::Unknown => "Unknown",
                };
                format!("{}: {}", speaker, s.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Statistics about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterStats {
    pub session_id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    /// Accumulated active-recording seconds
    pub duration_secs: f64,
    /// Number of audio chunks submitted for transcription so far
    pub chunks_submitted: usize,
    /// Number of transcript segments merged so far
    pub segment_count: usize,
}
