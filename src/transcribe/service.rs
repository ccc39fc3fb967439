use crate::error::{Result, ScribeError};
use crate::nats::{NatsClient, TranscriptionReply, TranscriptionRequestMessage};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Which transcription lane a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionPass {
    /// Incremental pass over one extracted chunk
    Chunk,
    /// Full-audio pass issued once at session stop
    Final,
}

impl TranscriptionPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionPass::Chunk => "chunk",
            TranscriptionPass::Final => "final",
        }
    }
}

/// One transcription request: binary audio payload plus declared MIME type
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub session_id: String,
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub pass: TranscriptionPass,
}

/// A segment as returned by the recognizer, before assembly
#[derive(Debug, Clone)]
pub struct RawSegment {
    pub text: String,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptionOutcome {
    pub segments: Vec<RawSegment>,
}

/// External speech-to-text service. Stateless, possibly-failing remote call
/// with no retry contract imposed by the core.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionOutcome>;
}

/// NATS request/reply implementation of the transcription service
pub struct NatsTranscriptionService {
    client: Arc<NatsClient>,
    subject: String,
    request_timeout: Duration,
}

impl NatsTranscriptionService {
    pub fn new(client: Arc<NatsClient>, subject: String, request_timeout: Duration) -> Self {
        Self {
            client,
            subject,
            request_timeout,
        }
    }
}

#[async_trait]
impl TranscriptionService for NatsTranscriptionService {
    async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionOutcome> {
        let message = TranscriptionRequestMessage {
            session_id: request.session_id.clone(),
            audio: base64::engine::general_purpose::STANDARD.encode(&request.payload),
            mime_type: request.mime_type.clone(),
            pass: request.pass.as_str().to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)
            .map_err(|e| ScribeError::transcription(format!("failed to encode request: {}", e)))?;

        let reply: TranscriptionReply = self
            .client
            .request_json(&self.subject, payload, self.request_timeout)
            .await
            .map_err(|e| ScribeError::transcription(e.to_string()))?;

        if let Some(error) = reply.error {
            return Err(ScribeError::transcription(error));
        }

        Ok(TranscriptionOutcome {
            segments: reply
                .segments
                .into_iter()
                .map(|s| RawSegment {
                    text: s.text,
                    confidence: s.confidence,
                })
                .collect(),
        })
    }
}
