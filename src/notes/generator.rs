use crate::error::{Result, ScribeError};
use crate::nats::{
    FactsReply, GenerationRequestMessage, NatsClient, NoteReply, TemplatePayload,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A vital sign extracted from the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSign {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Structured clinical facts extracted from the transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalFacts {
    #[serde(default)]
    pub vital_signs: Vec<VitalSign>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

/// A drafted clinical note produced by the generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftedNote {
    pub template_id: String,
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// Descriptor of the note template to draft against. Template content and
/// selection UI live outside the core.
#[derive(Debug, Clone)]
pub struct NoteTemplate {
    pub id: String,
    pub name: String,
    pub instructions: Option<String>,
}

impl NoteTemplate {
    pub fn named(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            instructions: None,
        }
    }
}

/// External note-generation service: structured extraction of clinical
/// facts and template-driven note drafting. Stateless, possibly-failing
/// remote calls with no retry contract imposed by the core.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn extract_facts(&self, session_id: &str, transcript: &str) -> Result<ClinicalFacts>;

    async fn draft_note(
        &self,
        session_id: &str,
        transcript: &str,
        template: &NoteTemplate,
    ) -> Result<String>;
}

/// Generation service endpoints on the message bus
#[derive(Debug, Clone)]
pub struct GenerationEndpoints {
    pub facts_subject: String,
    pub note_subject: String,
    pub request_timeout: Duration,
}

/// NATS request/reply implementation of the generation service
pub struct NatsGenerationService {
    client: Arc<NatsClient>,
    endpoints: GenerationEndpoints,
}

impl NatsGenerationService {
    pub fn new(client: Arc<NatsClient>, endpoints: GenerationEndpoints) -> Self {
        Self { client, endpoints }
    }

    fn request(
        session_id: &str,
        transcript: &str,
        template: Option<&NoteTemplate>,
    ) -> GenerationRequestMessage {
        GenerationRequestMessage {
            session_id: session_id.to_string(),
            transcript: transcript.to_string(),
            template: template.map(|t| TemplatePayload {
                id: t.id.clone(),
                name: t.name.clone(),
                instructions: t.instructions.clone(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[async_trait]
impl GenerationService for NatsGenerationService {
    async fn extract_facts(&self, session_id: &str, transcript: &str) -> Result<ClinicalFacts> {
        let message = Self::request(session_id, transcript, None);
        let payload = serde_json::to_vec(&message)
            .map_err(|e| ScribeError::generation(format!("failed to encode request: {}", e)))?;

        let reply: FactsReply = self
            .client
            .request_json(
                &self.endpoints.facts_subject,
                payload,
                self.endpoints.request_timeout,
            )
            .await
            .map_err(|e| ScribeError::generation(e.to_string()))?;

        if let Some(error) = reply.error {
            return Err(ScribeError::generation(error));
        }

        reply
            .facts
            .ok_or_else(|| ScribeError::generation("empty extraction reply"))
    }

    async fn draft_note(
        &self,
        session_id: &str,
        transcript: &str,
        template: &NoteTemplate,
    ) -> Result<String> {
        let message = Self::request(session_id, transcript, Some(template));
        let payload = serde_json::to_vec(&message)
            .map_err(|e| ScribeError::generation(format!("failed to encode request: {}", e)))?;

        let reply: NoteReply = self
            .client
            .request_json(
                &self.endpoints.note_subject,
                payload,
                self.endpoints.request_timeout,
            )
            .await
            .map_err(|e| ScribeError::generation(e.to_string()))?;

        if let Some(error) = reply.error {
            return Err(ScribeError::generation(error));
        }

        reply
            .text
            .ok_or_else(|| ScribeError::generation("empty note reply"))
    }
}
