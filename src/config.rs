use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
    pub generation: GenerationConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub nats_url: String,
    /// Request subject for the speech-to-text service
    pub subject: String,
    /// Cadence of chunk submission while recording is active
    pub chunk_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Declared MIME type of chunk payloads
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerationConfig {
    /// Request subject for structured fact extraction
    pub facts_subject: String,
    /// Request subject for template-driven note drafting
    pub note_subject: String,
    pub request_timeout_secs: u64,
    /// Template used when the caller does not pick one
    pub default_template: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one JSON document per session
    pub data_dir: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
