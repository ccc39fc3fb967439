use anyhow::{Context, Result};
use clap::Parser;
use encounter_scribe::notes::{GenerationEndpoints, NatsGenerationService};
use encounter_scribe::transcribe::NatsTranscriptionService;
use encounter_scribe::audio::NullCaptureProvider;
use encounter_scribe::{
    AppState, Config, FileCaptureProvider, JsonStore, ManagerSettings, NatsClient, NoteTemplate,
    SchedulerConfig, SessionManager, SessionStore, TranscriptAssembler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "encounter-scribe", about = "Clinical encounter recording service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/encounter-scribe")]
    config: String,

    /// Replay a WAV file as the capture source instead of a live device
    #[arg(long)]
    capture_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let nats = Arc::new(
        NatsClient::connect(&cfg.transcription.nats_url)
            .await
            .context("Failed to connect to NATS")?,
    );

    let store: Arc<dyn SessionStore> = Arc::new(JsonStore::open(&cfg.store.data_dir)?);

    let transcriber = Arc::new(NatsTranscriptionService::new(
        Arc::clone(&nats),
        cfg.transcription.subject.clone(),
        Duration::from_secs(cfg.transcription.request_timeout_secs),
    ));

    let generator = Arc::new(NatsGenerationService::new(
        Arc::clone(&nats),
        GenerationEndpoints {
            facts_subject: cfg.generation.facts_subject.clone(),
            note_subject: cfg.generation.note_subject.clone(),
            request_timeout: Duration::from_secs(cfg.generation.request_timeout_secs),
        },
    ));

    let assembler = Arc::new(
        TranscriptAssembler::new(Arc::clone(&store)).with_events(Arc::clone(&nats)),
    );

    let provider: Arc<dyn encounter_scribe::CaptureProvider> = match &args.capture_file {
        Some(path) => Arc::new(FileCaptureProvider::new(path)),
        None => Arc::new(NullCaptureProvider),
    };

    let settings = ManagerSettings {
        capture: encounter_scribe::CaptureConfig {
            sample_rate: cfg.audio.sample_rate,
            channels: cfg.audio.channels,
            buffer_duration_ms: cfg.audio.buffer_duration_ms,
        },
        scheduler: SchedulerConfig {
            interval: Duration::from_secs(cfg.transcription.chunk_interval_secs),
            mime_type: cfg.transcription.mime_type.clone(),
        },
        default_template: NoteTemplate::named(cfg.generation.default_template.clone()),
        ..ManagerSettings::default()
    };

    let manager = Arc::new(SessionManager::new(
        store,
        provider,
        transcriber,
        generator,
        assembler,
        settings,
    ));

    let state = AppState::new(manager);
    let router = encounter_scribe::create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router).await?;

    Ok(())
}
