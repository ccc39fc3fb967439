//! Error types for encounter-scribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Capture errors: fatal to a start attempt, recoverable by retry
    #[error("Audio capture unavailable: {message}")]
    CaptureUnavailable { message: String },

    // State machine guard
    #[error("Invalid transition: cannot {operation} while {status}")]
    InvalidTransition { operation: String, status: String },

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    // Per-chunk transcription failures: logged and swallowed by the scheduler
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Note generation failures: surfaced as a dismissible notice
    #[error("Note generation failed: {message}")]
    Generation { message: String },

    // Store failures: in-memory state remains the source of truth
    #[error("Persistence failed: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // Message-bus failures, mapped into the stage-level taxonomy by callers
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScribeError {
    pub fn capture_unavailable(message: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            message: message.into(),
        }
    }

    pub fn invalid_transition(operation: impl Into<String>, status: impl Into<String>) -> Self {
        Self::InvalidTransition {
            operation: operation.into(),
            status: status.into(),
        }
    }

    pub fn transcription(message: impl Into<String>) -> Self {
        Self::Transcription {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;
