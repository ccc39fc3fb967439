use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal-quality warning category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    NoAudio,
    LowAudio,
    Clipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A transient warning emitted by the signal monitor.
///
/// Warnings auto-expire after a fixed timeout independent of whether the
/// underlying condition persists; a recurring condition re-raises the
/// warning instead of leaving a stale one visible. Not part of session
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}
