use super::warning::{Severity, SignalWarning, WarningKind};
use crate::audio::AudioFrame;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-frame signal metrics. Ephemeral, last-value-wins for consumers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualitySample {
    /// Smoothed signal level in [0, 1]
    pub level: f32,
    /// Largest absolute sample of the last frame, normalized
    pub peak: f32,
    /// Root mean square of the last frame, normalized
    pub rms: f32,
    pub is_clipping: bool,
}

/// Five-level signal quality scale derived from the smoothed level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    None,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Normalized peak above which a frame counts as clipping
    pub clip_threshold: f32,
    /// Consecutive clipping frames before a warning is raised
    pub clip_frames: u32,
    /// Level below which the stream counts as silent
    pub no_audio_level: f32,
    /// How long silence must hold before a `no_audio` warning
    pub no_audio_after: Duration,
    /// Level floor for the `low_audio` warning
    pub low_audio_level: f32,
    pub low_audio_after: Duration,
    /// Warnings auto-expire after this long
    pub warning_ttl: Duration,
    /// Exponential-moving-average factor for the smoothed level
    pub smoothing: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            clip_threshold: 0.95,
            clip_frames: 5,
            no_audio_level: 0.005,
            no_audio_after: Duration::from_secs(5),
            low_audio_level: 0.03,
            low_audio_after: Duration::from_secs(10),
            warning_ttl: Duration::from_secs(8),
            smoothing: 0.2,
        }
    }
}

struct ActiveWarning {
    warning: SignalWarning,
    raised: Instant,
}

#[derive(Default)]
struct MonitorState {
    smoothed: f32,
    last: QualitySample,
    silent_since: Option<Instant>,
    low_since: Option<Instant>,
    clip_run: u32,
    warnings: Vec<ActiveWarning>,
}

/// Continuously evaluates the live audio stream and classifies quality.
///
/// `start`/`stop` are idempotent; `stop` releases all analysis state and
/// resets quality to `none`.
pub struct SignalMonitor {
    config: MonitorConfig,
    active: AtomicBool,
    state: Mutex<MonitorState>,
}

impl SignalMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            active: AtomicBool::new(false),
            state: Mutex::new(MonitorState::default()),
        }
    }

    pub fn start(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }

        let mut state = self.state.lock().unwrap();
        *state = MonitorState::default();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Feed one captured frame through the monitor
    pub fn ingest(&self, frame: &AudioFrame) {
        if !self.is_active() || frame.samples.is_empty() {
            return;
        }

        let mut peak = 0.0f32;
        let mut sum_squared = 0.0f32;
        for &sample in &frame.samples {
            let normalized = (sample as f32 / i16::MAX as f32).abs();
            peak = peak.max(normalized);
            sum_squared += normalized * normalized;
        }
        let rms = (sum_squared / frame.samples.len() as f32).sqrt();
        let is_clipping = peak > self.config.clip_threshold;

        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        state.smoothed =
            self.config.smoothing * rms + (1.0 - self.config.smoothing) * state.smoothed;
        state.last = QualitySample {
            level: state.smoothed,
            peak,
            rms,
            is_clipping,
        };

        self.evaluate_warnings(&mut state, rms, is_clipping, now);
    }

    pub fn sample(&self) -> QualitySample {
        if !self.is_active() {
            return QualitySample::default();
        }
        self.state.lock().unwrap().last
    }

    pub fn quality(&self) -> SignalQuality {
        if !self.is_active() {
            return SignalQuality::None;
        }

        let level = self.state.lock().unwrap().smoothed;
        if level >= 0.25 {
            SignalQuality::Excellent
        } else if level >= 0.10 {
            SignalQuality::Good
        } else if level >= 0.04 {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }

    /// Unexpired warnings, oldest first
    pub fn active_warnings(&self) -> Vec<SignalWarning> {
        let mut state = self.state.lock().unwrap();
        Self::prune_expired(&mut state, self.config.warning_ttl, Instant::now());
        state.warnings.iter().map(|w| w.warning.clone()).collect()
    }

    fn evaluate_warnings(
        &self,
        state: &mut MonitorState,
        rms: f32,
        is_clipping: bool,
        now: Instant,
    ) {
        Self::prune_expired(state, self.config.warning_ttl, now);

        // Silence tracking
        if rms < self.config.no_audio_level {
            let since = *state.silent_since.get_or_insert(now);
            if now.duration_since(since) >= self.config.no_audio_after {
                Self::raise(
                    state,
                    WarningKind::NoAudio,
                    Severity::Warning,
                    "No audio detected. Check that the microphone is connected and unmuted.",
                    now,
                );
            }
        } else {
            state.silent_since = None;
        }

        // Persistently low level, above outright silence
        if rms >= self.config.no_audio_level && rms < self.config.low_audio_level {
            let since = *state.low_since.get_or_insert(now);
            if now.duration_since(since) >= self.config.low_audio_after {
                Self::raise(
                    state,
                    WarningKind::LowAudio,
                    Severity::Info,
                    "Audio level is low. Try moving the microphone closer.",
                    now,
                );
            }
        } else if rms >= self.config.low_audio_level {
            state.low_since = None;
        }

        // Consecutive clipping frames
        if is_clipping {
            state.clip_run += 1;
            if state.clip_run >= self.config.clip_frames {
                Self::raise(
                    state,
                    WarningKind::Clipping,
                    Severity::Warning,
                    "Audio input is clipping. Reduce the input gain.",
                    now,
                );
            }
        } else {
            state.clip_run = 0;
        }
    }

    fn raise(
        state: &mut MonitorState,
        kind: WarningKind,
        severity: Severity,
        message: &str,
        now: Instant,
    ) {
        // At most one unexpired warning per kind; a recurring condition
        // re-raises after expiry
        if state.warnings.iter().any(|w| w.warning.kind == kind) {
            return;
        }

        debug!("Signal warning raised: {:?}", kind);

        state.warnings.push(ActiveWarning {
            warning: SignalWarning {
                kind,
                severity,
                message: message.to_string(),
                raised_at: Utc::now(),
            },
            raised: now,
        });
    }

    fn prune_expired(state: &mut MonitorState, ttl: Duration, now: Instant) {
        state
            .warnings
            .retain(|w| now.duration_since(w.raised) < ttl);
    }
}
