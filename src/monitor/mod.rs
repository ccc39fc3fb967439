//! Live signal-quality monitoring
//!
//! Consumes the capture frame stream, computes level/peak/clipping metrics,
//! classifies quality on a five-level scale, and raises transient warnings
//! that auto-expire.

mod signal;
mod warning;

pub use signal::{MonitorConfig, QualitySample, SignalMonitor, SignalQuality};
pub use warning::{Severity, SignalWarning, WarningKind};
