#![forbid(unsafe_code)]

//! Pure phase and signal functions of elapsed time.
//!
//! Everything here is a function of `(elapsed, timing, layer_count)` or of
//! an external progress value. The controller adds run bookkeeping on top.

use std::f64::consts::TAU;

use flowcast_core::{PhaseSchedule, TimingConfig, duration_ms};
use web_time::Duration;

use super::phase::{AfterPhase, BeforePhase};

/// Phase of the self-timed reveal at `elapsed`.
///
/// Setup layer `i` is entered once `elapsed >= i * stagger`; the latest
/// satisfied layer wins.
#[must_use]
pub fn before_phase_at(elapsed: Duration, timing: &TimingConfig, schedule: &PhaseSchedule) -> BeforePhase {
    if elapsed >= schedule.total {
        return BeforePhase::Complete;
    }
    if elapsed >= schedule.bleed_end {
        return BeforePhase::Ready;
    }
    if elapsed >= schedule.setup_end {
        return BeforePhase::Bleed;
    }
    let layers = schedule.layer_count;
    let stagger = timing.layer_stagger;
    let latest = if stagger.is_zero() {
        layers.saturating_sub(1)
    } else {
        let started =
            usize::try_from(elapsed.as_nanos() / stagger.as_nanos()).unwrap_or(usize::MAX);
        started.min(layers.saturating_sub(1))
    };
    BeforePhase::Setup(latest)
}

/// Draw progress of `layer` at `elapsed`, in `[0, 1]`.
#[must_use]
pub fn layer_progress(elapsed: Duration, layer: usize, timing: &TimingConfig) -> f64 {
    let start = timing.layer_start(layer);
    let Some(into) = elapsed.checked_sub(start) else {
        return 0.0;
    };
    let draw = timing.layer_draw.max(flowcast_core::MIN_DURATION);
    (into.as_secs_f64() / draw.as_secs_f64()).clamp(0.0, 1.0)
}

/// Bleed pulse intensity in `[0, 1]` given time into the bleed phase.
#[must_use]
pub fn pulse_intensity(bleed_elapsed: Duration, timing: &TimingConfig) -> f64 {
    let bleed = duration_ms(timing.bleed.max(flowcast_core::MIN_DURATION));
    let phase = duration_ms(bleed_elapsed) * timing.pulse_cycles * TAU / bleed;
    let v = phase.sin() * 0.5 + 0.5;
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Ratio of two durations, clamped to `[0, 1]`.
#[must_use]
pub fn fraction(part: Duration, whole: Duration) -> f64 {
    if whole.is_zero() {
        return 1.0;
    }
    (part.as_secs_f64() / whole.as_secs_f64()).clamp(0.0, 1.0)
}

/// Phase and phase-local progress of the progress-driven reveal.
///
/// `threshold` splits `[0, 1]` into shift and result; it is clamped to
/// `[0, 1]`.
#[must_use]
pub fn after_phase_for(progress: Option<f64>, threshold: f64) -> (AfterPhase, f64) {
    let Some(p) = progress.filter(|p| p.is_finite()) else {
        return (AfterPhase::Idle, 0.0);
    };
    let p = p.clamp(0.0, 1.0);
    let th = if threshold.is_finite() { threshold.clamp(0.0, 1.0) } else { 0.5 };
    if p < th {
        (AfterPhase::Shift, p / th)
    } else if th >= 1.0 {
        (AfterPhase::Result, 1.0)
    } else {
        (AfterPhase::Result, ((p - th) / (1.0 - th)).clamp(0.0, 1.0))
    }
}
