#![forbid(unsafe_code)]

//! Narrative timing configuration and the derived phase schedule.
//!
//! # Invariants
//!
//! 1. Divisor durations (`layer_draw`, `bleed`, `ready`) are never zero after
//!    [`TimingConfig::normalized`]; they floor to [`MIN_DURATION`].
//! 2. Offsets (`layer_stagger`, reveal delays) floor to zero.
//! 3. `pulse_cycles` is finite and non-negative.
//!
//! # Failure Modes
//!
//! - Negative or non-finite millisecond overrides: treated as zero, then
//!   floored per invariant 1 or 2. A misconfigured run still completes.

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Smallest duration any divisor in the phase math can take.
pub const MIN_DURATION: Duration = Duration::from_millis(1);

/// Convert host milliseconds into a [`Duration`], mapping garbage to zero.
#[must_use]
pub fn duration_from_ms(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    let nanos = (ms * 1_000_000.0).round();
    if nanos >= u64::MAX as f64 {
        return Duration::from_nanos(u64::MAX);
    }
    Duration::from_nanos(nanos as u64)
}

/// Milliseconds as `f64`, for serialization and logs.
#[inline]
#[must_use]
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(super::duration_ms(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        Ok(super::duration_from_ms(ms))
    }
}

/// Durations and staggers driving the "before" reveal.
///
/// Serialized as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time for one layer to draw in fully.
    #[serde(with = "millis")]
    pub layer_draw: Duration,
    /// Offset between successive layers' draw start.
    #[serde(with = "millis")]
    pub layer_stagger: Duration,
    /// Length of the loss-emphasis phase.
    #[serde(with = "millis")]
    pub bleed: Duration,
    /// Length of the summary phase before completion.
    #[serde(with = "millis")]
    pub ready: Duration,
    /// Number of full pulse cycles across the bleed window.
    pub pulse_cycles: f64,
    /// Delay into bleed before the anchored metric appears.
    #[serde(with = "millis")]
    pub metric_reveal_delay: Duration,
    /// Offset between successive summary metrics during ready.
    #[serde(with = "millis")]
    pub metric_stagger: Duration,
    /// Time spent in ready before the action control becomes interactive.
    #[serde(with = "millis")]
    pub button_grace: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            layer_draw: Duration::from_millis(2000),
            layer_stagger: Duration::from_millis(1500),
            bleed: Duration::from_millis(3000),
            ready: Duration::from_millis(2000),
            pulse_cycles: 3.0,
            metric_reveal_delay: Duration::from_millis(800),
            metric_stagger: Duration::from_millis(300),
            button_grace: Duration::from_millis(600),
        }
    }
}

impl TimingConfig {
    /// Apply floors so phase math never divides by zero.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.layer_draw = self.layer_draw.max(MIN_DURATION);
        self.bleed = self.bleed.max(MIN_DURATION);
        self.ready = self.ready.max(MIN_DURATION);
        if !self.pulse_cycles.is_finite() || self.pulse_cycles < 0.0 {
            self.pulse_cycles = 0.0;
        }
        self
    }

    /// Layer the given overrides on top of this config, then normalize.
    #[must_use]
    pub fn with_overrides(mut self, o: &TimingOverrides) -> Self {
        if let Some(ms) = o.layer_draw_ms {
            self.layer_draw = duration_from_ms(ms);
        }
        if let Some(ms) = o.layer_stagger_ms {
            self.layer_stagger = duration_from_ms(ms);
        }
        if let Some(ms) = o.bleed_ms {
            self.bleed = duration_from_ms(ms);
        }
        if let Some(ms) = o.ready_ms {
            self.ready = duration_from_ms(ms);
        }
        if let Some(cycles) = o.pulse_cycles {
            self.pulse_cycles = cycles;
        }
        if let Some(ms) = o.metric_reveal_delay_ms {
            self.metric_reveal_delay = duration_from_ms(ms);
        }
        if let Some(ms) = o.metric_stagger_ms {
            self.metric_stagger = duration_from_ms(ms);
        }
        if let Some(ms) = o.button_grace_ms {
            self.button_grace = duration_from_ms(ms);
        }
        self.normalized()
    }

    /// Start offset of layer `i`'s draw-in.
    #[inline]
    #[must_use]
    pub fn layer_start(&self, layer: usize) -> Duration {
        self.layer_stagger
            .saturating_mul(u32::try_from(layer).unwrap_or(u32::MAX))
    }

    /// Derive the phase boundaries for a diagram with `layer_count` layers.
    #[must_use]
    pub fn schedule(&self, layer_count: usize) -> PhaseSchedule {
        let cfg = self.normalized();
        let setup_end = if layer_count == 0 {
            Duration::ZERO
        } else {
            cfg.layer_draw
                .saturating_add(cfg.layer_start(layer_count - 1))
        };
        let bleed_end = setup_end.saturating_add(cfg.bleed);
        let total = bleed_end.saturating_add(cfg.ready);
        PhaseSchedule {
            layer_count,
            setup_end,
            bleed_end,
            total,
        }
    }
}

/// Partial timing overrides, in milliseconds, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingOverrides {
    pub layer_draw_ms: Option<f64>,
    pub layer_stagger_ms: Option<f64>,
    pub bleed_ms: Option<f64>,
    pub ready_ms: Option<f64>,
    pub pulse_cycles: Option<f64>,
    pub metric_reveal_delay_ms: Option<f64>,
    pub metric_stagger_ms: Option<f64>,
    pub button_grace_ms: Option<f64>,
}

impl TimingOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Absolute phase boundaries, measured from run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSchedule {
    pub layer_count: usize,
    /// End of setup / start of bleed (`layer_draw + (L-1) * stagger`, or 0).
    #[serde(serialize_with = "millis::serialize")]
    pub setup_end: Duration,
    /// End of bleed / start of ready.
    #[serde(serialize_with = "millis::serialize")]
    pub bleed_end: Duration,
    /// End of ready / start of complete.
    #[serde(serialize_with = "millis::serialize")]
    pub total: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn default_four_layer_schedule() {
        let s = TimingConfig::default().schedule(4);
        assert_eq!(s.setup_end, ms(6500));
        assert_eq!(s.bleed_end, ms(9500));
        assert_eq!(s.total, ms(11500));
    }

    #[test]
    fn zero_layers_skip_setup() {
        let s = TimingConfig::default().schedule(0);
        assert_eq!(s.setup_end, Duration::ZERO);
        assert_eq!(s.bleed_end, ms(3000));
        assert_eq!(s.total, ms(5000));
    }

    #[test]
    fn single_layer_setup_is_draw_duration() {
        let s = TimingConfig::default().schedule(1);
        assert_eq!(s.setup_end, ms(2000));
    }

    #[test]
    fn zero_and_negative_durations_floor() {
        let cfg = TimingConfig::default().with_overrides(&TimingOverrides {
            layer_draw_ms: Some(0.0),
            layer_stagger_ms: Some(-50.0),
            bleed_ms: Some(-1.0),
            ready_ms: Some(f64::NAN),
            pulse_cycles: Some(-2.0),
            ..TimingOverrides::default()
        });
        assert_eq!(cfg.layer_draw, MIN_DURATION);
        assert_eq!(cfg.layer_stagger, Duration::ZERO);
        assert_eq!(cfg.bleed, MIN_DURATION);
        assert_eq!(cfg.ready, MIN_DURATION);
        assert_eq!(cfg.pulse_cycles, 0.0);
        let s = cfg.schedule(3);
        assert_eq!(s.total, ms(3));
    }

    #[test]
    fn overrides_only_touch_named_fields() {
        let cfg = TimingConfig::default().with_overrides(&TimingOverrides {
            bleed_ms: Some(1234.0),
            ..TimingOverrides::default()
        });
        assert_eq!(cfg.bleed, ms(1234));
        assert_eq!(cfg.layer_draw, ms(2000));
        assert!(TimingOverrides::default().is_empty());
    }

    #[test]
    fn timing_serializes_as_millis() {
        let json = serde_json::to_value(TimingConfig::default()).unwrap();
        assert_eq!(json["layer_draw"], 2000.0);
        let back: TimingConfig =
            serde_json::from_str(r#"{"layer_draw": 500, "bleed": -3}"#).unwrap();
        assert_eq!(back.layer_draw, ms(500));
        assert_eq!(back.bleed, Duration::ZERO);
        assert_eq!(back.normalized().bleed, MIN_DURATION);
        assert_eq!(back.ready, ms(2000));
    }

    #[test]
    fn duration_from_ms_rejects_garbage() {
        assert_eq!(duration_from_ms(f64::INFINITY), Duration::ZERO);
        assert_eq!(duration_from_ms(-1.0), Duration::ZERO);
        assert_eq!(duration_from_ms(1.5), Duration::from_micros(1500));
        assert_eq!(duration_from_ms(1234.0), ms(1234));
    }
}
