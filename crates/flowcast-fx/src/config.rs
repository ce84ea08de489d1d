#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Tuning for the flow particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Link value represented by one particle.
    pub particles_per_unit: f64,
    /// Upper bound on particles spawned for a single link.
    pub max_per_link: usize,
    /// Curve-parameter advance per reference frame.
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Largest perpendicular offset as a fraction of half the link thickness.
    pub spread: f64,
    pub min_brightness: f64,
    pub max_brightness: f64,
    /// Reference frame length that `speed` is expressed against.
    #[serde(skip, default = "reference_frame")]
    pub reference_frame: Duration,
    /// Most reference frames a single `step` may advance.
    pub max_catch_up_frames: f64,
    /// Fixed RNG seed; `None` derives one from the link-set signature.
    pub seed: Option<u64>,
}

fn reference_frame() -> Duration {
    Duration::from_micros(16_667)
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particles_per_unit: 8.0,
            max_per_link: 48,
            min_speed: 0.0015,
            max_speed: 0.005,
            min_radius: 1.2,
            max_radius: 2.6,
            spread: 0.7,
            min_brightness: 0.55,
            max_brightness: 1.0,
            reference_frame: reference_frame(),
            max_catch_up_frames: 4.0,
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// Number of particles spawned for a link carrying `value`.
    #[must_use]
    pub fn count_for(&self, value: f64) -> usize {
        let per_unit = if self.particles_per_unit.is_finite() && self.particles_per_unit > 0.0 {
            self.particles_per_unit
        } else {
            Self::default().particles_per_unit
        };
        if !value.is_finite() || value <= 0.0 {
            return 0;
        }
        let raw = (value / per_unit).ceil();
        if raw >= self.max_per_link as f64 {
            self.max_per_link
        } else {
            raw as usize
        }
    }

    /// Reference frames represented by a host delta, clamped to the
    /// catch-up limit.
    #[must_use]
    pub fn frames_for(&self, dt: Duration) -> f64 {
        let reference = self.reference_frame.as_secs_f64();
        if reference <= 0.0 {
            return 0.0;
        }
        let cap = if self.max_catch_up_frames.is_finite() {
            self.max_catch_up_frames.max(0.0)
        } else {
            Self::default().max_catch_up_frames
        };
        (dt.as_secs_f64() / reference).min(cap)
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.particles_per_unit.is_finite() && self.particles_per_unit > 0.0) {
            problems.push(format!(
                "particles.particles_per_unit = {} must be positive",
                self.particles_per_unit
            ));
        }
        for (name, lo, hi) in [
            ("speed", self.min_speed, self.max_speed),
            ("radius", self.min_radius, self.max_radius),
            ("brightness", self.min_brightness, self.max_brightness),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                problems.push(format!("particles.min_{name} must not exceed max_{name}"));
            }
        }
        if self.max_speed >= 1.0 {
            problems.push("particles.max_speed must stay below one curve per frame".to_string());
        }
        problems
    }
}
