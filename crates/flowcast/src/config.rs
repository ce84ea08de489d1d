#![forbid(unsafe_code)]

//! Grouped configuration loaded from TOML or JSON.
//!
//! Every section is optional; missing keys take their defaults. Durations
//! are written in milliseconds.
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 720
//!
//! [narrative.timing]
//! layer_draw = 1200
//! bleed = 2500
//!
//! [particles]
//! seed = 7
//! ```

use std::path::Path;

use flowcast_core::TimingOverrides;
use flowcast_fx::ParticleConfig;
use flowcast_layout::LayoutConfig;
use flowcast_render::RenderConfig;
use flowcast_runtime::{NarrativeConfig, Variant};
use flowcast_web::RunnerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Initial viewport for offline rendering and hosts without a size yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            device_pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowcastConfig {
    pub viewport: ViewportConfig,
    pub variant: Variant,
    pub narrative: NarrativeConfig,
    pub layout: LayoutConfig,
    pub particles: ParticleConfig,
    pub render: RenderConfig,
}

impl FlowcastConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse {
            format: "toml",
            message: e.to_string(),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse {
            format: "json",
            message: e.to_string(),
        })
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match ext.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&text)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), then reject out-of-range values.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        let problems = config.validate();
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Human-readable problems; empty when everything is in range.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let v = &self.viewport;
        if !(v.width.is_finite() && v.width > 0.0 && v.height.is_finite() && v.height > 0.0) {
            problems.push(format!(
                "viewport {}x{} must be positive and finite",
                v.width, v.height
            ));
        }
        if !(v.device_pixel_ratio.is_finite() && v.device_pixel_ratio > 0.0) {
            problems.push(format!(
                "viewport.device_pixel_ratio = {} must be positive",
                v.device_pixel_ratio
            ));
        }
        problems.extend(self.runner_config().validate());
        problems
    }

    /// Layer millisecond overrides (e.g. from CLI flags) onto the timing.
    pub fn apply_timing_overrides(&mut self, overrides: &TimingOverrides) {
        self.narrative.timing = self.narrative.timing.with_overrides(overrides);
    }

    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            layout: self.layout.clone(),
            particles: self.particles.clone(),
            narrative: self.narrative.clone(),
            render: self.render.clone(),
        }
    }
}
