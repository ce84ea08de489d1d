//! Shared flags and file loading for the subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use flowcast::FlowcastConfig;
use flowcast_core::{DiagramSpec, NarrativeScript, TimingOverrides};
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// Viewport flags; each one overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewportArgs {
    /// Viewport width in CSS pixels.
    #[arg(long)]
    pub width: Option<f64>,

    /// Viewport height in CSS pixels.
    #[arg(long)]
    pub height: Option<f64>,

    /// Device pixel ratio of the target display.
    #[arg(long)]
    pub dpr: Option<f64>,
}

impl ViewportArgs {
    pub fn apply(&self, config: &mut FlowcastConfig) {
        if let Some(w) = self.width {
            config.viewport.width = w;
        }
        if let Some(h) = self.height {
            config.viewport.height = h;
        }
        if let Some(dpr) = self.dpr {
            config.viewport.device_pixel_ratio = dpr;
        }
    }
}

/// Millisecond timing overrides for the before reveal.
#[derive(Debug, Clone, Default, Args)]
pub struct TimingArgs {
    #[arg(long = "layer-draw-ms")]
    pub layer_draw_ms: Option<f64>,

    #[arg(long = "layer-stagger-ms")]
    pub layer_stagger_ms: Option<f64>,

    #[arg(long = "bleed-ms")]
    pub bleed_ms: Option<f64>,

    #[arg(long = "ready-ms")]
    pub ready_ms: Option<f64>,

    #[arg(long = "pulse-cycles")]
    pub pulse_cycles: Option<f64>,
}

impl TimingArgs {
    #[must_use]
    pub fn overrides(&self) -> TimingOverrides {
        TimingOverrides {
            layer_draw_ms: self.layer_draw_ms,
            layer_stagger_ms: self.layer_stagger_ms,
            bleed_ms: self.bleed_ms,
            ready_ms: self.ready_ms,
            pulse_cycles: self.pulse_cycles,
            ..TimingOverrides::default()
        }
    }
}

/// Load the config file, or defaults when none is given.
///
/// Out-of-range values are reported and rendered around, not fatal.
pub fn load_config(path: Option<&Path>) -> Result<FlowcastConfig> {
    let Some(path) = path else {
        return Ok(FlowcastConfig::default());
    };
    let config = FlowcastConfig::load(path)?;
    for problem in config.validate() {
        warn!(path = %path.display(), %problem, "config value out of range");
    }
    Ok(config)
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_diagram(path: &Path) -> Result<DiagramSpec> {
    let spec = DiagramSpec::from_json_str(&read_text(path)?)?;
    debug!(
        path = %path.display(),
        nodes = spec.nodes.len(),
        links = spec.links.len(),
        "diagram loaded"
    );
    Ok(spec)
}

pub fn read_script(path: Option<&Path>) -> Result<NarrativeScript> {
    match path {
        Some(path) => Ok(NarrativeScript::from_json_str(&read_text(path)?)?),
        None => Ok(NarrativeScript::default()),
    }
}

/// Write to `path`, or stdout when absent.
pub fn write_output(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            debug!(path = %path.display(), bytes = text.len(), "output written");
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
