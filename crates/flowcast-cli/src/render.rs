//! `flowcast render`: an SVG snapshot of a diagram at one moment.

use std::path::PathBuf;

use clap::Args;
use flowcast::FlowcastConfig;
use flowcast_core::{DiagramSpec, NarrativeScript, duration_from_ms};
use flowcast_runtime::Variant;
use flowcast_web::DiagramRunner;
use tracing::info;
use web_time::Duration;

use crate::error::{CliError, Result};
use crate::input::{
    TimingArgs, ViewportArgs, load_config, read_diagram, read_script, write_output,
};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Diagram JSON with `nodes` and `links`.
    pub diagram: PathBuf,

    /// Narrative script JSON.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Config file (.toml or .json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// `before` or `after`; defaults to the config's variant.
    #[arg(long)]
    pub variant: Option<Variant>,

    /// Elapsed run time to snapshot, in milliseconds.
    #[arg(long = "at-ms", conflicts_with = "complete")]
    pub at_ms: Option<f64>,

    /// Snapshot the fully revealed diagram.
    #[arg(long)]
    pub complete: bool,

    /// Build progress in [0, 1] for the after variant.
    #[arg(long)]
    pub progress: Option<f64>,

    #[command(flatten)]
    pub viewport: ViewportArgs,

    #[command(flatten)]
    pub timing: TimingArgs,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Which moment of the run to capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Moment {
    Elapsed(Duration),
    Complete,
}

impl RenderArgs {
    fn moment(&self) -> Result<Moment> {
        match self.at_ms {
            _ if self.complete => Ok(Moment::Complete),
            Some(ms) if !ms.is_finite() || ms < 0.0 => {
                Err(CliError::invalid(format!("--at-ms {ms} must be a non-negative number")))
            }
            Some(ms) => Ok(Moment::Elapsed(duration_from_ms(ms))),
            None => Ok(Moment::Complete),
        }
    }
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    let moment = args.moment()?;
    let mut config = load_config(args.config.as_deref())?;
    args.viewport.apply(&mut config);
    config.apply_timing_overrides(&args.timing.overrides());
    let variant = args.variant.unwrap_or(config.variant);
    let spec = read_diagram(&args.diagram)?;
    let script = read_script(args.script.as_deref())?;

    let svg = render_svg(&config, variant, spec, script, moment, args.progress)?;
    info!(%variant, ?moment, bytes = svg.len(), "rendered snapshot");
    write_output(args.output.as_ref(), &svg)
}

/// Drive a runner with synthetic host times and return its vector scene.
pub fn render_svg(
    config: &FlowcastConfig,
    variant: Variant,
    spec: DiagramSpec,
    script: NarrativeScript,
    moment: Moment,
    progress: Option<f64>,
) -> Result<String> {
    let mut runner = DiagramRunner::new(config.runner_config(), variant);
    let v = config.viewport;
    runner.resize(v.width, v.height, v.device_pixel_ratio)?;
    runner.load(spec, script, Duration::ZERO);
    runner.set_active(true, Duration::ZERO);
    if let Some(p) = progress {
        runner.set_external_progress(p);
    }

    let now = match moment {
        Moment::Complete => {
            runner.skip_to_complete(Duration::ZERO);
            Duration::ZERO
        }
        Moment::Elapsed(at) => at,
    };
    // The first frame only starts the particle clock.
    runner.frame(Duration::ZERO);
    if now > Duration::ZERO {
        runner.frame(now);
    }
    let svg = runner.svg();
    runner.teardown();
    Ok(svg)
}
