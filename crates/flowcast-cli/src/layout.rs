//! `flowcast layout`: node boxes for a viewport, as JSON.

use std::path::PathBuf;

use clap::Args;
use flowcast::FlowcastConfig;
use flowcast_core::DiagramSpec;
use flowcast_layout::{NodePositions, layout};
use serde::Serialize;
use tracing::warn;

use crate::error::{CliError, Result};
use crate::input::{ViewportArgs, load_config, read_diagram, write_output};

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Diagram JSON with `nodes` and `links`.
    pub diagram: PathBuf,

    /// Config file (.toml or .json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub width: f64,
    pub height: f64,
    pub layer_count: usize,
    pub dropped_links: usize,
    pub nodes: NodePositions,
}

pub fn run_layout(args: LayoutArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.viewport.apply(&mut config);
    let spec = read_diagram(&args.diagram)?;
    let report = layout_report(&config, &spec)?;
    write_output(args.output.as_ref(), &serde_json::to_string_pretty(&report)?)
}

pub fn layout_report(config: &FlowcastConfig, spec: &DiagramSpec) -> Result<LayoutReport> {
    let v = config.viewport;
    if !(v.width.is_finite() && v.width > 0.0 && v.height.is_finite() && v.height > 0.0) {
        return Err(CliError::invalid(format!(
            "viewport {}x{} must be positive",
            v.width, v.height
        )));
    }
    let computed = layout(spec, &config.layout, v.width, v.height);
    if computed.dropped_links > 0 {
        warn!(dropped = computed.dropped_links, "links referencing unknown nodes were skipped");
    }
    Ok(LayoutReport {
        width: v.width,
        height: v.height,
        layer_count: computed.layer_count,
        dropped_links: computed.dropped_links,
        nodes: computed.positions(),
    })
}
