use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::layout::{LayoutArgs, run_layout};
use crate::render::{RenderArgs, run_render};
use crate::timeline::{TimelineArgs, run_timeline};

#[derive(Debug, Parser)]
#[command(
    name = "flowcast",
    about = "Offline tooling for animated, narrated flow diagrams",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write an SVG snapshot of a diagram at a moment of its reveal.
    Render(RenderArgs),

    /// Print the before reveal's phase schedule.
    Timeline(TimelineArgs),

    /// Print computed node positions as JSON.
    Layout(LayoutArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Timeline(args) => run_timeline(args),
        Commands::Layout(args) => run_layout(args),
    }
}
