//! `flowcast timeline`: the before reveal's schedule, replayed offline.
//!
//! The controller is stepped with synthetic frame times so the printed
//! phase edges are exactly what a host at that frame rate would observe.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use flowcast_core::{PhaseSchedule, duration_from_ms, duration_ms};
use flowcast_runtime::{
    JsonlSink, MemorySink, NarrativeConfig, NarrativeController, TIMELINE_SCHEMA_VERSION,
    TimelineEvent, TimelineSink, Variant,
};
use serde::Serialize;
use tracing::debug;
use web_time::Duration;

use crate::error::{CliError, Result};
use crate::input::{TimingArgs, load_config, write_output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimelineFormat {
    #[default]
    Text,
    Json,
    /// One timeline event per line.
    Jsonl,
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Number of diagram layers.
    #[arg(long, default_value_t = 4)]
    pub layers: usize,

    /// Config file (.toml or .json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub timing: TimingArgs,

    /// Simulated frame interval in milliseconds.
    #[arg(long = "step-ms", default_value_t = 16.0)]
    pub step_ms: f64,

    #[arg(long, value_enum, default_value_t = TimelineFormat::Text)]
    pub format: TimelineFormat,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Schedule plus the edges an offline replay produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineReport {
    pub schema: &'static str,
    pub schedule: PhaseSchedule,
    pub layer_starts_ms: Vec<f64>,
    pub events: Vec<TimelineEvent>,
}

pub fn run_timeline(args: TimelineArgs) -> Result<()> {
    if !(args.step_ms.is_finite() && args.step_ms > 0.0) {
        return Err(CliError::invalid(format!(
            "--step-ms {} must be a positive number",
            args.step_ms
        )));
    }
    let mut config = load_config(args.config.as_deref())?;
    if args.layers > config.layout.max_layers {
        return Err(CliError::invalid(format!(
            "--layers {} exceeds layout.max_layers ({})",
            args.layers, config.layout.max_layers
        )));
    }
    config.apply_timing_overrides(&args.timing.overrides());
    let step = duration_from_ms(args.step_ms);

    let text = match args.format {
        TimelineFormat::Jsonl => {
            // Streamed straight to the destination as edges happen.
            let writer: Box<dyn Write> = match &args.output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(std::io::stdout()),
            };
            replay(&config.narrative, args.layers, step, JsonlSink::new(writer));
            return Ok(());
        }
        TimelineFormat::Json => {
            let report = timeline_report(&config.narrative, args.layers, step);
            serde_json::to_string_pretty(&report)?
        }
        TimelineFormat::Text => format_text(&timeline_report(&config.narrative, args.layers, step)),
    };
    write_output(args.output.as_ref(), &text)
}

/// Replay one before run at `step` intervals into `sink`.
///
/// Returns the number of frames sampled.
pub fn replay(
    narrative: &NarrativeConfig,
    layers: usize,
    step: Duration,
    sink: impl TimelineSink + 'static,
) -> u64 {
    let mut controller =
        NarrativeController::new(Variant::Before, narrative.clone(), layers).with_sink(sink);
    let schedule = controller.schedule();
    // One extra step past the end so the finish edge is always observed.
    let horizon = schedule.total.saturating_add(step);
    controller.activate(Duration::ZERO);

    let mut now = Duration::ZERO;
    let mut frames = 0;
    while controller.wants_frame() && now <= horizon {
        controller.sample(now);
        frames += 1;
        now = now.saturating_add(step);
    }
    debug!(layers, frames, "timeline replayed");
    frames
}

#[must_use]
pub fn timeline_report(narrative: &NarrativeConfig, layers: usize, step: Duration) -> TimelineReport {
    let sink = MemorySink::new();
    replay(narrative, layers, step, sink.clone());
    let timing = narrative.timing.normalized();
    TimelineReport {
        schema: TIMELINE_SCHEMA_VERSION,
        schedule: timing.schedule(layers),
        layer_starts_ms: (0..layers).map(|i| duration_ms(timing.layer_start(i))).collect(),
        events: sink.events(),
    }
}

fn format_text(report: &TimelineReport) -> String {
    let s = &report.schedule;
    let mut out = String::new();
    let _ = writeln!(out, "layers      {}", s.layer_count);
    for (i, start) in report.layer_starts_ms.iter().enumerate() {
        let _ = writeln!(out, "  layer {i:<3} starts at {start:>8.0} ms");
    }
    let _ = writeln!(out, "bleed       {:>8.0} ms", duration_ms(s.setup_end));
    let _ = writeln!(out, "ready       {:>8.0} ms", duration_ms(s.bleed_end));
    let _ = writeln!(out, "complete    {:>8.0} ms", duration_ms(s.total));
    out.push('\n');
    for event in &report.events {
        match event {
            TimelineEvent::PhaseEntered { phase, elapsed_ms, .. } => {
                let _ = writeln!(out, "{elapsed_ms:>8.0} ms  {phase}");
            }
            TimelineEvent::RunFinished { elapsed_ms, .. } => {
                let _ = writeln!(out, "{elapsed_ms:>8.0} ms  finished");
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn phases(report: &TimelineReport) -> Vec<String> {
        report
            .events
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::PhaseEntered { phase, .. } => Some(phase.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_two_layer_replay_visits_every_phase() {
        let report = timeline_report(&NarrativeConfig::default(), 2, Duration::from_millis(16));
        assert_eq!(
            phases(&report),
            vec!["setup-0", "setup-1", "bleed", "ready", "complete"]
        );
        assert_eq!(report.layer_starts_ms, vec![0.0, 1500.0]);
        assert!(matches!(report.events.last(), Some(TimelineEvent::RunFinished { .. })));
    }

    #[test]
    fn coarse_steps_still_finish() {
        let report = timeline_report(&NarrativeConfig::default(), 4, Duration::from_secs(60));
        assert!(matches!(report.events.last(), Some(TimelineEvent::RunFinished { .. })));
    }

    #[test]
    fn jsonl_lines_carry_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline.jsonl");
        run_timeline(TimelineArgs {
            layers: 1,
            config: None,
            timing: TimingArgs::default(),
            step_ms: 100.0,
            format: TimelineFormat::Jsonl,
            output: Some(path.clone()),
        })
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().count() >= 5, "{text}");
        for line in text.lines() {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(v["schema"], TIMELINE_SCHEMA_VERSION);
        }
    }

    #[test]
    fn layer_count_past_the_layout_cap_is_rejected() {
        let err = run_timeline(TimelineArgs {
            layers: usize::MAX,
            config: None,
            timing: TimingArgs::default(),
            step_ms: 16.0,
            format: TimelineFormat::Text,
            output: None,
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn text_lists_boundaries() {
        let report = timeline_report(&NarrativeConfig::default(), 1, Duration::from_millis(50));
        let text = format_text(&report);
        assert!(text.contains("bleed"));
        assert!(text.contains("finished"));
    }
}
