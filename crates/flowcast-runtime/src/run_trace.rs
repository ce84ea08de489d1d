#![forbid(unsafe_code)]

//! Run-scoped narrative timeline sinks.
//!
//! The controller reports lifecycle edges (run start, phase entry, skip,
//! finish, cancellation) to an injected [`TimelineSink`]. The default
//! [`TracingSink`] turns them into `tracing` events; [`MemorySink`] keeps
//! them for assertions; [`JsonlSink`] writes one JSON object per line.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::debug;

use crate::narrative::Variant;

/// Schema tag written on every JSONL line.
pub const TIMELINE_SCHEMA_VERSION: &str = "flowcast-timeline-v1";

/// Why a run stopped before reaching its terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Deactivated,
    Reset,
    VariantChanged,
    ContentChanged,
    Teardown,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deactivated => "deactivated",
            Self::Reset => "reset",
            Self::VariantChanged => "variant_changed",
            Self::ContentChanged => "content_changed",
            Self::Teardown => "teardown",
        }
    }
}

/// A lifecycle edge of one narrative run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    RunStarted {
        run: u64,
        variant: Variant,
        layer_count: usize,
        total_ms: f64,
    },
    PhaseEntered {
        run: u64,
        phase: String,
        elapsed_ms: f64,
    },
    Skipped {
        run: u64,
        from: String,
    },
    RunFinished {
        run: u64,
        elapsed_ms: f64,
    },
    RunCancelled {
        run: u64,
        reason: CancelReason,
    },
}

impl TimelineEvent {
    #[must_use]
    pub fn run(&self) -> u64 {
        match self {
            Self::RunStarted { run, .. }
            | Self::PhaseEntered { run, .. }
            | Self::Skipped { run, .. }
            | Self::RunFinished { run, .. }
            | Self::RunCancelled { run, .. } => *run,
        }
    }
}

/// Receives narrative lifecycle edges.
pub trait TimelineSink {
    fn record(&mut self, event: &TimelineEvent);
}

/// Emits each edge as a `debug` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TimelineSink for TracingSink {
    fn record(&mut self, event: &TimelineEvent) {
        match event {
            TimelineEvent::RunStarted {
                run,
                variant,
                layer_count,
                total_ms,
            } => debug!(run, %variant, layer_count, total_ms, "narrative.run_started"),
            TimelineEvent::PhaseEntered {
                run,
                phase,
                elapsed_ms,
            } => debug!(run, phase = %phase, elapsed_ms, "narrative.phase"),
            TimelineEvent::Skipped { run, from } => {
                debug!(run, from = %from, "narrative.skipped");
            }
            TimelineEvent::RunFinished { run, elapsed_ms } => {
                debug!(run, elapsed_ms, "narrative.run_finished");
            }
            TimelineEvent::RunCancelled { run, reason } => {
                debug!(run, reason = reason.as_str(), "narrative.run_cancelled");
            }
        }
    }
}

/// Keeps every event; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<TimelineEvent>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<TimelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Phase labels entered so far, in order.
    #[must_use]
    pub fn phases(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TimelineEvent::PhaseEntered { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl TimelineSink for MemorySink {
    fn record(&mut self, event: &TimelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

/// Writes one JSON object per event to `W`.
///
/// Write failures are logged once and counted; they never interrupt a run.
#[cfg(feature = "jsonl")]
#[derive(Debug)]
pub struct JsonlSink<W: std::io::Write> {
    writer: W,
    flush_on_write: bool,
    failed_writes: u64,
}

#[cfg(feature = "jsonl")]
impl<W: std::io::Write> JsonlSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            flush_on_write: true,
            failed_writes: 0,
        }
    }

    #[must_use]
    pub fn with_flush_on_write(mut self, enabled: bool) -> Self {
        self.flush_on_write = enabled;
        self
    }

    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, event: &TimelineEvent) -> std::io::Result<()> {
        #[derive(Serialize)]
        struct Line<'a> {
            schema: &'static str,
            #[serde(flatten)]
            event: &'a TimelineEvent,
        }
        let line = serde_json::to_string(&Line {
            schema: TIMELINE_SCHEMA_VERSION,
            event,
        })
        .map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        if self.flush_on_write {
            self.writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(feature = "jsonl")]
impl<W: std::io::Write> TimelineSink for JsonlSink<W> {
    fn record(&mut self, event: &TimelineEvent) {
        if let Err(err) = self.write_line(event) {
            if self.failed_writes == 0 {
                tracing::warn!(error = %err, "timeline sink write failed");
            }
            self.failed_writes += 1;
        }
    }
}
