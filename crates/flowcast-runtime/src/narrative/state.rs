#![forbid(unsafe_code)]

use flowcast_core::{Callout, NarrativeBucket};
use serde::Serialize;
use web_time::Duration;

use super::phase::{NarrativePhase, Variant};

/// Everything the render surface and surrounding chrome need for one frame.
///
/// Derived from elapsed time (or external progress) on every sample and
/// never mutated by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeState {
    pub phase: NarrativePhase,
    /// Elapsed run time the state was derived from.
    #[serde(serialize_with = "serialize_ms")]
    pub elapsed: Duration,
    /// Draw progress per layer, in `[0, 1]`.
    pub layer_progress: Vec<f64>,
    /// Layers with progress above zero, ascending.
    pub visible_layers: Vec<usize>,
    pub loss_highlight: bool,
    /// Bleed pulse in `[0, 1]`; exactly zero outside bleed.
    pub pulse: f64,
    pub anchored_metric_visible: bool,
    /// One flag per summary metric.
    pub metrics_visible: Vec<bool>,
    pub insight_visible: bool,
    pub action_ready: bool,
    pub bucket: Option<NarrativeBucket>,
    /// Progress within the current bucket, in `[0, 1]`.
    pub bucket_progress: f64,
    pub header: Option<String>,
    pub callouts: Vec<Callout>,
}

fn serialize_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(flowcast_core::duration_ms(*d))
}

impl NarrativeState {
    /// Nothing visible yet.
    #[must_use]
    pub fn idle(variant: Variant, layer_count: usize, metric_count: usize) -> Self {
        Self {
            phase: NarrativePhase::idle(variant),
            elapsed: Duration::ZERO,
            layer_progress: vec![0.0; layer_count],
            visible_layers: Vec::new(),
            loss_highlight: false,
            pulse: 0.0,
            anchored_metric_visible: false,
            metrics_visible: vec![false; metric_count],
            insight_visible: false,
            action_ready: false,
            bucket: None,
            bucket_progress: 0.0,
            header: None,
            callouts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_layer_visible(&self, layer: usize) -> bool {
        self.layer_progress.get(layer).is_some_and(|&p| p > 0.0)
    }

    /// Draw progress of `layer`; layers beyond the known count report 0.
    #[must_use]
    pub fn progress_of(&self, layer: usize) -> f64 {
        self.layer_progress.get(layer).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_layer_drawn(&self, layer: usize) -> bool {
        self.progress_of(layer) >= 1.0
    }

    /// Layer highlighted as "currently drawing".
    #[must_use]
    pub fn active_layer(&self) -> Option<usize> {
        self.phase.setup_layer()
    }

    #[must_use]
    pub fn visible_metric_count(&self) -> usize {
        self.metrics_visible.iter().filter(|v| **v).count()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}
