#![forbid(unsafe_code)]

//! The narrative phase controller.
//!
//! # Invariants
//!
//! 1. Within a run, sampled phases never move backwards, even if the host
//!    clock does: elapsed time is held at its high-water mark.
//! 2. One activation edge starts at most one run; repeated `activate`
//!    calls while active are no-ops.
//! 3. Ending a run (deactivate, reset, content or variant change,
//!    teardown) cancels its frame loop, and that loop never ticks again.
//! 4. `skip_to_complete` yields the terminal state regardless of what came
//!    before.
//!
//! # Failure Modes
//!
//! - Non-finite external progress: ignored.
//! - External progress on the `before` variant: ignored (logged at `debug`).

use flowcast_core::{
    NarrativeBucket, NarrativeScript, PhaseSchedule, TimingConfig, duration_ms,
    visible_callout_count,
};
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, debug_span, trace};
use web_time::Duration;

use super::phase::{AfterPhase, BeforePhase, NarrativePhase, Variant};
use super::signals::{after_phase_for, before_phase_at, fraction, layer_progress, pulse_intensity};
use super::state::NarrativeState;
use crate::frame_loop::{FrameLoop, StartLatch};
use crate::run_trace::{CancelReason, TimelineEvent, TimelineSink, TracingSink};

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub timing: TimingConfig,
    /// Progress at which the `after` reveal moves from shift to result.
    pub result_threshold: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            result_threshold: 0.5,
        }
    }
}

impl NarrativeConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.result_threshold.is_finite() && (0.0..=1.0).contains(&self.result_threshold)) {
            problems.push(format!(
                "narrative.result_threshold = {} is outside [0, 1]",
                self.result_threshold
            ));
        }
        if !self.timing.pulse_cycles.is_finite() || self.timing.pulse_cycles < 0.0 {
            problems.push("narrative.timing.pulse_cycles must be a non-negative number".into());
        }
        problems
    }
}

#[derive(Debug)]
struct Run {
    id: u64,
    started_at: Duration,
    high_water: Duration,
    furthest: NarrativePhase,
    skipped: bool,
    finished: bool,
    span: Span,
}

/// Drives one narrative reveal.
pub struct NarrativeController {
    variant: Variant,
    config: NarrativeConfig,
    schedule: PhaseSchedule,
    script: NarrativeScript,
    layer_count: usize,
    metric_count: usize,
    has_anchored_metric: bool,
    latch: StartLatch,
    frame_loop: Option<FrameLoop>,
    run: Option<Run>,
    next_run_id: u64,
    external_progress: Option<f64>,
    sink: Box<dyn TimelineSink>,
}

impl std::fmt::Debug for NarrativeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeController")
            .field("variant", &self.variant)
            .field("layer_count", &self.layer_count)
            .field("schedule", &self.schedule)
            .field("active", &self.latch.is_armed())
            .field("run", &self.run.as_ref().map(|r| r.id))
            .field("external_progress", &self.external_progress)
            .finish_non_exhaustive()
    }
}

impl NarrativeController {
    #[must_use]
    pub fn new(variant: Variant, config: NarrativeConfig, layer_count: usize) -> Self {
        let mut config = config;
        config.timing = config.timing.normalized();
        let schedule = config.timing.schedule(layer_count);
        Self {
            variant,
            config,
            schedule,
            script: NarrativeScript::default(),
            layer_count,
            metric_count: 0,
            has_anchored_metric: false,
            latch: StartLatch::new(),
            frame_loop: None,
            run: None,
            next_run_id: 1,
            external_progress: None,
            sink: Box::new(TracingSink),
        }
    }

    /// Use `script` for headers and callouts; metric counts follow it.
    #[must_use]
    pub fn with_script(mut self, script: NarrativeScript) -> Self {
        self.metric_count = script.metric_count();
        self.has_anchored_metric = script.has_anchored_metric();
        self.script = script;
        self
    }

    /// Override the metric slots without a script.
    #[must_use]
    pub fn with_metrics(mut self, metric_count: usize, has_anchored_metric: bool) -> Self {
        self.metric_count = metric_count;
        self.has_anchored_metric = has_anchored_metric;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl TimelineSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    #[must_use]
    pub fn schedule(&self) -> PhaseSchedule {
        self.schedule
    }

    #[must_use]
    pub fn script(&self) -> &NarrativeScript {
        &self.script
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.latch.is_armed()
    }

    /// Identifier of the current run.
    #[must_use]
    pub fn run_id(&self) -> Option<u64> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Furthest phase reached in the current run, or idle.
    #[must_use]
    pub fn phase(&self) -> NarrativePhase {
        self.run
            .as_ref()
            .map_or(NarrativePhase::idle(self.variant), |r| r.furthest)
    }

    #[must_use]
    pub fn external_progress(&self) -> Option<f64> {
        self.external_progress
    }

    /// Whether the host should keep delivering frames to this controller.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_live)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a run at host time `now`, once per activation edge.
    ///
    /// Returns `false` if a run was already started by an earlier call.
    pub fn activate(&mut self, now: Duration) -> bool {
        if !self.latch.arm() {
            trace!(variant = %self.variant, "activate ignored; already running");
            return false;
        }
        self.begin_run(now);
        true
    }

    /// Alias of [`activate`](Self::activate).
    pub fn start(&mut self, now: Duration) -> bool {
        self.activate(now)
    }

    /// Stop the run and clear the latch so the next activation is fresh.
    pub fn deactivate(&mut self) {
        self.latch.clear();
        self.end_run(CancelReason::Deactivated);
    }

    /// Edge-triggered activation. Returns `true` when the state changed.
    pub fn set_active(&mut self, active: bool, now: Duration) -> bool {
        match (active, self.latch.is_armed()) {
            (true, false) => self.activate(now),
            (false, true) => {
                self.deactivate();
                true
            }
            _ => false,
        }
    }

    /// Return to idle. The next activation starts a new run.
    pub fn reset(&mut self) {
        self.latch.clear();
        self.external_progress = None;
        self.end_run(CancelReason::Reset);
    }

    /// Reset and immediately start a fresh run.
    pub fn restart(&mut self, now: Duration) {
        self.reset();
        self.activate(now);
    }

    /// Stop everything for good (view unmounted).
    pub fn teardown(&mut self) {
        self.latch.clear();
        self.external_progress = None;
        self.end_run(CancelReason::Teardown);
    }

    /// Swap in new content. An active controller restarts from zero.
    pub fn set_content(&mut self, layer_count: usize, script: NarrativeScript, now: Duration) {
        let was_active = self.latch.is_armed();
        self.end_run(CancelReason::ContentChanged);
        self.layer_count = layer_count;
        self.schedule = self.config.timing.schedule(layer_count);
        self.metric_count = script.metric_count();
        self.has_anchored_metric = script.has_anchored_metric();
        self.script = script;
        if was_active {
            self.begin_run(now);
        }
    }

    /// Switch variant. An active controller restarts from zero.
    pub fn set_variant(&mut self, variant: Variant, now: Duration) {
        if variant == self.variant {
            return;
        }
        let was_active = self.latch.is_armed();
        self.end_run(CancelReason::VariantChanged);
        self.external_progress = None;
        self.variant = variant;
        if was_active {
            self.begin_run(now);
        }
    }

    /// Feed build progress to the `after` variant.
    ///
    /// Progress is clamped to `[0, 1]` and never decreases. It may arrive
    /// before activation and survives content swaps and deactivation; only
    /// `reset`, `teardown` and `set_variant` clear it.
    pub fn set_external_progress(&mut self, progress: f64) {
        if self.variant != Variant::After {
            debug!(progress, "external progress ignored by the before variant");
            return;
        }
        if !progress.is_finite() {
            return;
        }
        let p = progress.clamp(0.0, 1.0);
        self.external_progress = Some(self.external_progress.map_or(p, |old| old.max(p)));
    }

    /// Jump to the terminal phase and return its state.
    ///
    /// Starts a run first if none is in progress.
    pub fn skip_to_complete(&mut self, now: Duration) -> NarrativeState {
        if self.run.is_none() {
            self.latch.arm();
            self.begin_run(now);
        }
        if let Some(run) = self.run.as_mut() {
            if !run.skipped {
                run.skipped = true;
                let from = run.furthest.label();
                let event = TimelineEvent::Skipped { run: run.id, from };
                let _enter = run.span.enter();
                self.sink.record(&event);
            }
        }
        if self.variant == Variant::After {
            self.external_progress = Some(1.0);
        }
        self.sample(now)
    }

    fn begin_run(&mut self, now: Duration) {
        let id = self.next_run_id;
        self.next_run_id += 1;
        let span = debug_span!(
            "narrative_run",
            run = id,
            variant = %self.variant,
            layers = self.layer_count
        );
        {
            let _enter = span.enter();
            self.sink.record(&TimelineEvent::RunStarted {
                run: id,
                variant: self.variant,
                layer_count: self.layer_count,
                total_ms: duration_ms(self.schedule.total),
            });
        }
        self.frame_loop = match self.variant {
            Variant::Before => Some(FrameLoop::start("narrative")),
            Variant::After => None,
        };
        self.run = Some(Run {
            id,
            started_at: now,
            high_water: Duration::ZERO,
            furthest: NarrativePhase::idle(self.variant),
            skipped: false,
            finished: false,
            span,
        });
    }

    fn end_run(&mut self, reason: CancelReason) {
        if let Some(mut l) = self.frame_loop.take() {
            l.cancel();
        }
        let Some(run) = self.run.take() else {
            return;
        };
        if !run.finished {
            let _enter = run.span.enter();
            self.sink.record(&TimelineEvent::RunCancelled { run: run.id, reason });
        }
    }

    // -----------------------------------------------------------------------
    // Sampling
    // -----------------------------------------------------------------------

    /// Derive the state for host time `now` and record any phase edges.
    pub fn sample(&mut self, now: Duration) -> NarrativeState {
        let Some(run) = self.run.as_ref() else {
            return self.idle_state();
        };
        let raw = now.checked_sub(run.started_at).unwrap_or(Duration::ZERO);
        let mut elapsed = raw.max(run.high_water);
        if run.skipped {
            elapsed = elapsed.max(self.schedule.total);
        }
        let state = match self.variant {
            Variant::Before => self.before_state_at(elapsed),
            Variant::After => self.after_state(self.external_progress, elapsed),
        };
        if let Some(l) = self.frame_loop.as_mut() {
            l.tick(now);
        }

        let Some(run) = self.run.as_mut() else {
            return state;
        };
        if raw < run.high_water {
            trace!(run = run.id, "host clock stepped backwards; holding elapsed");
        }
        run.high_water = elapsed;
        let _enter = run.span.enter();
        if state.phase > run.furthest {
            run.furthest = state.phase;
            self.sink.record(&TimelineEvent::PhaseEntered {
                run: run.id,
                phase: state.phase.label(),
                elapsed_ms: duration_ms(elapsed),
            });
        }
        if state.phase.is_terminal() && !run.finished {
            run.finished = true;
            self.sink.record(&TimelineEvent::RunFinished {
                run: run.id,
                elapsed_ms: duration_ms(elapsed),
            });
            if let Some(l) = self.frame_loop.as_mut() {
                l.finish();
            }
        }
        state
    }

    /// State of the current variant at `elapsed`, without touching the run.
    ///
    /// The `after` variant ignores `elapsed` and uses the latest progress.
    #[must_use]
    pub fn state_at(&self, elapsed: Duration) -> NarrativeState {
        match self.variant {
            Variant::Before => self.before_state_at(elapsed),
            Variant::After => self.after_state(self.external_progress, elapsed),
        }
    }

    fn idle_state(&self) -> NarrativeState {
        NarrativeState::idle(self.variant, self.layer_count, self.metric_count)
    }

    fn before_state_at(&self, elapsed: Duration) -> NarrativeState {
        let timing = &self.config.timing;
        let s = &self.schedule;
        let phase = before_phase_at(elapsed, timing, s);
        let layer_progress: Vec<f64> = (0..self.layer_count)
            .map(|i| layer_progress(elapsed, i, timing))
            .collect();
        let visible_layers = layer_progress
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > 0.0)
            .map(|(i, _)| i)
            .collect();

        let bleed_elapsed = elapsed.saturating_sub(s.setup_end);
        let ready_elapsed = elapsed.saturating_sub(s.bleed_end);
        let in_bleed = phase == BeforePhase::Bleed;
        let in_ready = phase == BeforePhase::Ready;
        let complete = phase == BeforePhase::Complete;
        let past_bleed = in_ready || complete;

        let metrics_visible = (0..self.metric_count)
            .map(|i| {
                let offset = timing
                    .metric_stagger
                    .saturating_mul(u32::try_from(i).unwrap_or(u32::MAX));
                complete || (in_ready && ready_elapsed > offset)
            })
            .collect();

        let bucket_progress = match phase {
            BeforePhase::Idle => 0.0,
            BeforePhase::Setup(_) => fraction(elapsed, s.setup_end),
            BeforePhase::Bleed => fraction(bleed_elapsed, timing.bleed),
            BeforePhase::Ready | BeforePhase::Complete => 1.0,
        };
        let phase = NarrativePhase::Before(phase);
        let (header, callouts) = self.resolve_text(phase.bucket(), bucket_progress);

        NarrativeState {
            phase,
            elapsed,
            layer_progress,
            visible_layers,
            loss_highlight: in_bleed || past_bleed,
            pulse: if in_bleed {
                pulse_intensity(bleed_elapsed, timing)
            } else {
                0.0
            },
            anchored_metric_visible: self.has_anchored_metric
                && ((in_bleed && bleed_elapsed > timing.metric_reveal_delay) || past_bleed),
            metrics_visible,
            insight_visible: past_bleed,
            action_ready: complete || (in_ready && ready_elapsed > timing.button_grace),
            bucket: phase.bucket(),
            bucket_progress,
            header,
            callouts,
        }
    }

    fn after_state(&self, progress: Option<f64>, elapsed: Duration) -> NarrativeState {
        let (phase, local) = after_phase_for(progress, self.config.result_threshold);
        if phase == AfterPhase::Idle {
            let mut idle = self.idle_state();
            idle.elapsed = elapsed;
            return idle;
        }
        let in_result = phase == AfterPhase::Result;
        let phase = NarrativePhase::After(phase);
        let (header, callouts) = self.resolve_text(phase.bucket(), local);
        NarrativeState {
            phase,
            elapsed,
            layer_progress: vec![1.0; self.layer_count],
            visible_layers: (0..self.layer_count).collect(),
            loss_highlight: false,
            pulse: 0.0,
            anchored_metric_visible: self.has_anchored_metric && in_result,
            metrics_visible: vec![in_result; self.metric_count],
            insight_visible: in_result,
            action_ready: progress.is_some_and(|p| p >= 1.0),
            bucket: phase.bucket(),
            bucket_progress: local,
            header,
            callouts,
        }
    }

    fn resolve_text(
        &self,
        bucket: Option<NarrativeBucket>,
        progress: f64,
    ) -> (Option<String>, Vec<flowcast_core::Callout>) {
        let Some(bucket) = bucket else {
            return (None, Vec::new());
        };
        let script = self.script.phase(bucket);
        let shown = visible_callout_count(progress, script.callouts.len());
        (script.header.clone(), script.callouts[..shown].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_trace::MemorySink;
    use flowcast_core::{AnchoredMetric, Callout, Metric, PhaseScript};
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn script() -> NarrativeScript {
        NarrativeScript {
            setup: PhaseScript {
                header: Some("Where leads come from".into()),
                callouts: vec![Callout::new("a", "one"), Callout::new("b", "two")],
            },
            bleed: PhaseScript {
                header: Some("Where they leak".into()),
                callouts: vec![Callout::new("lost", "leak")],
            },
            shift: PhaseScript {
                header: Some("Rewire".into()),
                callouts: vec![Callout::new("a", "x")],
            },
            result: PhaseScript {
                header: Some("Outcome".into()),
                callouts: vec![],
            },
            anchored_metric: Some(AnchoredMetric {
                node_id: "lost".into(),
                label: "Leak".into(),
                value: "40%".into(),
            }),
            metrics: vec![
                Metric {
                    label: "Won".into(),
                    value: "30".into(),
                },
                Metric {
                    label: "Lost".into(),
                    value: "40".into(),
                },
            ],
            insight: Some("Fix the leak".into()),
        }
    }

    fn before(layers: usize) -> NarrativeController {
        NarrativeController::new(Variant::Before, NarrativeConfig::default(), layers)
            .with_script(script())
    }

    #[test]
    fn idle_until_activated() {
        let mut c = before(4);
        let s = c.sample(ms(5000));
        assert!(s.phase.is_idle());
        assert!(!c.wants_frame());
    }

    #[test]
    fn activation_is_latched() {
        let mut c = before(4);
        assert!(c.activate(ms(100)));
        assert!(!c.activate(ms(900)));
        assert_eq!(c.run_id(), Some(1));
        let s = c.sample(ms(1700));
        assert_eq!(s.phase, NarrativePhase::Before(BeforePhase::Setup(1)));
    }

    #[test]
    fn deactivate_then_activate_restarts_at_zero() {
        let mut c = before(4);
        c.activate(ms(0));
        c.sample(ms(7000));
        c.deactivate();
        assert!(!c.wants_frame());
        c.activate(ms(10_000));
        assert_eq!(c.run_id(), Some(2));
        let s = c.sample(ms(10_000));
        assert_eq!(s.elapsed, Duration::ZERO);
        assert_eq!(s.phase, NarrativePhase::Before(BeforePhase::Setup(0)));
    }

    #[test]
    fn bleed_signals() {
        let c = before(4);
        let s = c.state_at(ms(6500));
        assert!(s.loss_highlight);
        assert!((s.pulse - 0.5).abs() < 1e-12);
        assert!(!s.anchored_metric_visible);
        let later = c.state_at(ms(6500 + 801));
        assert!(later.anchored_metric_visible);
        assert_eq!(later.header.as_deref(), Some("Where they leak"));
        assert_eq!(later.bucket, Some(NarrativeBucket::Bleed));
    }

    #[test]
    fn setup_callouts_stagger_by_progress() {
        let c = before(4);
        // setup_end = 6500; two callouts appear at 1/3 and 2/3.
        assert_eq!(c.state_at(ms(2000)).callouts.len(), 0);
        assert_eq!(c.state_at(ms(2200)).callouts.len(), 1);
        assert_eq!(c.state_at(ms(4400)).callouts.len(), 2);
    }

    #[test]
    fn ready_staggers_metrics_and_button() {
        let c = before(4);
        let at_ready = c.state_at(ms(9500));
        assert_eq!(at_ready.visible_metric_count(), 0);
        assert!(at_ready.insight_visible);
        assert!(!at_ready.action_ready);
        let s = c.state_at(ms(9500 + 301));
        assert_eq!(s.metrics_visible, vec![true, true]);
        let s = c.state_at(ms(9500 + 100));
        assert_eq!(s.metrics_visible, vec![true, false]);
        assert!(c.state_at(ms(9500 + 601)).action_ready);
        assert_eq!(c.state_at(ms(9500)).callouts.len(), 1);
    }

    #[test]
    fn skip_from_idle_yields_complete() {
        let mut c = before(4);
        let s = c.skip_to_complete(ms(42));
        assert_eq!(s.phase, NarrativePhase::Before(BeforePhase::Complete));
        assert_eq!(s.visible_layers, vec![0, 1, 2, 3]);
        assert!(s.layer_progress.iter().all(|p| *p == 1.0));
        assert!(s.action_ready);
        assert!(!c.wants_frame());
    }

    #[test]
    fn skip_mid_run_yields_complete() {
        let mut c = before(3);
        c.activate(ms(0));
        c.sample(ms(500));
        let s = c.skip_to_complete(ms(600));
        assert!(s.is_terminal());
        assert_eq!(s.visible_metric_count(), 2);
        assert!(c.sample(ms(700)).is_terminal());
    }

    #[test]
    fn backwards_clock_holds_phase() {
        let mut c = before(4);
        c.activate(ms(1000));
        let a = c.sample(ms(8000));
        let b = c.sample(ms(2000));
        assert_eq!(a.phase, b.phase);
        assert_eq!(b.elapsed, ms(7000));
    }

    #[test]
    fn sink_records_edges_in_order() {
        let sink = MemorySink::new();
        let mut c = before(2).with_sink(sink.clone());
        c.activate(ms(0));
        for t in (0..=9000).step_by(250) {
            c.sample(ms(t));
        }
        assert_eq!(
            sink.phases(),
            vec!["setup-0", "setup-1", "bleed", "ready", "complete"]
        );
        assert!(matches!(sink.events().last(), Some(TimelineEvent::RunFinished { .. })));
        assert!(!c.wants_frame());
    }

    #[test]
    fn deactivation_mid_run_is_reported() {
        let sink = MemorySink::new();
        let mut c = before(2).with_sink(sink.clone());
        c.activate(ms(0));
        c.sample(ms(100));
        c.deactivate();
        assert!(matches!(
            sink.events().last(),
            Some(TimelineEvent::RunCancelled {
                reason: CancelReason::Deactivated,
                ..
            })
        ));
    }

    #[test]
    fn content_change_restarts_active_run() {
        let mut c = before(4);
        c.activate(ms(0));
        c.sample(ms(7000));
        c.set_content(2, NarrativeScript::default(), ms(7000));
        assert_eq!(c.run_id(), Some(2));
        assert_eq!(c.schedule().total, ms(2000 + 1500 + 3000 + 2000));
        let s = c.sample(ms(7000));
        assert_eq!(s.phase, NarrativePhase::Before(BeforePhase::Setup(0)));
        assert!(!s.anchored_metric_visible);
    }

    #[test]
    fn after_variant_follows_progress() {
        let mut c = NarrativeController::new(Variant::After, NarrativeConfig::default(), 3)
            .with_script(script());
        c.activate(ms(0));
        assert!(!c.wants_frame());
        assert!(c.sample(ms(10)).phase.is_idle());

        c.set_external_progress(0.25);
        let s = c.sample(ms(20));
        assert_eq!(s.phase, NarrativePhase::After(AfterPhase::Shift));
        assert_eq!(s.visible_layers, vec![0, 1, 2]);
        assert_eq!(s.header.as_deref(), Some("Rewire"));
        assert_eq!(s.callouts.len(), 1);
        assert_eq!(s.visible_metric_count(), 0);

        c.set_external_progress(0.1);
        assert_eq!(c.external_progress(), Some(0.25));

        c.set_external_progress(1.0);
        let s = c.sample(ms(30));
        assert_eq!(s.phase, NarrativePhase::After(AfterPhase::Result));
        assert!(s.action_ready);
        assert!(s.anchored_metric_visible);
        assert_eq!(s.visible_metric_count(), 2);
    }

    #[test]
    fn before_variant_ignores_external_progress() {
        let mut c = before(2);
        c.set_external_progress(0.7);
        assert_eq!(c.external_progress(), None);
    }

    #[test]
    fn variant_switch_restarts() {
        let mut c = before(2);
        c.activate(ms(0));
        c.set_variant(Variant::After, ms(50));
        assert_eq!(c.variant(), Variant::After);
        assert_eq!(c.run_id(), Some(2));
        assert!(c.sample(ms(60)).phase.is_idle());
        assert!(!c.wants_frame());
    }

    #[test]
    fn zero_layers_start_in_bleed() {
        let mut c = before(0);
        c.activate(ms(0));
        let s = c.sample(ms(0));
        assert_eq!(s.phase, NarrativePhase::Before(BeforePhase::Bleed));
        assert!(s.visible_layers.is_empty());
    }
}
