#![forbid(unsafe_code)]

//! Platform-independent runner core for one mounted diagram.
//!
//! This module holds the logic shared between the wasm-bindgen exports, the
//! CLI and native tests. No JS/WASM types here.
//!
//! # Invariants
//!
//! 1. Per frame: layout is current, particles step, the narrative is
//!    sampled, then everything paints from that one sampled state.
//! 2. A lens switch reseeds particles and restarts the narrative; a resize
//!    keeps particle phase.
//! 3. After [`DiagramRunner::teardown`] no loop ticks again and `frame`
//!    returns `None`.
//!
//! # Failure Modes
//!
//! - Unparseable diagram or script JSON: the previous content stays.
//! - Garbage viewport numbers: the previous size stays.
//! - Non-finite host timestamps: the frame is skipped; content, variant and
//!   skip requests reuse the last host time seen instead.

use flowcast_core::{DiagramSpec, NarrativeScript, SpecError, duration_from_ms, duration_ms};
use flowcast_fx::{ParticleConfig, ParticleSimulation, SyncOutcome};
use flowcast_layout::{DiagramLayout, LayoutConfig, NodePositions, layout};
use flowcast_render::{NodeEvent, Palette, RenderConfig, RenderSurface, SurfaceError, SurfaceFrame};
use flowcast_runtime::{FrameLoop, NarrativeConfig, NarrativeController, NarrativeState, Variant};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use web_time::Duration;

/// Everything a runner needs besides content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub layout: LayoutConfig,
    pub particles: ParticleConfig,
    pub narrative: NarrativeConfig,
    pub render: RenderConfig,
}

impl RunnerConfig {
    /// Parse from JSON; missing sections fall back to defaults.
    pub fn from_json_str(s: &str) -> Result<Self, RunnerError> {
        serde_json::from_str(s).map_err(|e| RunnerError::Config(e.to_string()))
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = self.layout.validate();
        problems.extend(self.particles.validate());
        problems.extend(self.narrative.validate());
        problems.extend(self.render.validate());
        problems
    }
}

/// Adapter-level failure. The runner keeps its previous state on error.
#[derive(Debug)]
pub enum RunnerError {
    Spec(SpecError),
    Config(String),
    Surface(SurfaceError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spec(e) => write!(f, "content error: {e}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::Surface(e) => write!(f, "surface error: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(e) => Some(e),
            Self::Config(_) => None,
            Self::Surface(e) => Some(e),
        }
    }
}

impl From<SpecError> for RunnerError {
    fn from(e: SpecError) -> Self {
        Self::Spec(e)
    }
}

impl From<SurfaceError> for RunnerError {
    fn from(e: SurfaceError) -> Self {
        Self::Surface(e)
    }
}

/// Host timestamp in milliseconds to a [`Duration`]; `None` for garbage.
#[must_use]
pub fn host_time(now_ms: f64) -> Option<Duration> {
    if !now_ms.is_finite() || now_ms < 0.0 {
        return None;
    }
    Some(duration_from_ms(now_ms))
}

/// One mounted diagram: layout, particles, narrative and render surface.
#[derive(Debug)]
pub struct DiagramRunner {
    config: RunnerConfig,
    spec: DiagramSpec,
    particles: ParticleSimulation,
    particle_loop: Option<FrameLoop>,
    narrative: NarrativeController,
    surface: RenderSurface,
    active: bool,
    torn_down: bool,
    last_state: NarrativeState,
    last_now: Duration,
    frames: u64,
}

impl DiagramRunner {
    #[must_use]
    pub fn new(config: RunnerConfig, variant: Variant) -> Self {
        let narrative = NarrativeController::new(variant, config.narrative.clone(), 0);
        let surface = RenderSurface::new(Palette::default(), config.render.clone());
        let particles = ParticleSimulation::new(config.particles.clone());
        Self {
            spec: DiagramSpec::default(),
            particles,
            particle_loop: None,
            last_state: NarrativeState::idle(variant, 0, 0),
            last_now: Duration::ZERO,
            narrative,
            surface,
            config,
            active: false,
            torn_down: false,
            frames: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &DiagramLayout {
        self.surface.layout()
    }

    #[must_use]
    pub fn particles(&self) -> &ParticleSimulation {
        &self.particles
    }

    #[must_use]
    pub fn narrative(&self) -> &NarrativeController {
        &self.narrative
    }

    #[must_use]
    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.narrative.variant()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// State painted by the most recent frame.
    #[must_use]
    pub fn narrative_state(&self) -> &NarrativeState {
        &self.last_state
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Node boxes keyed by id, for surrounding chrome.
    #[must_use]
    pub fn node_positions(&self) -> NodePositions {
        self.surface.layout().positions()
    }

    #[must_use]
    pub fn svg(&self) -> String {
        self.surface.to_svg()
    }

    /// Whether the host should keep requesting animation frames.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        !self.torn_down
            && self.active
            && (self.particle_loop.as_ref().is_some_and(FrameLoop::is_live)
                || self.narrative.wants_frame())
    }

    // -----------------------------------------------------------------------
    // Content and viewport
    // -----------------------------------------------------------------------

    /// Switch lens: install a new diagram and script.
    ///
    /// Particles are reseeded and an active narrative restarts at `now`.
    pub fn load(&mut self, spec: DiagramSpec, script: NarrativeScript, now: Duration) {
        if self.torn_down {
            return;
        }
        self.observe(now);
        self.spec = spec;
        self.relayout();
        self.particles.clear();
        self.particles.sync(self.surface.layout());
        let layers = self.surface.layout().layer_count;
        self.narrative.set_content(layers, script, now);
        self.last_state =
            NarrativeState::idle(self.variant(), layers, self.narrative.script().metric_count());
        if self.active {
            self.restart_particle_loop();
        }
        debug!(
            nodes = self.surface.layout().nodes.len(),
            layers,
            particles = self.particles.len(),
            "lens loaded"
        );
    }

    /// Parse and [`load`](Self::load) JSON content.
    pub fn load_json(&mut self, spec_json: &str, script_json: &str, now: Duration) -> Result<(), RunnerError> {
        let spec = DiagramSpec::from_json_str(spec_json)?;
        let script = if script_json.trim().is_empty() {
            NarrativeScript::default()
        } else {
            NarrativeScript::from_json_str(script_json)?
        };
        self.load(spec, script, now);
        Ok(())
    }

    /// [`load_json`](Self::load_json) with a raw millisecond timestamp.
    pub fn load_json_ms(
        &mut self,
        spec_json: &str,
        script_json: &str,
        now_ms: f64,
    ) -> Result<(), RunnerError> {
        let now = self.host_time_or_last(now_ms);
        self.load_json(spec_json, script_json, now)
    }

    /// Resize the viewport. Returns `Ok(true)` when anything changed.
    ///
    /// Layout is recomputed synchronously; particles keep their phase.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> Result<bool, RunnerError> {
        if self.torn_down {
            return Ok(false);
        }
        let changed = self.surface.resize(width, height, dpr)?;
        if !changed {
            return Ok(false);
        }
        self.relayout();
        if self.particles.sync(self.surface.layout()) == SyncOutcome::Reseeded {
            trace!("first sync after resize seeded particles");
        }
        Ok(true)
    }

    fn relayout(&mut self) {
        let (w, h) = self.surface.raster().css_size();
        let next = layout(&self.spec, &self.config.layout, w, h);
        if next.dropped_links > 0 {
            warn!(dropped = next.dropped_links, "links referencing unknown nodes were skipped");
        }
        self.surface.set_layout(next);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Edge-triggered activation gate.
    pub fn set_active(&mut self, active: bool, now: Duration) {
        if self.torn_down || active == self.active {
            return;
        }
        self.observe(now);
        self.active = active;
        if active {
            self.restart_particle_loop();
        } else if let Some(mut l) = self.particle_loop.take() {
            l.cancel();
        }
        self.narrative.set_active(active, now);
    }

    pub fn set_variant(&mut self, variant: Variant, now: Duration) {
        if self.torn_down {
            return;
        }
        self.observe(now);
        self.narrative.set_variant(variant, now);
    }

    /// [`set_variant`](Self::set_variant) with a raw millisecond timestamp.
    pub fn set_variant_ms(&mut self, variant: Variant, now_ms: f64) {
        let now = self.host_time_or_last(now_ms);
        self.set_variant(variant, now);
    }

    pub fn set_external_progress(&mut self, progress: f64) {
        self.narrative.set_external_progress(progress);
    }

    /// Jump the narrative to its terminal state.
    pub fn skip_to_complete(&mut self, now: Duration) -> NarrativeState {
        if self.torn_down {
            return self.last_state.clone();
        }
        self.observe(now);
        self.last_state = self.narrative.skip_to_complete(now);
        self.last_state.clone()
    }

    /// [`skip_to_complete`](Self::skip_to_complete) with a raw millisecond
    /// timestamp.
    pub fn skip_to_complete_ms(&mut self, now_ms: f64) -> NarrativeState {
        let now = self.host_time_or_last(now_ms);
        self.skip_to_complete(now)
    }

    /// Cancel every loop for good.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.active = false;
        if let Some(mut l) = self.particle_loop.take() {
            l.cancel();
        }
        self.narrative.teardown();
        self.particles.clear();
        debug!(frames = self.frames, "runner torn down");
    }

    /// Latest host time passed to any timed call.
    #[must_use]
    pub fn last_host_time(&self) -> Duration {
        self.last_now
    }

    fn observe(&mut self, now: Duration) {
        self.last_now = self.last_now.max(now);
    }

    fn host_time_or_last(&self, now_ms: f64) -> Duration {
        host_time(now_ms).unwrap_or_else(|| {
            warn!(
                now_ms,
                last_ms = duration_ms(self.last_now),
                "bad host timestamp; reusing the last one"
            );
            self.last_now
        })
    }

    fn restart_particle_loop(&mut self) {
        if let Some(mut old) = self.particle_loop.take() {
            old.cancel();
        }
        self.particle_loop = Some(FrameLoop::start("particles"));
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    /// Produce one frame at host time `now`.
    ///
    /// Returns `None` while inactive or after teardown.
    pub fn frame(&mut self, now: Duration) -> Option<SurfaceFrame> {
        if self.torn_down || !self.active {
            return None;
        }
        self.observe(now);
        let dt = self.particle_loop.as_mut()?.tick(now)?;
        self.particles.advance(self.particles.config().frames_for(dt));
        let state = self.narrative.sample(now);
        let layout = self.surface.layout();
        let sprites = self.particles.sprites_where(|link| {
            layout
                .links
                .get(link)
                .is_some_and(|l| state.is_layer_visible(layout.target_layer(l)))
        });
        let frame = self.surface.paint(&state, self.narrative.script(), &sprites);
        trace!(
            phase = %state.phase,
            sprites = sprites.len(),
            frame = self.frames,
            "frame painted"
        );
        self.last_state = state;
        self.frames += 1;
        Some(frame)
    }

    /// [`frame`](Self::frame) with a raw millisecond timestamp.
    pub fn frame_ms(&mut self, now_ms: f64) -> Option<SurfaceFrame> {
        self.frame(host_time(now_ms)?)
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.surface.pointer_move(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.surface.pointer_leave();
    }

    pub fn click(&mut self, x: f64, y: f64) -> Option<String> {
        self.surface.click(x, y)
    }

    /// Drain hover/leave/click notifications.
    pub fn take_events(&mut self) -> Vec<NodeEvent> {
        self.surface.take_events().events
    }
}

impl Drop for DiagramRunner {
    fn drop(&mut self) {
        self.teardown();
    }
}
