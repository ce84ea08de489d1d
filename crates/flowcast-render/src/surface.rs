#![forbid(unsafe_code)]

//! The composed render surface: vector scene, raster particles and
//! overlays behind one handle.
//!
//! # Invariants
//!
//! 1. The vector scene is rebuilt only when a layout with different
//!    geometry is installed ([`RenderSurface::scene_builds`] counts it).
//! 2. Pointer events are resolved against the installed layout only, and
//!    only against nodes the last paint left visible. Before the first
//!    paint nothing is hittable.
//! 3. At most [`MAX_PENDING_EVENTS`] events wait for a drain; the oldest
//!    are dropped first.
//!
//! # Failure Modes
//!
//! - `paint` before any layout: the scene is empty, overlays are composed
//!   against an empty layout, particles still paint.

use std::collections::VecDeque;

use flowcast_core::{NarrativeScript, Point};
use flowcast_fx::ParticleSprite;
use flowcast_layout::DiagramLayout;
use flowcast_runtime::NarrativeState;
use serde::Serialize;
use tracing::{debug, trace};

use crate::hit::{NodeEvent, PointerTracker};
use crate::overlay::OverlaySet;
use crate::raster::{RasterFrame, RasterSurface, SurfaceError};
use crate::vector::VectorScene;
use crate::{Emphasis, Palette, RenderConfig};

/// Events kept between drains before the oldest are discarded.
pub const MAX_PENDING_EVENTS: usize = 64;

/// Output of one repaint.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFrame {
    pub raster: RasterFrame,
    pub overlays: OverlaySet,
}

/// Hover and click surfaced to the host since the last drain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointerEvents {
    pub events: Vec<NodeEvent>,
}

#[derive(Debug, Clone)]
pub struct RenderSurface {
    palette: Palette,
    config: RenderConfig,
    layout: DiagramLayout,
    scene: VectorScene,
    raster: RasterSurface,
    pointer: PointerTracker,
    pending: VecDeque<NodeEvent>,
    dropped_events: u64,
    scene_builds: u64,
}

impl RenderSurface {
    #[must_use]
    pub fn new(palette: Palette, config: RenderConfig) -> Self {
        let layout = DiagramLayout::empty(0.0, 0.0);
        let scene = VectorScene::build(&layout, &palette, &config);
        Self {
            palette,
            config,
            layout,
            scene,
            raster: RasterSurface::new(),
            pointer: PointerTracker::new(),
            pending: VecDeque::new(),
            dropped_events: 0,
            scene_builds: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &DiagramLayout {
        &self.layout
    }

    #[must_use]
    pub fn scene(&self) -> &VectorScene {
        &self.scene
    }

    #[must_use]
    pub fn raster(&self) -> &RasterSurface {
        &self.raster
    }

    #[must_use]
    pub fn scene_builds(&self) -> u64 {
        self.scene_builds
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.pointer.hovered()
    }

    /// Events discarded because nobody drained the queue in time.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    fn queue(&mut self, event: NodeEvent) {
        if self.pending.len() >= MAX_PENDING_EVENTS {
            self.pending.pop_front();
            self.dropped_events += 1;
            trace!(dropped = self.dropped_events, "pointer event queue full");
        }
        self.pending.push_back(event);
    }

    /// Install a new layout. Returns `true` when the scene was rebuilt.
    pub fn set_layout(&mut self, layout: DiagramLayout) -> bool {
        if layout == self.layout && self.scene_builds > 0 {
            return false;
        }
        self.scene = VectorScene::build(&layout, &self.palette, &self.config);
        self.scene_builds += 1;
        self.layout = layout;
        if let Some(ev) = self.pointer.retain_known(&self.layout) {
            self.queue(ev);
        }
        debug!(
            nodes = self.layout.nodes.len(),
            links = self.layout.links.len(),
            builds = self.scene_builds,
            "vector scene rebuilt"
        );
        true
    }

    /// Resize the raster backing store.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> Result<bool, SurfaceError> {
        self.raster.resize(width, height, dpr)
    }

    /// Restyle the scene, repaint particles and compose overlays.
    pub fn paint(
        &mut self,
        state: &NarrativeState,
        script: &NarrativeScript,
        sprites: &[ParticleSprite],
    ) -> SurfaceFrame {
        let hover_hidden = self.pointer.hovered().is_some_and(|id| {
            self.layout
                .node(id)
                .is_none_or(|n| state.progress_of(n.layer) <= 0.0)
        });
        if hover_hidden {
            self.pointer_leave();
        }
        self.scene
            .restyle(state, self.pointer.hovered(), &self.config);
        let raster = self.raster.paint(sprites, &self.palette, &self.config);
        let overlays = OverlaySet::compose(&self.layout, state, script, &self.config);
        SurfaceFrame { raster, overlays }
    }

    #[must_use]
    pub fn to_svg(&self) -> String {
        self.scene.to_svg()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let scene = &self.scene;
        let events = self.pointer.pointer_move(
            &self.layout,
            Point::new(x, y),
            self.config.hit_margin,
            |i| is_drawn(scene, i),
        );
        for ev in events {
            self.queue(ev);
        }
    }

    pub fn pointer_leave(&mut self) {
        if let Some(ev) = self.pointer.pointer_leave() {
            self.queue(ev);
        }
    }

    /// Returns the clicked node id, if any.
    pub fn click(&mut self, x: f64, y: f64) -> Option<String> {
        let scene = &self.scene;
        let ev = self.pointer.click(
            &self.layout,
            Point::new(x, y),
            self.config.hit_margin,
            |i| is_drawn(scene, i),
        )?;
        let id = ev.node().to_string();
        self.queue(ev);
        Some(id)
    }

    /// Drain events queued since the last call.
    pub fn take_events(&mut self) -> PointerEvents {
        PointerEvents {
            events: self.pending.drain(..).collect(),
        }
    }
}

fn is_drawn(scene: &VectorScene, node: usize) -> bool {
    scene
        .nodes
        .get(node)
        .is_some_and(|n| !n.emphasis.contains(Emphasis::HIDDEN))
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new(Palette::default(), RenderConfig::default())
    }
}
