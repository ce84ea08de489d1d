#![forbid(unsafe_code)]

//! Particle field that streams along link curves.
//!
//! # Invariants
//!
//! 1. Every particle's `t` is in `[0, 1)` after any operation.
//! 2. The particle set is rebuilt only when the link-set signature changes;
//!    geometry-only changes keep every particle's phase.
//! 3. `loss` links own no particles.
//!
//! # Failure Modes
//!
//! - A link index that no longer exists (stale particle after a shrink that
//!   kept the signature) is skipped when drawing. This cannot happen through
//!   [`ParticleSimulation::sync`] but keeps `sprites` total.

use flowcast_core::{CubicBezier, LinkKind};
use flowcast_layout::{DiagramLayout, LinkSetSignature};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};
use web_time::Duration;

use crate::ParticleConfig;

/// One marker in the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Index into the layout's link list.
    pub link: usize,
    /// Curve parameter in `[0, 1)`.
    pub t: f64,
    /// Advance per reference frame.
    pub speed: f64,
    pub radius: f64,
    /// Signed distance from the curve along its normal, in pixels.
    pub offset: f64,
    pub brightness: f64,
}

/// A particle resolved to screen space for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub brightness: f64,
    pub kind: LinkKind,
    pub link: usize,
}

#[derive(Debug, Clone, Copy)]
struct Track {
    curve: CubicBezier,
    kind: LinkKind,
}

/// What [`ParticleSimulation::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The link set changed; particles were respawned.
    Reseeded,
    /// Same link set; curves were refreshed in place.
    Updated,
}

/// Live particle set bound to one diagram's links.
#[derive(Debug, Clone)]
pub struct ParticleSimulation {
    config: ParticleConfig,
    particles: Vec<Particle>,
    tracks: Vec<Track>,
    signature: Option<LinkSetSignature>,
    reseeds: u64,
}

impl ParticleSimulation {
    #[must_use]
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            tracks: Vec::new(),
            signature: None,
            reseeds: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// How many times the field has been respawned.
    #[must_use]
    pub fn reseed_count(&self) -> u64 {
        self.reseeds
    }

    #[must_use]
    pub fn signature(&self) -> Option<LinkSetSignature> {
        self.signature
    }

    /// Bind to `layout`, reseeding only if its link set differs from the
    /// one currently bound.
    pub fn sync(&mut self, layout: &DiagramLayout) -> SyncOutcome {
        self.tracks = layout
            .links
            .iter()
            .map(|l| Track {
                curve: l.curve,
                kind: l.kind,
            })
            .collect();
        if self.signature == Some(layout.signature) {
            trace!(links = self.tracks.len(), "particle curves refreshed");
            return SyncOutcome::Updated;
        }
        self.reseed(layout);
        SyncOutcome::Reseeded
    }

    fn reseed(&mut self, layout: &DiagramLayout) {
        let seed = self.config.seed.unwrap_or(layout.signature.0);
        let mut rng = SmallRng::seed_from_u64(seed);
        let cfg = &self.config;
        self.particles.clear();
        for (index, link) in layout.links.iter().enumerate() {
            if !link.kind.carries_flow() {
                continue;
            }
            let half = link.thickness / 2.0;
            for _ in 0..cfg.count_for(link.value) {
                let t: f64 = rng.random();
                self.particles.push(Particle {
                    link: index,
                    t: wrap_unit(t),
                    speed: between(&mut rng, cfg.min_speed, cfg.max_speed),
                    radius: between(&mut rng, cfg.min_radius, cfg.max_radius),
                    offset: between(&mut rng, -1.0, 1.0) * half * cfg.spread,
                    brightness: between(&mut rng, cfg.min_brightness, cfg.max_brightness),
                });
            }
        }
        self.signature = Some(layout.signature);
        self.reseeds += 1;
        debug!(
            particles = self.particles.len(),
            links = layout.links.len(),
            seed,
            "particle field reseeded"
        );
    }

    /// Drop every particle and forget the bound link set.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.tracks.clear();
        self.signature = None;
    }

    /// Advance by `frames` reference frames, wrapping past the curve end.
    pub fn advance(&mut self, frames: f64) {
        if !frames.is_finite() || frames <= 0.0 {
            return;
        }
        for p in &mut self.particles {
            p.t = wrap_unit(p.t + p.speed * frames);
        }
    }

    /// Advance by a host delta and return this frame's draw list.
    pub fn step(&mut self, dt: Duration) -> Vec<ParticleSprite> {
        self.advance(self.config.frames_for(dt));
        self.sprites()
    }

    /// Like [`step`](Self::step), keeping only particles whose link passes
    /// `visible`.
    pub fn step_filtered(
        &mut self,
        dt: Duration,
        visible: impl Fn(usize) -> bool,
    ) -> Vec<ParticleSprite> {
        self.advance(self.config.frames_for(dt));
        self.sprites_where(visible)
    }

    /// Current positions without advancing.
    #[must_use]
    pub fn sprites(&self) -> Vec<ParticleSprite> {
        self.sprites_where(|_| true)
    }

    #[must_use]
    pub fn sprites_where(&self, visible: impl Fn(usize) -> bool) -> Vec<ParticleSprite> {
        self.particles
            .iter()
            .filter(|p| visible(p.link))
            .filter_map(|p| {
                let track = self.tracks.get(p.link)?;
                let at = track.curve.point_at(p.t);
                let n = track.curve.normal_at(p.t);
                Some(ParticleSprite {
                    x: at.x + n.x * p.offset,
                    y: at.y + n.y * p.offset,
                    radius: p.radius,
                    brightness: p.brightness,
                    kind: track.kind,
                    link: p.link,
                })
            })
            .collect()
    }
}

impl Default for ParticleSimulation {
    fn default() -> Self {
        Self::new(ParticleConfig::default())
    }
}

fn between(rng: &mut SmallRng, lo: f64, hi: f64) -> f64 {
    let u: f64 = rng.random();
    lo + (hi - lo) * u
}

/// Map any finite value into `[0, 1)`.
fn wrap_unit(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let w = t.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcast_core::{DiagramSpec, Link, Node};
    use flowcast_layout::{LayoutConfig, layout};

    fn spec() -> DiagramSpec {
        DiagramSpec::new(
            vec![
                Node::new("a", 0, 100.0),
                Node::new("b", 1, 60.0),
                Node::new("c", 1, 40.0),
            ],
            vec![
                Link::new("a", "b", 60.0),
                Link::new("a", "c", 40.0).kind(LinkKind::Loss),
            ],
        )
    }

    #[test]
    fn loss_links_get_no_particles() {
        let l = layout(&spec(), &LayoutConfig::default(), 800.0, 400.0);
        let mut sim = ParticleSimulation::default();
        sim.sync(&l);
        assert_eq!(sim.len(), 8);
        assert!(sim.particles().iter().all(|p| p.link == 0));
    }

    #[test]
    fn resize_keeps_phase() {
        let cfg = LayoutConfig::default();
        let mut sim = ParticleSimulation::default();
        assert_eq!(sim.sync(&layout(&spec(), &cfg, 800.0, 400.0)), SyncOutcome::Reseeded);
        sim.advance(3.0);
        let before: Vec<f64> = sim.particles().iter().map(|p| p.t).collect();
        let bigger = layout(&spec(), &cfg, 1400.0, 900.0);
        assert_eq!(sim.sync(&bigger), SyncOutcome::Updated);
        let after: Vec<f64> = sim.particles().iter().map(|p| p.t).collect();
        assert_eq!(before, after);
        assert_eq!(sim.reseed_count(), 1);
        // Sprites now sit on the new curves.
        let s = sim.sprites()[0];
        assert!(s.x > 0.0 && s.x <= 1400.0);
    }

    #[test]
    fn link_set_change_reseeds() {
        let cfg = LayoutConfig::default();
        let mut sim = ParticleSimulation::default();
        sim.sync(&layout(&spec(), &cfg, 800.0, 400.0));
        let mut other = spec();
        other.links.push(Link::new("b", "c", 16.0));
        assert_eq!(sim.sync(&layout(&other, &cfg, 800.0, 400.0)), SyncOutcome::Reseeded);
        assert_eq!(sim.len(), 10);
        assert_eq!(sim.reseed_count(), 2);
    }

    #[test]
    fn same_diagram_same_field() {
        let l = layout(&spec(), &LayoutConfig::default(), 800.0, 400.0);
        let mut a = ParticleSimulation::default();
        let mut b = ParticleSimulation::default();
        a.sync(&l);
        b.sync(&l);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn step_scales_by_frame_time_and_caps() {
        let l = layout(&spec(), &LayoutConfig::default(), 800.0, 400.0);
        let mut sim = ParticleSimulation::new(ParticleConfig {
            min_speed: 0.01,
            max_speed: 0.01,
            ..ParticleConfig::default()
        });
        sim.sync(&l);
        let t0 = sim.particles()[0].t;
        sim.step(Duration::from_secs(10));
        let expected = wrap_unit(t0 + 0.04);
        assert!((sim.particles()[0].t - expected).abs() < 1e-9);
    }

    #[test]
    fn filter_hides_links() {
        let l = layout(&spec(), &LayoutConfig::default(), 800.0, 400.0);
        let mut sim = ParticleSimulation::default();
        sim.sync(&l);
        assert!(sim.step_filtered(Duration::ZERO, |link| link != 0).is_empty());
    }

    #[test]
    fn clear_forgets_signature() {
        let l = layout(&spec(), &LayoutConfig::default(), 800.0, 400.0);
        let mut sim = ParticleSimulation::default();
        sim.sync(&l);
        sim.clear();
        assert!(sim.is_empty());
        assert_eq!(sim.sync(&l), SyncOutcome::Reseeded);
    }

    #[test]
    fn wrap_unit_handles_edges() {
        assert_eq!(wrap_unit(1.0), 0.0);
        assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
        assert_eq!(wrap_unit(f64::NAN), 0.0);
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
    }
}
