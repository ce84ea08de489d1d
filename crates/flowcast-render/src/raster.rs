#![forbid(unsafe_code)]

//! DPR-aware raster layer for particles.
//!
//! # Invariants
//!
//! 1. Backing size is `round(css_size * dpr)` per axis.
//! 2. The DPR scale transform is applied once per effective resize, never
//!    per frame ([`RasterSurface::scale_applications`] counts it).
//! 3. Every painted frame starts with a full clear.

use std::fmt;

use flowcast_fx::ParticleSprite;
use tracing::debug;

use crate::{Palette, RenderConfig, Rgba};

/// Floats per particle in [`RasterFrame::to_buffer`]:
/// `x, y, core_radius, glow_radius, r, g, b, alpha`.
pub const PARTICLE_STRIDE: usize = 8;

/// Invalid surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceError {
    InvalidViewport { width: f64, height: f64 },
    InvalidPixelRatio(f64),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport {width}x{height}")
            }
            Self::InvalidPixelRatio(dpr) => write!(f, "invalid device pixel ratio {dpr}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// One raster drawing command, in CSS pixel space (the DPR transform is
/// already installed on the surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Clear,
    /// Radial gradient from `color` at the center to transparent at `radius`.
    Glow {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    /// Solid disc.
    Core {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
}

/// Draw list for one repaint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterFrame {
    pub ops: Vec<DrawOp>,
}

impl RasterFrame {
    /// Number of particles painted.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Core { .. }))
            .count()
    }

    /// Flatten glow/core pairs into a packed float buffer for a host canvas.
    #[must_use]
    pub fn to_buffer(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.particle_count() * PARTICLE_STRIDE);
        let mut glow_radius = 0.0;
        for op in &self.ops {
            match *op {
                DrawOp::Clear => {}
                DrawOp::Glow { radius, .. } => glow_radius = radius,
                DrawOp::Core {
                    x,
                    y,
                    radius,
                    color,
                } => {
                    let [r, g, b, a] = color.to_f32();
                    out.extend_from_slice(&[
                        x as f32,
                        y as f32,
                        radius as f32,
                        glow_radius as f32,
                        r,
                        g,
                        b,
                        a,
                    ]);
                    glow_radius = 0.0;
                }
            }
        }
        out
    }
}

/// The continuously repainted particle canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    css_width: f64,
    css_height: f64,
    dpr: f64,
    backing_width: u32,
    backing_height: u32,
    scale_applications: u64,
    frames_painted: u64,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self {
            css_width: 0.0,
            css_height: 0.0,
            dpr: 1.0,
            backing_width: 0,
            backing_height: 0,
            scale_applications: 0,
            frames_painted: 0,
        }
    }
}

impl RasterSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the backing store. Returns `Ok(true)` when the size or ratio
    /// actually changed (and the scale transform was re-applied).
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> Result<bool, SurfaceError> {
        if !(css_width.is_finite() && css_height.is_finite()) || css_width < 0.0 || css_height < 0.0 {
            return Err(SurfaceError::InvalidViewport {
                width: css_width,
                height: css_height,
            });
        }
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(SurfaceError::InvalidPixelRatio(dpr));
        }
        if css_width == self.css_width && css_height == self.css_height && dpr == self.dpr {
            return Ok(false);
        }
        self.css_width = css_width;
        self.css_height = css_height;
        self.dpr = dpr;
        self.backing_width = backing(css_width, dpr);
        self.backing_height = backing(css_height, dpr);
        self.scale_applications += 1;
        debug!(
            css_width,
            css_height,
            dpr,
            backing_width = self.backing_width,
            backing_height = self.backing_height,
            "raster surface resized"
        );
        Ok(true)
    }

    /// Clear and draw `sprites`.
    pub fn paint(&mut self, sprites: &[ParticleSprite], palette: &Palette, config: &RenderConfig) -> RasterFrame {
        let mut ops = Vec::with_capacity(1 + sprites.len() * 2);
        ops.push(DrawOp::Clear);
        for s in sprites {
            let base = palette.particle(s.kind);
            ops.push(DrawOp::Glow {
                x: s.x,
                y: s.y,
                radius: s.radius * config.glow_scale,
                color: base.with_opacity(config.glow_alpha * s.brightness),
            });
            ops.push(DrawOp::Core {
                x: s.x,
                y: s.y,
                radius: s.radius,
                color: base.with_opacity(s.brightness),
            });
        }
        self.frames_painted += 1;
        RasterFrame { ops }
    }

    #[must_use]
    pub fn css_size(&self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    #[must_use]
    pub fn backing_size(&self) -> (u32, u32) {
        (self.backing_width, self.backing_height)
    }

    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// How many times the DPR transform has been installed.
    #[must_use]
    pub fn scale_applications(&self) -> u64 {
        self.scale_applications
    }

    #[must_use]
    pub fn frames_painted(&self) -> u64 {
        self.frames_painted
    }
}

fn backing(css: f64, dpr: f64) -> u32 {
    let px = (css * dpr).round();
    if px >= f64::from(u32::MAX) { u32::MAX } else { px as u32 }
}
