#![forbid(unsafe_code)]

//! Kind → color tables.

use std::fmt;

use flowcast_core::{LinkKind, NodeKind};
use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `opacity` (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let o = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            a: (f64::from(self.a) * o).round() as u8,
            ..self
        }
    }

    /// `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Normalized channels for GPU/canvas buffers.
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            f.write_str(&self.hex())
        } else {
            write!(f, "rgba({},{},{},{:.3})", self.r, self.g, self.b, self.alpha())
        }
    }
}

/// Fixed color theme for diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub label: Rgba,
    pub muted_label: Rgba,
    pub card: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self::DARK
    }
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: Rgba::rgb(0x0b, 0x10, 0x1a),
        label: Rgba::rgb(0xe6, 0xea, 0xf2),
        muted_label: Rgba::rgb(0x8a, 0x94, 0xa6),
        card: Rgba::rgb(0x16, 0x1d, 0x2b),
    };

    #[must_use]
    pub const fn node_fill(&self, kind: NodeKind) -> Rgba {
        match kind {
            NodeKind::Default => Rgba::rgb(0x6b, 0x7a, 0x99),
            NodeKind::Source => Rgba::rgb(0x4c, 0x8d, 0xff),
            NodeKind::Solution => Rgba::rgb(0x9b, 0x6b, 0xff),
            NodeKind::Loss => Rgba::rgb(0xff, 0x4d, 0x5e),
            NodeKind::New => Rgba::rgb(0x2e, 0xd3, 0xb7),
            NodeKind::Revenue => Rgba::rgb(0x3d, 0xdc, 0x6a),
        }
    }

    #[must_use]
    pub const fn link_stroke(&self, kind: LinkKind) -> Rgba {
        match kind {
            LinkKind::Default => Rgba::rgb(0x5a, 0x6b, 0x8c),
            LinkKind::Loss => Rgba::rgb(0xff, 0x4d, 0x5e),
            LinkKind::New => Rgba::rgb(0x2e, 0xd3, 0xb7),
            LinkKind::Revenue => Rgba::rgb(0x3d, 0xdc, 0x6a),
        }
    }

    /// Particle core color; glows reuse it at lower alpha.
    #[must_use]
    pub const fn particle(&self, kind: LinkKind) -> Rgba {
        match kind {
            LinkKind::Default => Rgba::rgb(0xb8, 0xd4, 0xff),
            LinkKind::Loss => Rgba::rgb(0xff, 0x9a, 0xa4),
            LinkKind::New => Rgba::rgb(0x9a, 0xff, 0xea),
            LinkKind::Revenue => Rgba::rgb(0xa8, 0xff, 0xbe),
        }
    }
}
