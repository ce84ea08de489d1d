#![forbid(unsafe_code)]

//! Persistent vector layer: node boxes and link curves.
//!
//! Geometry is built once per layout by [`VectorScene::build`]. Each frame
//! only [`restyle`](VectorScene::restyle) runs, updating opacity, draw
//! progress and emphasis flags in place.

use std::fmt::Write as _;

use bitflags::bitflags;
use flowcast_core::geometry::fmt_coord;
use flowcast_core::{LinkKind, NodeKind, Rect};
use flowcast_layout::DiagramLayout;
use flowcast_runtime::NarrativeState;

use crate::{Palette, RenderConfig, Rgba};

bitflags! {
    /// Per-frame emphasis of a node or link.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Emphasis: u8 {
        /// Layer not yet drawn.
        const HIDDEN       = 0b0_0001;
        /// Pointer is over this node (or the link touches it).
        const HOVERED      = 0b0_0010;
        /// Something else is hovered.
        const DIMMED       = 0b0_0100;
        /// Belongs to the layer currently drawing in.
        const ACTIVE_LAYER = 0b0_1000;
        /// Loss element pulsing during bleed.
        const LOSS_PULSE   = 0b1_0000;
    }
}

/// A node box in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: String,
    pub label: String,
    pub layer: usize,
    pub kind: NodeKind,
    pub rect: Rect,
    pub fill: Rgba,
    pub opacity: f64,
    pub emphasis: Emphasis,
}

/// A link curve in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkShape {
    /// SVG path data from the layout's control points.
    pub path: String,
    pub kind: LinkKind,
    pub source: usize,
    pub target: usize,
    pub thickness: f64,
    pub stroke: Rgba,
    pub opacity: f64,
    /// Stroke draw-in progress in `[0, 1]` (target layer progress).
    pub progress: f64,
    pub emphasis: Emphasis,
}

/// Static diagram geometry with per-frame styling.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorScene {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeShape>,
    pub links: Vec<LinkShape>,
    background: Rgba,
    label_color: Rgba,
    font_size: f64,
}

impl VectorScene {
    /// Build shapes for `layout`. Everything starts hidden.
    #[must_use]
    pub fn build(layout: &DiagramLayout, palette: &Palette, config: &RenderConfig) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|n| NodeShape {
                id: n.id.clone(),
                label: n.label.clone(),
                layer: n.layer,
                kind: n.kind,
                rect: n.rect(),
                fill: palette.node_fill(n.kind),
                opacity: 0.0,
                emphasis: Emphasis::HIDDEN,
            })
            .collect();
        let links = layout
            .links
            .iter()
            .map(|l| LinkShape {
                path: l.curve.svg_path(),
                kind: l.kind,
                source: l.source,
                target: l.target,
                thickness: l.thickness,
                stroke: palette.link_stroke(l.kind),
                opacity: 0.0,
                progress: 0.0,
                emphasis: Emphasis::HIDDEN,
            })
            .collect();
        Self {
            width: layout.width,
            height: layout.height,
            nodes,
            links,
            background: palette.background,
            label_color: palette.label,
            font_size: config.font_size,
        }
    }

    /// Apply this frame's narrative state and hover target.
    pub fn restyle(&mut self, state: &NarrativeState, hovered: Option<&str>, config: &RenderConfig) {
        let hovered_index = hovered.and_then(|id| self.nodes.iter().position(|n| n.id == id));
        let active_layer = state.active_layer();
        let pulse_boost = if state.loss_highlight {
            state.pulse * config.loss_pulse_gain
        } else {
            0.0
        };

        for (i, node) in self.nodes.iter_mut().enumerate() {
            let progress = state.progress_of(node.layer);
            let mut emphasis = Emphasis::empty();
            if progress <= 0.0 {
                emphasis |= Emphasis::HIDDEN;
            }
            if active_layer == Some(node.layer) {
                emphasis |= Emphasis::ACTIVE_LAYER;
            }
            if state.loss_highlight && node.kind == NodeKind::Loss {
                emphasis |= Emphasis::LOSS_PULSE;
            }
            match hovered_index {
                Some(h) if h == i => emphasis |= Emphasis::HOVERED,
                Some(_) => emphasis |= Emphasis::DIMMED,
                None => {}
            }
            let mut opacity = progress;
            if emphasis.contains(Emphasis::DIMMED) {
                opacity *= config.dim_opacity;
            }
            node.opacity = opacity.clamp(0.0, 1.0);
            node.emphasis = emphasis;
        }

        for link in &mut self.links {
            let progress = state.progress_of(self.nodes.get(link.target).map_or(0, |n| n.layer));
            let mut emphasis = Emphasis::empty();
            if progress <= 0.0 {
                emphasis |= Emphasis::HIDDEN;
            }
            if state.loss_highlight && link.kind == LinkKind::Loss {
                emphasis |= Emphasis::LOSS_PULSE;
            }
            if let Some(h) = hovered_index {
                if link.source == h || link.target == h {
                    emphasis |= Emphasis::HOVERED;
                } else {
                    emphasis |= Emphasis::DIMMED;
                }
            }
            let mut opacity = if progress > 0.0 { config.link_opacity } else { 0.0 };
            if emphasis.contains(Emphasis::LOSS_PULSE) {
                opacity += pulse_boost;
            }
            if emphasis.contains(Emphasis::DIMMED) {
                opacity *= config.dim_opacity;
            }
            link.progress = progress;
            link.opacity = opacity.clamp(0.0, 1.0);
            link.emphasis = emphasis;
        }
    }

    /// Serialize the current styling as a standalone SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(256 + 160 * (self.nodes.len() + self.links.len()));
        let w = fmt_coord(self.width);
        let h = fmt_coord(self.height);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            self.background
        );
        out.push_str("  <g class=\"links\" fill=\"none\">\n");
        for link in self.links.iter().filter(|l| !l.emphasis.contains(Emphasis::HIDDEN)) {
            let _ = writeln!(
                out,
                r#"    <path class="link link-{kind}" d="{d}" stroke="{stroke}" stroke-width="{sw}" stroke-opacity="{op}" pathLength="1" stroke-dasharray="1" stroke-dashoffset="{off}"/>"#,
                kind = link.kind,
                d = link.path,
                stroke = link.stroke,
                sw = fmt_coord(link.thickness),
                op = fmt_coord(link.opacity),
                off = fmt_coord(1.0 - link.progress),
            );
        }
        out.push_str("  </g>\n  <g class=\"nodes\">\n");
        for node in self.nodes.iter().filter(|n| !n.emphasis.contains(Emphasis::HIDDEN)) {
            let _ = writeln!(
                out,
                r#"    <rect class="node node-{kind}" data-id="{id}" x="{x}" y="{y}" width="{rw}" height="{rh}" rx="2" fill="{fill}" fill-opacity="{op}"/>"#,
                kind = node.kind,
                id = escape_xml(&node.id),
                x = fmt_coord(node.rect.x),
                y = fmt_coord(node.rect.y),
                rw = fmt_coord(node.rect.width),
                rh = fmt_coord(node.rect.height),
                fill = node.fill,
                op = fmt_coord(node.opacity),
            );
            let _ = writeln!(
                out,
                r#"    <text x="{x}" y="{y}" font-size="{fs}" fill="{fill}" fill-opacity="{op}" dominant-baseline="middle">{label}</text>"#,
                x = fmt_coord(node.rect.right() + 6.0),
                y = fmt_coord(node.rect.center().y),
                fs = fmt_coord(self.font_size),
                fill = self.label_color,
                op = fmt_coord(node.opacity),
                label = escape_xml(&node.label),
            );
        }
        out.push_str("  </g>\n</svg>\n");
        out
    }
}

/// Escape text for XML content and attribute values.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
