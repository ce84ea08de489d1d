#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Styling knobs for the render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base link opacity once fully drawn.
    pub link_opacity: f64,
    /// Opacity of nodes and links that are not related to the hovered node.
    pub dim_opacity: f64,
    /// Extra opacity added to loss links at full pulse.
    pub loss_pulse_gain: f64,
    /// Glow radius as a multiple of the particle core radius.
    pub glow_scale: f64,
    /// Peak alpha at the glow center.
    pub glow_alpha: f64,
    /// Hit-test slop around node boxes, in CSS pixels.
    pub hit_margin: f64,
    pub font_size: f64,
    pub show_stage_labels: bool,
    /// Label per layer; missing entries fall back to `Stage N`.
    pub stage_labels: Vec<String>,
    pub metric_card_width: f64,
    pub metric_card_height: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            link_opacity: 0.45,
            dim_opacity: 0.2,
            loss_pulse_gain: 0.5,
            glow_scale: 3.0,
            glow_alpha: 0.35,
            hit_margin: 4.0,
            font_size: 12.0,
            show_stage_labels: true,
            stage_labels: Vec::new(),
            metric_card_width: 168.0,
            metric_card_height: 56.0,
        }
    }
}

impl RenderConfig {
    /// Label shown above `layer`.
    #[must_use]
    pub fn stage_label(&self, layer: usize) -> String {
        self.stage_labels
            .get(layer)
            .cloned()
            .unwrap_or_else(|| format!("Stage {}", layer + 1))
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, v) in [
            ("link_opacity", self.link_opacity),
            ("dim_opacity", self.dim_opacity),
            ("glow_alpha", self.glow_alpha),
        ] {
            if !(v.is_finite() && (0.0..=1.0).contains(&v)) {
                problems.push(format!("render.{name} = {v} is outside [0, 1]"));
            }
        }
        for (name, v) in [
            ("glow_scale", self.glow_scale),
            ("hit_margin", self.hit_margin),
            ("font_size", self.font_size),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                problems.push(format!("render.{name} = {v} must be a non-negative number"));
            }
        }
        problems
    }
}
