#![forbid(unsafe_code)]

//! Layout tuning: layer breakpoints, paddings, and size scales.

use serde::{Deserialize, Serialize};

/// Geometry tuning for [`layout`](crate::layout).
///
/// All values are in CSS pixels except `layer_x_fractions`, which are
/// fractions of the viewport width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal center of each layer as a fraction of the width.
    ///
    /// Not evenly spaced: the outer layers sit close to the edges and the
    /// final gap is the narrowest, leaving room right of the terminal layer
    /// for its labels. Resampled when the diagram has a different layer count.
    pub layer_x_fractions: Vec<f64>,
    pub node_width: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    /// Extra shift applied to every node's y after padding.
    pub vertical_offset: f64,
    pub min_node_height: f64,
    /// Pixels of height per unit of node value.
    pub node_size_scale: f64,
    pub min_link_thickness: f64,
    /// Pixels of stroke per unit of link value.
    pub link_thickness_scale: f64,
    /// Layers at or past this index are folded into the last one.
    pub max_layers: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layer_x_fractions: vec![0.04, 0.24, 0.48, 0.70, 0.86],
            node_width: 14.0,
            padding_top: 56.0,
            padding_bottom: 40.0,
            vertical_offset: 0.0,
            min_node_height: 8.0,
            node_size_scale: 0.6,
            min_link_thickness: 2.0,
            link_thickness_scale: 0.5,
            max_layers: 32,
        }
    }
}

impl LayoutConfig {
    /// Horizontal fraction for `layer` in a diagram spanning `layer_count`
    /// layers.
    ///
    /// When the layer count equals the table length the table is used
    /// verbatim. Otherwise the table is treated as a piecewise-linear curve
    /// over `[0, 1]` and sampled at `layer / (layer_count - 1)`, which keeps
    /// the edge compression for any count. A single layer sits at the
    /// curve's midpoint. An empty table spreads layers evenly.
    #[must_use]
    pub fn x_fraction(&self, layer: usize, layer_count: usize) -> f64 {
        let table = &self.layer_x_fractions;
        if table.is_empty() {
            let count = layer_count.max(1) as f64;
            return (layer as f64 + 0.5) / count;
        }
        if layer_count == table.len() {
            if let Some(&f) = table.get(layer) {
                return sanitize_fraction(f);
            }
        }
        let u = if layer_count <= 1 {
            0.5
        } else {
            (layer as f64 / (layer_count - 1) as f64).clamp(0.0, 1.0)
        };
        sanitize_fraction(sample_table(table, u))
    }

    /// Highest layer index a node may occupy.
    #[must_use]
    pub fn last_layer(&self) -> usize {
        self.max_layers.max(1) - 1
    }

    /// Problems that would make the layout look wrong (not fail).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (i, f) in self.layer_x_fractions.iter().enumerate() {
            if !f.is_finite() || !(0.0..=1.0).contains(f) {
                problems.push(format!("layout.layer_x_fractions[{i}] = {f} is outside [0, 1]"));
            }
        }
        if self
            .layer_x_fractions
            .windows(2)
            .any(|w| w[0].is_finite() && w[1].is_finite() && w[1] < w[0])
        {
            problems.push("layout.layer_x_fractions must be non-decreasing".to_string());
        }
        for (name, value) in [
            ("node_width", self.node_width),
            ("min_node_height", self.min_node_height),
            ("node_size_scale", self.node_size_scale),
            ("min_link_thickness", self.min_link_thickness),
            ("link_thickness_scale", self.link_thickness_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("layout.{name} = {value} must be a non-negative number"));
            }
        }
        if self.max_layers == 0 {
            problems.push("layout.max_layers must be at least 1".to_string());
        }
        problems
    }
}

fn sample_table(table: &[f64], u: f64) -> f64 {
    if table.len() == 1 {
        return table[0];
    }
    let pos = u * (table.len() - 1) as f64;
    let i = (pos.floor() as usize).min(table.len() - 2);
    let frac = pos - i as f64;
    table[i] + (table[i + 1] - table[i]) * frac
}

fn sanitize_fraction(f: f64) -> f64 {
    if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.5 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn matching_count_uses_table_verbatim() {
        let cfg = LayoutConfig::default();
        for (i, f) in cfg.layer_x_fractions.iter().enumerate() {
            assert_eq!(cfg.x_fraction(i, 5), *f);
        }
    }

    #[test]
    fn other_counts_keep_edges_and_order() {
        let cfg = LayoutConfig::default();
        for count in [2, 3, 4, 7, 9] {
            let xs: Vec<f64> = (0..count).map(|l| cfg.x_fraction(l, count)).collect();
            assert!(approx(xs[0], 0.04), "count={count}");
            assert!(approx(xs[count - 1], 0.86), "count={count}");
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "count={count}: {xs:?}");
        }
    }

    #[test]
    fn single_layer_sits_at_midpoint() {
        let cfg = LayoutConfig::default();
        assert!(approx(cfg.x_fraction(0, 1), 0.48));
    }

    #[test]
    fn empty_table_spreads_evenly() {
        let cfg = LayoutConfig {
            layer_x_fractions: vec![],
            ..LayoutConfig::default()
        };
        assert!(approx(cfg.x_fraction(0, 2), 0.25));
        assert!(approx(cfg.x_fraction(1, 2), 0.75));
    }

    #[test]
    fn garbage_fractions_are_sanitized() {
        let cfg = LayoutConfig {
            layer_x_fractions: vec![f64::NAN, 3.0],
            ..LayoutConfig::default()
        };
        assert_eq!(cfg.x_fraction(0, 2), 0.5);
        assert_eq!(cfg.x_fraction(1, 2), 1.0);
        assert_eq!(cfg.validate().len(), 2);
    }

    #[test]
    fn zero_max_layers_still_allows_one_layer() {
        let cfg = LayoutConfig {
            max_layers: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(cfg.last_layer(), 0);
        assert_eq!(cfg.validate().len(), 1);
    }

    #[test]
    fn default_config_validates() {
        assert!(LayoutConfig::default().validate().is_empty());
    }
}
