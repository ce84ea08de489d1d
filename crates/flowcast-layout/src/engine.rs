#![forbid(unsafe_code)]

//! Layered layout: node placement and link curves.
//!
//! # Invariants
//!
//! 1. `layout` is pure: identical input produces bit-identical output.
//! 2. Every emitted link references two emitted nodes.
//! 3. Node heights are at least `min_node_height`; link thickness at least
//!    `min_link_thickness`.
//! 4. Node boxes stay inside `[0, width]` horizontally when the viewport is
//!    wider than a node.
//!
//! # Failure Modes
//!
//! - Link with an unknown endpoint: excluded, counted in `dropped_links`,
//!   logged at `warn`.
//! - Duplicate node id: first occurrence kept, later ones dropped with a
//!   `warn`.
//! - Non-finite or negative viewport: treated as zero (nodes collapse onto
//!   the padding line, no panic).

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use flowcast_core::{
    CubicBezier, DiagramSpec, LinkKind, Node, NodeKind, Point, Rect, sanitize_value,
};
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use tracing::{debug, warn};

use crate::LayoutConfig;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A node placed in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub layer: usize,
    pub value: f64,
    pub kind: NodeKind,
    /// Resolved vertical position in `[0, 1]`.
    pub normalized_y: f64,
    /// Left edge.
    pub x: f64,
    /// Vertical center line; link endpoints attach here.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    /// Top-left box, for painting and hit testing.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y - self.height / 2.0, self.width, self.height)
    }

    /// Where outgoing links leave the node.
    #[must_use]
    pub fn right_anchor(&self) -> Point {
        Point::new(self.x + self.width, self.y)
    }

    /// Where incoming links enter the node.
    #[must_use]
    pub fn left_anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Stable identity of a link, independent of geometry.
///
/// `ordinal` disambiguates parallel links between the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LinkKey {
    pub from: String,
    pub to: String,
    pub ordinal: u32,
}

/// A link with resolved endpoints and curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutLink {
    pub key: LinkKey,
    /// Index of the source node in [`DiagramLayout::nodes`].
    pub source: usize,
    /// Index of the target node in [`DiagramLayout::nodes`].
    pub target: usize,
    pub value: f64,
    pub kind: LinkKind,
    pub thickness: f64,
    pub curve: CubicBezier,
}

/// Hash of the ordered `(key, kind, value)` tuples of a link set.
///
/// Changes when links are added, removed, reordered, re-kinded or
/// re-weighted; unaffected by viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LinkSetSignature(pub u64);

impl LinkSetSignature {
    fn of(links: &[LayoutLink]) -> Self {
        let mut hasher = FxHasher::default();
        links.len().hash(&mut hasher);
        for link in links {
            link.key.hash(&mut hasher);
            link.kind.code().hash(&mut hasher);
            link.value.to_bits().hash(&mut hasher);
        }
        Self(hasher.finish())
    }
}

/// Screen box reported to the host for one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub layer: usize,
}

/// Node id → screen box, ordered by id.
pub type NodePositions = BTreeMap<String, NodeBox>;

/// Complete layout output.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    /// `max(layer) + 1` over the placed nodes.
    pub layer_count: usize,
    /// Links excluded for referencing unknown nodes.
    pub dropped_links: usize,
    pub signature: LinkSetSignature,
    index: FxHashMap<String, usize>,
}

impl DiagramLayout {
    /// An empty layout of the given viewport.
    #[must_use]
    pub fn empty(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            nodes: Vec::new(),
            links: Vec::new(),
            layer_count: 0,
            dropped_links: 0,
            signature: LinkSetSignature::of(&[]),
            index: FxHashMap::default(),
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    /// Index of a node by id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Boxes of all placed nodes, keyed by id.
    #[must_use]
    pub fn positions(&self) -> NodePositions {
        self.nodes
            .iter()
            .map(|n| {
                let r = n.rect();
                (
                    n.id.clone(),
                    NodeBox {
                        x: r.x,
                        y: r.y,
                        width: r.width,
                        height: r.height,
                        layer: n.layer,
                    },
                )
            })
            .collect()
    }

    /// Nodes belonging to `layer`, in input order.
    pub fn layer_nodes(&self, layer: usize) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(move |n| n.layer == layer)
    }

    /// Layer index of a link's target node.
    #[must_use]
    pub fn target_layer(&self, link: &LayoutLink) -> usize {
        self.nodes.get(link.target).map_or(0, |n| n.layer)
    }
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Lay out `spec` in a `width` × `height` viewport.
#[must_use]
pub fn layout(spec: &DiagramSpec, config: &LayoutConfig, width: f64, height: f64) -> DiagramLayout {
    let mut out = DiagramLayout::empty(width, height);
    let (width, height) = (out.width, out.height);

    // Dedupe, cap layer indices, then group by layer preserving input order.
    let last_layer = config.last_layer();
    let mut kept: Vec<(&Node, usize)> = Vec::with_capacity(spec.nodes.len());
    for node in &spec.nodes {
        if out.index.contains_key(&node.id) {
            warn!(id = %node.id, "duplicate node id; keeping the first occurrence");
            continue;
        }
        let layer = if node.layer > last_layer {
            warn!(id = %node.id, layer = node.layer, last_layer, "node layer out of range; clamping");
            last_layer
        } else {
            node.layer
        };
        out.index.insert(node.id.clone(), kept.len());
        kept.push((node, layer));
    }
    let layer_count = kept.iter().map(|&(_, layer)| layer + 1).max().unwrap_or(0);
    let mut layer_sizes = vec![0usize; layer_count];
    for &(_, layer) in &kept {
        layer_sizes[layer] += 1;
    }

    let usable = (height - config.padding_top - config.padding_bottom).max(0.0);
    let node_width = config.node_width.max(0.0);
    let max_x = (width - node_width).max(0.0);

    let mut seen_in_layer = vec![0usize; layer_count];
    out.nodes = kept
        .iter()
        .map(|&(node, layer)| {
            let slot = seen_in_layer[layer];
            seen_in_layer[layer] += 1;
            let normalized_y = match node.y {
                Some(y) if y.is_finite() => y.clamp(0.0, 1.0),
                _ => (slot + 1) as f64 / (layer_sizes[layer] + 1) as f64,
            };
            let center_x = config.x_fraction(layer, layer_count) * width;
            let x = (center_x - node_width / 2.0).clamp(0.0, max_x);
            let y = config.padding_top + config.vertical_offset + normalized_y * usable;
            let height = config
                .min_node_height
                .max(sanitize_value(node.value) * config.node_size_scale);
            LayoutNode {
                id: node.id.clone(),
                label: node.display_label().to_string(),
                layer,
                value: sanitize_value(node.value),
                kind: node.kind,
                normalized_y,
                x,
                y,
                width: node_width,
                height,
            }
        })
        .collect();
    out.layer_count = layer_count;

    let mut ordinals: FxHashMap<(&str, &str), u32> = FxHashMap::default();
    for link in &spec.links {
        let (Some(source), Some(target)) =
            (out.index.get(&link.from).copied(), out.index.get(&link.to).copied())
        else {
            warn!(from = %link.from, to = %link.to, "dropping link with unknown endpoint");
            out.dropped_links += 1;
            continue;
        };
        let ordinal = ordinals
            .entry((link.from.as_str(), link.to.as_str()))
            .or_insert(0);
        let key = LinkKey {
            from: link.from.clone(),
            to: link.to.clone(),
            ordinal: *ordinal,
        };
        *ordinal += 1;
        let value = sanitize_value(link.value);
        let curve = CubicBezier::s_curve(
            out.nodes[source].right_anchor(),
            out.nodes[target].left_anchor(),
        );
        out.links.push(LayoutLink {
            key,
            source,
            target,
            value,
            kind: link.kind,
            thickness: config
                .min_link_thickness
                .max(value * config.link_thickness_scale),
            curve,
        });
    }
    out.signature = LinkSetSignature::of(&out.links);

    debug!(
        nodes = out.nodes.len(),
        links = out.links.len(),
        dropped = out.dropped_links,
        layers = layer_count,
        width,
        height,
        "layout computed"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcast_core::{Link, Node};

    fn three_layer() -> DiagramSpec {
        DiagramSpec::new(
            vec![
                Node::new("leads", 0, 100.0).kind(NodeKind::Source),
                Node::new("qualified", 1, 60.0),
                Node::new("lost", 1, 40.0).kind(NodeKind::Loss),
                Node::new("won", 2, 30.0).kind(NodeKind::Revenue),
            ],
            vec![
                Link::new("leads", "qualified", 60.0),
                Link::new("leads", "lost", 40.0).kind(LinkKind::Loss),
                Link::new("qualified", "won", 30.0).kind(LinkKind::Revenue),
            ],
        )
    }

    #[test]
    fn even_distribution_within_layer() {
        let cfg = LayoutConfig::default();
        let l = layout(&three_layer(), &cfg, 1000.0, 600.0);
        assert_eq!(l.node("leads").map(|n| n.normalized_y), Some(0.5));
        assert!((l.node("qualified").map_or(0.0, |n| n.normalized_y) - 1.0 / 3.0).abs() < 1e-12);
        assert!((l.node("lost").map_or(0.0, |n| n.normalized_y) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn y_uses_padding_offset_and_usable_height() {
        let cfg = LayoutConfig {
            padding_top: 50.0,
            padding_bottom: 50.0,
            vertical_offset: 10.0,
            ..LayoutConfig::default()
        };
        let l = layout(&three_layer(), &cfg, 1000.0, 600.0);
        let leads = l.node("leads").unwrap();
        assert_eq!(leads.y, 50.0 + 10.0 + 0.5 * 500.0);
    }

    #[test]
    fn explicit_y_is_clamped() {
        let spec = DiagramSpec::new(
            vec![Node::new("a", 0, 1.0).at_y(1.7), Node::new("b", 0, 1.0).at_y(-0.2)],
            vec![],
        );
        let l = layout(&spec, &LayoutConfig::default(), 800.0, 400.0);
        assert_eq!(l.node("a").unwrap().normalized_y, 1.0);
        assert_eq!(l.node("b").unwrap().normalized_y, 0.0);
    }

    #[test]
    fn zero_value_gets_minimum_size() {
        let spec = DiagramSpec::new(vec![Node::new("z", 0, 0.0), Node::new("n", 0, -4.0)], vec![]);
        let cfg = LayoutConfig::default();
        let l = layout(&spec, &cfg, 800.0, 400.0);
        assert!(l.nodes.iter().all(|n| n.height == cfg.min_node_height));
    }

    #[test]
    fn x_follows_breakpoints_and_is_left_edge() {
        let cfg = LayoutConfig::default();
        let l = layout(&three_layer(), &cfg, 1000.0, 600.0);
        let expected = cfg.x_fraction(1, 3) * 1000.0 - cfg.node_width / 2.0;
        assert_eq!(l.node("qualified").unwrap().x, expected);
    }

    #[test]
    fn nodes_stay_inside_narrow_viewports() {
        let cfg = LayoutConfig {
            layer_x_fractions: vec![0.0, 1.0],
            ..LayoutConfig::default()
        };
        let spec = DiagramSpec::new(vec![Node::new("a", 0, 1.0), Node::new("b", 1, 1.0)], vec![]);
        let l = layout(&spec, &cfg, 200.0, 100.0);
        assert_eq!(l.node("a").unwrap().x, 0.0);
        assert_eq!(l.node("b").unwrap().x, 200.0 - cfg.node_width);
    }

    #[test]
    fn curves_connect_right_edge_to_left_edge() {
        let l = layout(&three_layer(), &LayoutConfig::default(), 1000.0, 600.0);
        let link = &l.links[0];
        let src = &l.nodes[link.source];
        let dst = &l.nodes[link.target];
        assert_eq!(link.curve.p0, src.right_anchor());
        assert_eq!(link.curve.p3, dst.left_anchor());
        assert_eq!(link.curve.p1.y, src.y);
        assert_eq!(link.curve.p2.y, dst.y);
    }

    #[test]
    fn dangling_links_are_dropped_and_counted() {
        let mut spec = three_layer();
        spec.links.push(Link::new("leads", "ghost", 5.0));
        spec.links.push(Link::new("nobody", "won", 5.0));
        let l = layout(&spec, &LayoutConfig::default(), 1000.0, 600.0);
        assert_eq!(l.links.len(), 3);
        assert_eq!(l.dropped_links, 2);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let spec = DiagramSpec::new(
            vec![Node::new("a", 0, 10.0), Node::new("a", 2, 99.0)],
            vec![],
        );
        let l = layout(&spec, &LayoutConfig::default(), 500.0, 300.0);
        assert_eq!(l.nodes.len(), 1);
        assert_eq!(l.layer_count, 1);
        assert_eq!(l.node("a").unwrap().value, 10.0);
    }

    #[test]
    fn empty_layer_leaves_others_alone() {
        let spec = DiagramSpec::new(vec![Node::new("a", 0, 1.0), Node::new("c", 2, 1.0)], vec![]);
        let l = layout(&spec, &LayoutConfig::default(), 900.0, 300.0);
        assert_eq!(l.layer_count, 3);
        assert_eq!(l.layer_nodes(1).count(), 0);
        assert_eq!(l.node("c").unwrap().normalized_y, 0.5);
    }

    #[test]
    fn parallel_links_get_distinct_ordinals() {
        let spec = DiagramSpec::new(
            vec![Node::new("a", 0, 1.0), Node::new("b", 1, 1.0)],
            vec![Link::new("a", "b", 1.0), Link::new("a", "b", 2.0)],
        );
        let l = layout(&spec, &LayoutConfig::default(), 500.0, 300.0);
        assert_eq!(l.links[0].key.ordinal, 0);
        assert_eq!(l.links[1].key.ordinal, 1);
    }

    #[test]
    fn signature_ignores_viewport_but_tracks_links() {
        let cfg = LayoutConfig::default();
        let spec = three_layer();
        let a = layout(&spec, &cfg, 1000.0, 600.0);
        let b = layout(&spec, &cfg, 640.0, 480.0);
        assert_eq!(a.signature, b.signature);

        let mut changed = spec.clone();
        changed.links[0].value = 61.0;
        assert_ne!(a.signature, layout(&changed, &cfg, 1000.0, 600.0).signature);
    }

    #[test]
    fn positions_report_top_left_boxes() {
        let l = layout(&three_layer(), &LayoutConfig::default(), 1000.0, 600.0);
        let pos = l.positions();
        assert_eq!(pos.len(), 4);
        let won = l.node("won").unwrap();
        assert_eq!(pos["won"].y, won.y - won.height / 2.0);
        assert_eq!(pos["won"].layer, 2);
    }

    #[test]
    fn garbage_viewport_collapses_without_panic() {
        let l = layout(&three_layer(), &LayoutConfig::default(), f64::NAN, -10.0);
        assert_eq!(l.width, 0.0);
        assert_eq!(l.height, 0.0);
        assert!(l.nodes.iter().all(|n| n.x == 0.0));
    }
}
