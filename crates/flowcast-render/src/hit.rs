#![forbid(unsafe_code)]

//! Pointer hit testing against node rectangles.
//!
//! Later nodes paint over earlier ones, so the last matching node wins, the
//! same rule a hit grid applies when regions overlap. Nodes that are not
//! currently drawn can be excluded with [`hit_test_where`].

use flowcast_core::Point;
use flowcast_layout::DiagramLayout;
use serde::Serialize;

/// Index of the topmost node under `point`, with rectangles grown by
/// `margin` on every side.
#[must_use]
pub fn hit_test(layout: &DiagramLayout, point: Point, margin: f64) -> Option<usize> {
    hit_test_where(layout, point, margin, |_| true)
}

/// [`hit_test`] restricted to node indices for which `visible` holds.
#[must_use]
pub fn hit_test_where(
    layout: &DiagramLayout,
    point: Point,
    margin: f64,
    visible: impl Fn(usize) -> bool,
) -> Option<usize> {
    if !(point.x.is_finite() && point.y.is_finite()) {
        return None;
    }
    let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
    layout
        .nodes
        .iter()
        .enumerate()
        .rev()
        .find(|(i, n)| visible(*i) && n.rect().inflate(margin).contains(point))
        .map(|(i, _)| i)
}

/// Interaction event surfaced to the host, keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeEvent {
    Hover { node: String },
    Leave { node: String },
    Click { node: String },
}

impl NodeEvent {
    #[must_use]
    pub fn node(&self) -> &str {
        match self {
            Self::Hover { node } | Self::Leave { node } | Self::Click { node } => node,
        }
    }
}

/// Tracks which node the pointer is over and turns raw pointer input into
/// [`NodeEvent`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerTracker {
    hovered: Option<String>,
}

impl PointerTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Pointer moved to `point`. Emits `Leave` for the old node before
    /// `Hover` for the new one; nothing when the target is unchanged.
    /// Only nodes passing `visible` can be hovered.
    pub fn pointer_move(
        &mut self,
        layout: &DiagramLayout,
        point: Point,
        margin: f64,
        visible: impl Fn(usize) -> bool,
    ) -> Vec<NodeEvent> {
        let target =
            hit_test_where(layout, point, margin, visible).map(|i| layout.nodes[i].id.clone());
        if target == self.hovered {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(old) = self.hovered.take() {
            events.push(NodeEvent::Leave { node: old });
        }
        if let Some(new) = target {
            events.push(NodeEvent::Hover { node: new.clone() });
            self.hovered = Some(new);
        }
        events
    }

    /// Click at `point`; `None` when it missed every visible node.
    #[must_use]
    pub fn click(
        &self,
        layout: &DiagramLayout,
        point: Point,
        margin: f64,
        visible: impl Fn(usize) -> bool,
    ) -> Option<NodeEvent> {
        hit_test_where(layout, point, margin, visible).map(|i| NodeEvent::Click {
            node: layout.nodes[i].id.clone(),
        })
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) -> Option<NodeEvent> {
        self.hovered.take().map(|node| NodeEvent::Leave { node })
    }

    /// Drop hover state that refers to a node no longer in `layout`.
    pub fn retain_known(&mut self, layout: &DiagramLayout) -> Option<NodeEvent> {
        match &self.hovered {
            Some(id) if layout.node(id).is_none() => self.pointer_leave(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcast_core::{DiagramSpec, Link, Node};
    use flowcast_layout::{LayoutConfig, layout};
    use pretty_assertions::assert_eq;

    fn two_nodes() -> DiagramLayout {
        let spec = DiagramSpec::new(
            vec![Node::new("a", 0, 10.0), Node::new("b", 1, 10.0)],
            vec![Link::new("a", "b", 10.0)],
        );
        layout(&spec, &LayoutConfig::default(), 800.0, 400.0)
    }

    fn center_of(l: &DiagramLayout, id: &str) -> Point {
        l.node(id).unwrap().rect().center()
    }

    fn all(_: usize) -> bool {
        true
    }

    #[test]
    fn hits_node_centers_and_misses_background() {
        let l = two_nodes();
        assert_eq!(hit_test(&l, center_of(&l, "a"), 0.0), Some(0));
        assert_eq!(hit_test(&l, center_of(&l, "b"), 0.0), Some(1));
        assert_eq!(hit_test(&l, Point::new(400.0, 2.0), 0.0), None);
        assert_eq!(hit_test(&l, Point::new(f64::NAN, 2.0), 4.0), None);
    }

    #[test]
    fn margin_widens_target() {
        let l = two_nodes();
        let r = l.node("a").unwrap().rect();
        let just_outside = Point::new(r.right() + 3.0, r.center().y);
        assert_eq!(hit_test(&l, just_outside, 0.0), None);
        assert_eq!(hit_test(&l, just_outside, 4.0), Some(0));
    }

    #[test]
    fn hidden_nodes_are_not_hit() {
        let l = two_nodes();
        let only_first = |i: usize| i == 0;
        assert_eq!(hit_test_where(&l, center_of(&l, "b"), 0.0, only_first), None);
        assert_eq!(hit_test_where(&l, center_of(&l, "a"), 0.0, only_first), Some(0));

        let mut p = PointerTracker::new();
        assert!(p.pointer_move(&l, center_of(&l, "b"), 0.0, only_first).is_empty());
        assert_eq!(p.hovered(), None);
        assert_eq!(p.click(&l, center_of(&l, "b"), 0.0, only_first), None);
    }

    #[test]
    fn move_sequence_emits_leave_before_hover() {
        let l = two_nodes();
        let mut p = PointerTracker::new();
        assert_eq!(
            p.pointer_move(&l, center_of(&l, "a"), 0.0, all),
            vec![NodeEvent::Hover { node: "a".into() }]
        );
        assert!(p.pointer_move(&l, center_of(&l, "a"), 0.0, all).is_empty());
        assert_eq!(
            p.pointer_move(&l, center_of(&l, "b"), 0.0, all),
            vec![
                NodeEvent::Leave { node: "a".into() },
                NodeEvent::Hover { node: "b".into() }
            ]
        );
        assert_eq!(p.pointer_leave(), Some(NodeEvent::Leave { node: "b".into() }));
        assert_eq!(p.pointer_leave(), None);
    }

    #[test]
    fn click_reports_node_id() {
        let l = two_nodes();
        let p = PointerTracker::new();
        assert_eq!(
            p.click(&l, center_of(&l, "b"), 0.0, all),
            Some(NodeEvent::Click { node: "b".into() })
        );
        assert_eq!(p.click(&l, Point::new(-50.0, -50.0), 0.0, all), None);
    }

    #[test]
    fn stale_hover_is_dropped_on_new_layout() {
        let l = two_nodes();
        let mut p = PointerTracker::new();
        p.pointer_move(&l, center_of(&l, "a"), 0.0, all);
        let empty = DiagramLayout::empty(800.0, 400.0);
        assert_eq!(p.retain_known(&empty), Some(NodeEvent::Leave { node: "a".into() }));
        assert_eq!(p.hovered(), None);
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&NodeEvent::Click { node: "n1".into() }).unwrap();
        assert_eq!(json, r#"{"type":"click","node":"n1"}"#);
    }
}
