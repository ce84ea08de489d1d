#![forbid(unsafe_code)]

//! Narrative overlays: stage labels, metric cards, callout badges and the
//! action control.
//!
//! Overlays are recomposed every frame from the layout, the narrative state
//! and the script. Anything that references an unknown node is skipped.

use flowcast_core::NarrativeScript;
use flowcast_layout::DiagramLayout;
use flowcast_runtime::NarrativeState;
use serde::Serialize;
use tracing::trace;

use crate::RenderConfig;

/// Gap between a node and an overlay anchored to it.
const ANCHOR_GAP: f64 = 8.0;
/// Vertical gap between stacked summary cards.
const CARD_GAP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageLabel {
    pub layer: usize,
    pub text: String,
    /// Horizontal center.
    pub x: f64,
    pub y: f64,
    pub active: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    /// Node the card is pinned to; `None` for summary cards.
    pub node_id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalloutBadge {
    pub node_id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Hidden,
    /// Shown but not yet interactive.
    Pending,
    Ready,
}

/// Every overlay element for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySet {
    pub header: Option<String>,
    pub stage_labels: Vec<StageLabel>,
    pub cards: Vec<MetricCard>,
    pub callouts: Vec<CalloutBadge>,
    pub insight: Option<String>,
    pub action: ActionState,
}

impl OverlaySet {
    #[must_use]
    pub fn compose(
        layout: &DiagramLayout,
        state: &NarrativeState,
        script: &NarrativeScript,
        config: &RenderConfig,
    ) -> Self {
        let stage_labels = if config.show_stage_labels {
            stage_labels(layout, state, config)
        } else {
            Vec::new()
        };

        let mut cards = Vec::new();
        if state.anchored_metric_visible {
            if let Some(anchor) = &script.anchored_metric {
                match layout.node(&anchor.node_id) {
                    Some(node) => {
                        let r = node.rect();
                        cards.push(MetricCard {
                            label: anchor.label.clone(),
                            value: anchor.value.clone(),
                            node_id: Some(anchor.node_id.clone()),
                            x: clamp_x(r.right() + ANCHOR_GAP, config.metric_card_width, layout.width),
                            y: r.y,
                            width: config.metric_card_width,
                            height: config.metric_card_height,
                        });
                    }
                    None => trace!(node = %anchor.node_id, "anchored metric node missing"),
                }
            }
        }
        let summary_x = (layout.width - config.metric_card_width - ANCHOR_GAP).max(0.0);
        let visible_metrics = script
            .metrics
            .iter()
            .zip(state.metrics_visible.iter())
            .filter(|(_, visible)| **visible)
            .map(|(m, _)| m);
        for (slot, metric) in visible_metrics.enumerate() {
            cards.push(MetricCard {
                label: metric.label.clone(),
                value: metric.value.clone(),
                node_id: None,
                x: summary_x,
                y: ANCHOR_GAP + slot as f64 * (config.metric_card_height + CARD_GAP),
                width: config.metric_card_width,
                height: config.metric_card_height,
            });
        }

        let callouts = state
            .callouts
            .iter()
            .filter_map(|c| {
                let node = layout.node(&c.node_id)?;
                let anchor = node.right_anchor();
                Some(CalloutBadge {
                    node_id: c.node_id.clone(),
                    text: c.text.clone(),
                    x: anchor.x + ANCHOR_GAP,
                    y: anchor.y - node.height / 2.0 - ANCHOR_GAP,
                })
            })
            .collect();

        let action = if state.action_ready {
            ActionState::Ready
        } else if state.insight_visible {
            ActionState::Pending
        } else {
            ActionState::Hidden
        };

        Self {
            header: state.header.clone(),
            stage_labels,
            cards,
            callouts,
            insight: if state.insight_visible {
                script.insight.clone()
            } else {
                None
            },
            action,
        }
    }

    #[must_use]
    pub fn anchored_card(&self) -> Option<&MetricCard> {
        self.cards.iter().find(|c| c.node_id.is_some())
    }
}

fn stage_labels(layout: &DiagramLayout, state: &NarrativeState, config: &RenderConfig) -> Vec<StageLabel> {
    let active = state.active_layer();
    (0..layout.layer_count)
        .filter_map(|layer| {
            // Empty layers get no label.
            let xs: Vec<f64> = layout
                .layer_nodes(layer)
                .map(|n| n.x + n.width / 2.0)
                .collect();
            let first = *xs.first()?;
            Some(StageLabel {
                layer,
                text: config.stage_label(layer),
                x: first,
                y: config.font_size,
                active: active == Some(layer),
                visible: state.is_layer_visible(layer),
            })
        })
        .collect()
}

fn clamp_x(x: f64, width: f64, viewport: f64) -> f64 {
    x.min((viewport - width).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcast_core::{AnchoredMetric, DiagramSpec, Link, Metric, Node};
    use flowcast_layout::{LayoutConfig, layout};
    use flowcast_runtime::{NarrativeConfig, NarrativeController, Variant};
    use web_time::Duration;

    fn fixture() -> (DiagramLayout, NarrativeScript) {
        let spec = DiagramSpec::new(
            vec![Node::new("a", 0, 40.0), Node::new("lost", 1, 20.0), Node::new("b", 2, 20.0)],
            vec![Link::new("a", "lost", 20.0), Link::new("a", "b", 20.0)],
        );
        let l = layout(&spec, &LayoutConfig::default(), 1000.0, 500.0);
        let script = NarrativeScript {
            anchored_metric: Some(AnchoredMetric {
                node_id: "lost".into(),
                label: "Leak".into(),
                value: "$2.1M".into(),
            }),
            metrics: vec![
                Metric {
                    label: "Won".into(),
                    value: "12".into(),
                },
                Metric {
                    label: "Lost".into(),
                    value: "9".into(),
                },
            ],
            insight: Some("Plug the leak".into()),
            ..NarrativeScript::default()
        };
        (l, script)
    }

    fn controller(script: &NarrativeScript) -> NarrativeController {
        NarrativeController::new(Variant::Before, NarrativeConfig::default(), 3)
            .with_script(script.clone())
    }

    #[test]
    fn stage_labels_track_active_layer() {
        let (l, script) = fixture();
        let c = controller(&script);
        let o = OverlaySet::compose(&l, &c.state_at(Duration::from_millis(1600)), &script, &RenderConfig::default());
        assert_eq!(o.stage_labels.len(), 3);
        assert!(o.stage_labels[1].active);
        assert!(o.stage_labels[1].visible);
        assert!(!o.stage_labels[2].visible);
        assert_eq!(o.action, ActionState::Hidden);
    }

    #[test]
    fn anchored_card_sits_next_to_its_node() {
        let (l, script) = fixture();
        let c = controller(&script);
        // setup_end = 5000, reveal delay 800.
        let o = OverlaySet::compose(&l, &c.state_at(Duration::from_millis(5900)), &script, &RenderConfig::default());
        let card = o.anchored_card().expect("anchored card");
        let node = l.node("lost").unwrap();
        assert_eq!(card.x, node.rect().right() + ANCHOR_GAP);
        assert_eq!(card.value, "$2.1M");
        assert_eq!(o.cards.len(), 1);
    }

    #[test]
    fn complete_shows_everything() {
        let (l, script) = fixture();
        let c = controller(&script);
        let o = OverlaySet::compose(&l, &c.state_at(Duration::from_secs(60)), &script, &RenderConfig::default());
        assert_eq!(o.cards.len(), 3);
        assert_eq!(o.insight.as_deref(), Some("Plug the leak"));
        assert_eq!(o.action, ActionState::Ready);
        assert!(o.cards[2].y > o.cards[1].y);
    }

    #[test]
    fn callouts_for_unknown_nodes_are_skipped() {
        let (l, script) = fixture();
        let mut state = controller(&script).state_at(Duration::from_millis(100));
        state.callouts = vec![
            flowcast_core::Callout::new("a", "hello"),
            flowcast_core::Callout::new("ghost", "boo"),
        ];
        let o = OverlaySet::compose(&l, &state, &script, &RenderConfig::default());
        assert_eq!(o.callouts.len(), 1);
        assert_eq!(o.callouts[0].node_id, "a");
    }

    #[test]
    fn labels_can_be_disabled() {
        let (l, script) = fixture();
        let cfg = RenderConfig {
            show_stage_labels: false,
            ..RenderConfig::default()
        };
        let o = OverlaySet::compose(&l, &controller(&script).state_at(Duration::ZERO), &script, &cfg);
        assert!(o.stage_labels.is_empty());
    }
}
