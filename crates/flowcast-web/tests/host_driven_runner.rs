//! Driving a runner the way a browser host would.

use flowcast_runtime::Variant;
use flowcast_web::{DiagramRunner, RunnerConfig};
use proptest::prelude::*;
use web_time::Duration;

const SPEC: &str = r#"{
  "nodes": [
    {"id": "leads", "label": "Leads", "layer": 0, "value": 120},
    {"id": "demo", "label": "Demo", "layer": 1, "value": 80},
    {"id": "ghosted", "label": "Ghosted", "layer": 1, "value": 40, "kind": "loss"},
    {"id": "closed", "label": "Closed", "layer": 2, "value": 50, "kind": "revenue"},
    {"id": "stalled", "label": "Stalled", "layer": 2, "value": 30, "kind": "loss"}
  ],
  "links": [
    {"from": "leads", "to": "demo", "value": 80},
    {"from": "leads", "to": "ghosted", "value": 40, "kind": "loss"},
    {"from": "demo", "to": "closed", "value": 50, "kind": "revenue"},
    {"from": "demo", "to": "stalled", "value": 30, "kind": "loss"},
    {"from": "demo", "to": "nowhere", "value": 5}
  ]
}"#;

const SCRIPT: &str = r#"{
  "bleed": {"header": "Where deals leak", "callouts": [{"node_id": "ghosted", "text": "No reply"}]},
  "anchored_metric": {"node_id": "ghosted", "label": "Lost", "value": "33%"},
  "metrics": [{"label": "Win rate", "value": "42%"}],
  "insight": "Follow up faster"
}"#;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn runner(variant: Variant) -> DiagramRunner {
    let mut r = DiagramRunner::new(RunnerConfig::default(), variant);
    r.resize(1024.0, 600.0, 2.0).unwrap();
    r.load_json(SPEC, SCRIPT, ms(0)).unwrap();
    r
}

#[test]
fn dangling_link_is_dropped_not_fatal() {
    let r = runner(Variant::Before);
    assert_eq!(r.layout().links.len(), 4);
    assert_eq!(r.layout().dropped_links, 1);
}

#[test]
fn before_run_hits_every_phase_in_order() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    let mut labels: Vec<String> = Vec::new();
    for t in (0..=12_000u64).step_by(50) {
        r.frame(ms(t));
        let label = r.narrative_state().phase.label();
        if labels.last() != Some(&label) {
            labels.push(label);
        }
    }
    assert_eq!(labels, ["setup-0", "setup-1", "setup-2", "bleed", "ready", "complete"]);
    assert!(r.narrative_state().action_ready);
    assert!(r.wants_frame(), "particles keep running while active");
}

#[test]
fn bleed_frame_shows_bleed_copy() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    r.frame(ms(0));
    // three layers: bleed spans 5000..8000
    let frame = r.frame(ms(7000)).unwrap();
    assert_eq!(frame.overlays.header.as_deref(), Some("Where deals leak"));
    assert!(frame.overlays.anchored_card().is_some());
    assert!(r.narrative_state().loss_highlight);
}

#[test]
fn after_variant_follows_external_progress() {
    let mut r = runner(Variant::After);
    r.set_active(true, ms(0));
    let f = r.frame(ms(0)).unwrap();
    assert!(f.overlays.cards.is_empty());
    r.set_external_progress(0.7);
    let f = r.frame(ms(16)).unwrap();
    assert_eq!(f.overlays.cards.len(), 2);
    r.set_external_progress(0.2);
    r.frame(ms(32));
    assert_eq!(r.narrative_state().phase.label(), "result");
    r.set_external_progress(1.0);
    r.frame(ms(48));
    assert!(r.narrative_state().action_ready);
}

#[test]
fn toggling_active_in_one_frame_starts_fresh() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    r.frame(ms(6000));
    r.set_active(false, ms(6000));
    r.set_active(true, ms(6000));
    r.frame(ms(6000));
    assert_eq!(r.narrative_state().phase.label(), "setup-0");
    assert_eq!(r.narrative().run_id(), Some(2));
}

#[test]
fn variant_switch_restarts_narrative() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    r.frame(ms(7000));
    r.set_variant(Variant::After, ms(7000));
    r.frame(ms(7016));
    assert_eq!(r.narrative_state().phase.label(), "idle");
    assert_eq!(r.variant(), Variant::After);
}

#[test]
fn pointer_events_flow_through() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    r.skip_to_complete(ms(0));
    r.frame(ms(16));
    let center = r.layout().node("demo").unwrap().rect().center();
    r.pointer_move(center.x, center.y);
    assert_eq!(r.click(center.x, center.y).as_deref(), Some("demo"));
    r.pointer_leave();
    let kinds: Vec<String> = r
        .take_events()
        .iter()
        .map(kind_of)
        .collect();
    assert_eq!(kinds, ["hover", "click", "leave"]);
}

#[test]
fn pointer_ignores_layers_not_yet_drawn() {
    let mut r = runner(Variant::Before);
    r.set_active(true, ms(0));
    r.frame(ms(100));
    let center = r.layout().node("closed").unwrap().rect().center();
    r.pointer_move(center.x, center.y);
    assert_eq!(r.click(center.x, center.y), None);
    assert!(r.take_events().is_empty());
}

fn kind_of(e: &flowcast_render::NodeEvent) -> String {
    match e {
        flowcast_render::NodeEvent::Hover { .. } => "hover".into(),
        flowcast_render::NodeEvent::Leave { .. } => "leave".into(),
        flowcast_render::NodeEvent::Click { .. } => "click".into(),
    }
}

proptest! {
    #[test]
    fn backwards_host_clock_never_regresses_phase(
        steps in proptest::collection::vec(0u64..15_000, 1..60)
    ) {
        let mut r = runner(Variant::Before);
        r.set_active(true, ms(0));
        let mut furthest = r.narrative_state().phase;
        r.frame(ms(0));
        for t in steps {
            r.frame(ms(t));
            let phase = r.narrative_state().phase;
            prop_assert!(phase >= furthest, "{phase} regressed from {furthest}");
            furthest = phase;
        }
    }
}
