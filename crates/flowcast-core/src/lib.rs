#![forbid(unsafe_code)]

//! Core: diagram model, narrative script, geometry, and timing.
//!
//! # Role in flowcast
//! `flowcast-core` is the vocabulary shared by every other crate. It owns
//! the input content types ([`DiagramSpec`], [`NarrativeScript`]), the pixel
//! geometry primitives ([`Point`], [`Rect`], [`CubicBezier`]), and the
//! timing configuration that the narrative controller schedules against.
//!
//! # How it fits in the system
//! `flowcast-layout` turns a [`DiagramSpec`] into geometry built from these
//! primitives; `flowcast-fx` walks the resulting curves; `flowcast-runtime`
//! derives phase signals from [`TimingConfig`]; `flowcast-render` paints all
//! of it. Nothing in this crate depends on time or on a host.

pub mod geometry;
pub mod model;
pub mod script;
pub mod timing;

pub use geometry::{CubicBezier, Point, Rect};
pub use model::{DiagramSpec, Link, LinkKind, Node, NodeKind, SpecError, sanitize_value};
pub use script::{
    AnchoredMetric, Callout, Metric, NarrativeBucket, NarrativeScript, PhaseScript,
    visible_callout_count,
};
pub use timing::{
    MIN_DURATION, PhaseSchedule, TimingConfig, TimingOverrides, duration_from_ms, duration_ms,
};
