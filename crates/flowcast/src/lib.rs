#![forbid(unsafe_code)]

//! flowcast public facade.
//!
//! Animated, narrated flow diagrams: a layered layout, a particle field
//! along every link, a phase controller that reveals the diagram as a story,
//! and a render surface that paints all three. This crate re-exports the
//! workspace crates, unifies their adapter errors and loads configuration.
//!
//! ```
//! use flowcast::prelude::*;
//!
//! let spec = DiagramSpec::new(
//!     vec![Node::new("in", 0, 10.0), Node::new("out", 1, 10.0)],
//!     vec![Link::new("in", "out", 10.0)],
//! );
//! let mut runner = DiagramRunner::new(RunnerConfig::default(), Variant::Before);
//! runner.resize(800.0, 400.0, 1.0)?;
//! runner.load(spec, NarrativeScript::default(), Duration::ZERO);
//! runner.set_active(true, Duration::ZERO);
//! assert!(runner.frame(Duration::from_millis(16)).is_some());
//! # Ok::<(), flowcast::Error>(())
//! ```

#[cfg(feature = "config")]
pub mod config;
pub mod error;

#[cfg(feature = "config")]
pub use config::{FlowcastConfig, ViewportConfig};
pub use error::{ConfigError, DegradationAction, Error, Result};

pub use flowcast_core as core;
pub use flowcast_fx as fx;
pub use flowcast_layout as layout;
pub use flowcast_render as render;
pub use flowcast_runtime as runtime;
pub use flowcast_web as web;

pub mod prelude {
    #[cfg(feature = "config")]
    pub use crate::FlowcastConfig;
    pub use crate::{DegradationAction, Error, Result};

    pub use flowcast_core::{
        DiagramSpec, Link, LinkKind, NarrativeScript, Node, NodeKind, TimingConfig,
        TimingOverrides,
    };
    pub use flowcast_fx::{ParticleConfig, ParticleSimulation};
    pub use flowcast_layout::{DiagramLayout, LayoutConfig, layout};
    pub use flowcast_render::{OverlaySet, RenderConfig, RenderSurface, VectorScene};
    pub use flowcast_runtime::{
        Clock, ManualClock, NarrativeConfig, NarrativeController, NarrativeState, Variant,
        WallClock,
    };
    pub use flowcast_web::{DiagramRunner, RunnerConfig};
    pub use web_time::Duration;
}
