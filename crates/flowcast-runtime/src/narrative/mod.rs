//! Narrative phase control.
//!
//! Two variants share one [`NarrativeController`]:
//!
//! - `before`: a self-timed reveal. Layers draw in with a stagger, then the
//!   loss links pulse (bleed), then summary metrics appear (ready), then the
//!   run completes.
//! - `after`: a two-step reveal (`shift`, `result`) that follows an
//!   externally supplied build progress and owns no timing.
//!
//! [`signals`] holds the pure math; the controller adds activation edges,
//! the start-once latch, the monotonic guard and timeline reporting.

mod controller;
mod phase;
pub mod signals;
mod state;

pub use controller::{NarrativeConfig, NarrativeController};
pub use phase::{AfterPhase, BeforePhase, NarrativePhase, Variant};
pub use state::NarrativeState;
