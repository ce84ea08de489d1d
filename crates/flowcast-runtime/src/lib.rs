#![forbid(unsafe_code)]

//! Runtime: host-driven frame loops, cancellation, and narrative control.
//!
//! Nothing here schedules its own callbacks. The embedding host calls into
//! a [`FrameLoop`] or a [`NarrativeController`] once per animation frame
//! with its current timestamp, and asks [`NarrativeController::wants_frame`]
//! whether to keep doing so.

pub mod cancellation;
pub mod clock;
pub mod frame_loop;
pub mod narrative;
pub mod run_trace;

pub use cancellation::{CancellationSource, CancellationToken};
pub use clock::{Clock, ManualClock, WallClock};
pub use frame_loop::{FrameLoop, StartLatch};
pub use narrative::{
    AfterPhase, BeforePhase, NarrativeConfig, NarrativeController, NarrativePhase,
    NarrativeState, Variant,
};
#[cfg(feature = "jsonl")]
pub use run_trace::JsonlSink;
pub use run_trace::{
    CancelReason, MemorySink, TIMELINE_SCHEMA_VERSION, TimelineEvent, TimelineSink, TracingSink,
};
