#![forbid(unsafe_code)]

//! Render surface for flowcast diagrams.
//!
//! Three layers, painted back to front:
//!
//! - a persistent [`VectorScene`] of node boxes and link curves, built once
//!   per layout and restyled every frame;
//! - a [`RasterSurface`] repainted every frame with particle sprites, sized
//!   for the device pixel ratio;
//! - an [`OverlaySet`] of labels, metric cards and callouts recomposed from
//!   the narrative state.
//!
//! [`RenderSurface`] bundles the three with pointer hit testing. Nothing
//! here touches a real canvas; hosts consume [`SurfaceFrame`], the SVG from
//! [`VectorScene::to_svg`] and the buffer from [`RasterFrame::to_buffer`].

mod config;
pub mod hit;
pub mod overlay;
mod palette;
pub mod raster;
mod surface;
pub mod vector;

pub use config::RenderConfig;
pub use hit::{NodeEvent, PointerTracker, hit_test, hit_test_where};
pub use overlay::{ActionState, CalloutBadge, MetricCard, OverlaySet, StageLabel};
pub use palette::{Palette, Rgba};
pub use raster::{DrawOp, PARTICLE_STRIDE, RasterFrame, RasterSurface, SurfaceError};
pub use surface::{PointerEvents, RenderSurface, SurfaceFrame};
pub use vector::{Emphasis, LinkShape, NodeShape, VectorScene, escape_xml};
