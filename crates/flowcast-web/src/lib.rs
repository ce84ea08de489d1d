#![forbid(unsafe_code)]

//! Host-driven runner for flowcast diagrams.
//!
//! [`DiagramRunner`] owns one mounted visualization and never schedules its
//! own callbacks: the host calls [`DiagramRunner::frame`] from its
//! animation callback and stops once [`DiagramRunner::wants_frame`] says so.
//! On `wasm32` the same runner is exported to JavaScript as
//! `FlowcastRunner`.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FlowcastRunner;

pub mod runner_core;

pub use runner_core::{DiagramRunner, RunnerConfig, RunnerError, host_time};
