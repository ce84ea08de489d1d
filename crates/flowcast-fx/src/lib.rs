#![forbid(unsafe_code)]

//! Flow particles for layered diagrams.
//!
//! A [`ParticleSimulation`] owns one marker set per diagram. Call
//! [`sync`](ParticleSimulation::sync) whenever a new layout is computed and
//! [`step`](ParticleSimulation::step) once per frame; the returned
//! [`ParticleSprite`]s are ready to paint.
//!
//! Randomness is seeded from the layout's link-set signature unless
//! [`ParticleConfig::seed`] is set, so a given diagram always starts with
//! the same field.

mod config;
mod particles;

pub use config::ParticleConfig;
pub use particles::{Particle, ParticleSimulation, ParticleSprite, SyncOutcome};
