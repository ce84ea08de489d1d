#![forbid(unsafe_code)]

//! `flowcast` command line: SVG snapshots, phase schedules and layout
//! dumps computed without a browser.

pub mod cli;
pub mod error;
pub mod input;
pub mod layout;
pub mod render;
pub mod timeline;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
