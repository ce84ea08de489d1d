#![forbid(unsafe_code)]

//! Layered flow-diagram layout.
//!
//! [`layout`] turns a [`DiagramSpec`](flowcast_core::DiagramSpec) and a
//! viewport into a [`DiagramLayout`]: one [`LayoutNode`] per unique node id,
//! one [`LayoutLink`] per link whose endpoints exist, and a
//! [`LinkSetSignature`] identifying the link set.
//!
//! # Example
//! ```
//! use flowcast_core::{DiagramSpec, Link, Node};
//! use flowcast_layout::{LayoutConfig, layout};
//!
//! let spec = DiagramSpec::new(
//!     vec![Node::new("in", 0, 10.0), Node::new("out", 1, 10.0)],
//!     vec![Link::new("in", "out", 10.0)],
//! );
//! let l = layout(&spec, &LayoutConfig::default(), 800.0, 400.0);
//! assert_eq!(l.links.len(), 1);
//! assert!(l.node("in").unwrap().x < l.node("out").unwrap().x);
//! ```

mod config;
mod engine;

pub use config::LayoutConfig;
pub use engine::{
    DiagramLayout, LayoutLink, LayoutNode, LinkKey, LinkSetSignature, NodeBox, NodePositions,
    layout,
};
