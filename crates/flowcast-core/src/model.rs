#![forbid(unsafe_code)]

//! Diagram input model: nodes, links, and their kind tags.
//!
//! A [`DiagramSpec`] is opaque content supplied by a template store. It is
//! immutable for the duration of one render and is never validated strictly:
//! layout drops what it cannot place instead of rejecting the whole diagram.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "leads", "label": "Leads", "layer": 0, "value": 120, "kind": "source" },
//!     { "id": "churn", "label": "Churn", "layer": 1, "value": 30, "kind": "loss", "y": 0.8 }
//!   ],
//!   "links": [
//!     { "from": "leads", "to": "churn", "value": 30, "kind": "loss" }
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Emphasis tag for a node. Drives color only, never layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Default,
    Source,
    Solution,
    Loss,
    New,
    Revenue,
}

impl NodeKind {
    /// All kinds in declaration order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Default,
        NodeKind::Source,
        NodeKind::Solution,
        NodeKind::Loss,
        NodeKind::New,
        NodeKind::Revenue,
    ];

    /// Stable lowercase name (matches the JSON tag).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Source => "source",
            Self::Solution => "solution",
            Self::Loss => "loss",
            Self::New => "new",
            Self::Revenue => "revenue",
        }
    }
}

/// Emphasis tag for a link. `Loss` links render as static drains and carry
/// no particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Default,
    Loss,
    New,
    Revenue,
}

impl LinkKind {
    /// All kinds in declaration order.
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Default,
        LinkKind::Loss,
        LinkKind::New,
        LinkKind::Revenue,
    ];

    /// Stable lowercase name (matches the JSON tag).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Loss => "loss",
            Self::New => "new",
            Self::Revenue => "revenue",
        }
    }

    /// Whether particles flow along links of this kind.
    #[inline]
    #[must_use]
    pub const fn carries_flow(self) -> bool {
        !matches!(self, Self::Loss)
    }

    /// Small integer code used by flat host buffers.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Loss => 1,
            Self::New => 2,
            Self::Revenue => 3,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Nodes and links
// ---------------------------------------------------------------------------

/// A node in the layered diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within one diagram.
    pub id: String,
    /// Display label. Empty labels fall back to the id.
    #[serde(default)]
    pub label: String,
    /// Horizontal stage (0-based).
    #[serde(default)]
    pub layer: usize,
    /// Magnitude; drives the rendered height.
    #[serde(default)]
    pub value: f64,
    /// Normalized vertical position in `[0, 1]`. `None` distributes evenly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default)]
    pub kind: NodeKind,
}

impl Node {
    /// Create a default-kind node with automatic vertical placement.
    #[must_use]
    pub fn new(id: impl Into<String>, layer: usize, value: f64) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            layer,
            value,
            y: None,
            kind: NodeKind::Default,
        }
    }

    /// Set the label (builder pattern).
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the kind (builder pattern).
    #[must_use]
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Pin the normalized vertical position (builder pattern).
    #[must_use]
    pub fn at_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    /// Label to render, falling back to the id when the label is blank.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// A directed, valued edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub kind: LinkKind,
}

impl Link {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, value: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value,
            kind: LinkKind::Default,
        }
    }

    /// Set the kind (builder pattern).
    #[must_use]
    pub fn kind(mut self, kind: LinkKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Sanitize a magnitude: non-finite and negative values become `0`.
#[inline]
#[must_use]
pub fn sanitize_value(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// DiagramSpec
// ---------------------------------------------------------------------------

/// The complete input graph for one render.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramSpec {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl DiagramSpec {
    #[must_use]
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    /// Parse a diagram from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, SpecError> {
        serde_json::from_str(s).map_err(SpecError::Json)
    }

    /// Number of layers spanned (`max(layer) + 1`, or 0 for an empty diagram).
    ///
    /// Layers with no nodes in between still count: a diagram with nodes on
    /// layers 0 and 2 spans three layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.layer.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Look up a node by id (first occurrence wins).
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to decode diagram or script content.
///
/// Only adapters that parse raw content produce this; the layout and
/// animation paths never fail on data.
#[derive(Debug)]
pub enum SpecError {
    /// The JSON could not be decoded into the expected shape.
    Json(serde_json::Error),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid diagram content: {err}"),
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
