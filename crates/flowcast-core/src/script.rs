#![forbid(unsafe_code)]

//! Narrative script: header text, node-keyed callouts, and metric copy.
//!
//! Scripts are opaque content. The runtime only decides which parts are
//! visible at a given moment; it never interprets the text or the metric
//! values.

use serde::{Deserialize, Serialize};

use crate::model::SpecError;

/// One of the four narrative buckets a phase maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeBucket {
    Setup,
    Bleed,
    Shift,
    Result,
}

impl NarrativeBucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Bleed => "bleed",
            Self::Shift => "shift",
            Self::Result => "result",
        }
    }
}

/// A short text attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    pub node_id: String,
    pub text: String,
}

impl Callout {
    #[must_use]
    pub fn new(node_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            text: text.into(),
        }
    }
}

/// Header and ordered callouts for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseScript {
    pub header: Option<String>,
    pub callouts: Vec<Callout>,
}

/// A highlighted metric pinned to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredMetric {
    pub node_id: String,
    pub label: String,
    pub value: String,
}

/// A summary metric card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// The full narrative content for one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeScript {
    pub setup: PhaseScript,
    pub bleed: PhaseScript,
    pub shift: PhaseScript,
    pub result: PhaseScript,
    pub anchored_metric: Option<AnchoredMetric>,
    pub metrics: Vec<Metric>,
    pub insight: Option<String>,
}

impl NarrativeScript {
    /// Parse a script from JSON. Every field is optional.
    pub fn from_json_str(s: &str) -> Result<Self, SpecError> {
        serde_json::from_str(s).map_err(SpecError::Json)
    }

    /// Script for the given bucket.
    #[must_use]
    pub fn phase(&self, bucket: NarrativeBucket) -> &PhaseScript {
        match bucket {
            NarrativeBucket::Setup => &self.setup,
            NarrativeBucket::Bleed => &self.bleed,
            NarrativeBucket::Shift => &self.shift,
            NarrativeBucket::Result => &self.result,
        }
    }

    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn has_anchored_metric(&self) -> bool {
        self.anchored_metric.is_some()
    }
}

/// Number of callouts visible out of `total` at phase-local progress `p`.
///
/// Callout `k` appears once `p` reaches `(k + 1) / (total + 1)`, so any
/// number of callouts staggers evenly across the phase.
#[must_use]
pub fn visible_callout_count(progress: f64, total: usize) -> usize {
    if total == 0 || !progress.is_finite() || progress <= 0.0 {
        return 0;
    }
    let raw = (progress * (total as f64 + 1.0)).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_empty_script() {
        let script = NarrativeScript::from_json_str("{}").unwrap();
        assert_eq!(script, NarrativeScript::default());
        assert_eq!(script.metric_count(), 0);
        assert!(!script.has_anchored_metric());
    }

    #[test]
    fn phase_lookup_matches_bucket() {
        let script = NarrativeScript::from_json_str(
            r#"{"bleed":{"header":"Where it leaks","callouts":[{"node_id":"n","text":"t"}]}}"#,
        )
        .unwrap();
        assert_eq!(
            script.phase(NarrativeBucket::Bleed).header.as_deref(),
            Some("Where it leaks")
        );
        assert!(script.phase(NarrativeBucket::Setup).header.is_none());
        assert_eq!(script.phase(NarrativeBucket::Bleed).callouts.len(), 1);
    }

    #[test]
    fn callouts_stagger_evenly() {
        // Three callouts: thresholds at 0.25, 0.5, 0.75.
        assert_eq!(visible_callout_count(0.0, 3), 0);
        assert_eq!(visible_callout_count(0.24, 3), 0);
        assert_eq!(visible_callout_count(0.25, 3), 1);
        assert_eq!(visible_callout_count(0.6, 3), 2);
        assert_eq!(visible_callout_count(0.8, 3), 3);
        assert_eq!(visible_callout_count(1.0, 3), 3);
        assert_eq!(visible_callout_count(7.0, 3), 3);
    }

    #[test]
    fn callouts_ignore_garbage_progress() {
        assert_eq!(visible_callout_count(f64::NAN, 4), 0);
        assert_eq!(visible_callout_count(-1.0, 4), 0);
        assert_eq!(visible_callout_count(0.9, 0), 0);
    }
}
