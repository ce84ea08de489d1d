#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use flowcast_core::NarrativeBucket;
use serde::{Deserialize, Serialize};

/// Which reveal the controller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Self-timed reveal: setup layers, loss bleed, summary.
    #[default]
    Before,
    /// Two-step reveal driven by external build progress.
    After,
}

impl Variant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(format!("unknown variant `{other}` (expected `before` or `after`)")),
        }
    }
}

/// Phases of the self-timed reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeforePhase {
    Idle,
    /// Drawing in layers; the payload is the latest layer that has started.
    Setup(usize),
    Bleed,
    Ready,
    Complete,
}

/// Phases of the progress-driven reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AfterPhase {
    Idle,
    Shift,
    Result,
}

/// A phase of either variant.
///
/// Phases of the same variant are totally ordered along the run; phases of
/// different variants are incomparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarrativePhase {
    Before(BeforePhase),
    After(AfterPhase),
}

impl NarrativePhase {
    #[must_use]
    pub const fn idle(variant: Variant) -> Self {
        match variant {
            Variant::Before => Self::Before(BeforePhase::Idle),
            Variant::After => Self::After(AfterPhase::Idle),
        }
    }

    #[must_use]
    pub const fn terminal(variant: Variant) -> Self {
        match variant {
            Variant::Before => Self::Before(BeforePhase::Complete),
            Variant::After => Self::After(AfterPhase::Result),
        }
    }

    #[must_use]
    pub const fn variant(self) -> Variant {
        match self {
            Self::Before(_) => Variant::Before,
            Self::After(_) => Variant::After,
        }
    }

    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::idle(self.variant())
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::terminal(self.variant())
    }

    /// Position along the run; later phases rank higher.
    fn rank(self) -> (u8, usize) {
        match self {
            Self::Before(BeforePhase::Idle) | Self::After(AfterPhase::Idle) => (0, 0),
            Self::Before(BeforePhase::Setup(i)) => (1, i),
            Self::After(AfterPhase::Shift) => (1, 0),
            Self::Before(BeforePhase::Bleed) | Self::After(AfterPhase::Result) => (2, 0),
            Self::Before(BeforePhase::Ready) => (3, 0),
            Self::Before(BeforePhase::Complete) => (4, 0),
        }
    }

    /// Narrative text bucket for this phase, if any.
    ///
    /// `ready` and `complete` keep showing the bleed text.
    #[must_use]
    pub const fn bucket(self) -> Option<NarrativeBucket> {
        match self {
            Self::Before(BeforePhase::Idle) | Self::After(AfterPhase::Idle) => None,
            Self::Before(BeforePhase::Setup(_)) => Some(NarrativeBucket::Setup),
            Self::Before(BeforePhase::Bleed | BeforePhase::Ready | BeforePhase::Complete) => {
                Some(NarrativeBucket::Bleed)
            }
            Self::After(AfterPhase::Shift) => Some(NarrativeBucket::Shift),
            Self::After(AfterPhase::Result) => Some(NarrativeBucket::Result),
        }
    }

    /// Stable label such as `setup-2` or `result`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Before(BeforePhase::Setup(i)) => format!("setup-{i}"),
            Self::Before(BeforePhase::Idle) | Self::After(AfterPhase::Idle) => "idle".into(),
            Self::Before(BeforePhase::Bleed) => "bleed".into(),
            Self::Before(BeforePhase::Ready) => "ready".into(),
            Self::Before(BeforePhase::Complete) => "complete".into(),
            Self::After(AfterPhase::Shift) => "shift".into(),
            Self::After(AfterPhase::Result) => "result".into(),
        }
    }

    /// The setup layer currently drawing, if in setup.
    #[must_use]
    pub const fn setup_layer(self) -> Option<usize> {
        match self {
            Self::Before(BeforePhase::Setup(i)) => Some(i),
            _ => None,
        }
    }
}

impl PartialOrd for NarrativePhase {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.variant() != other.variant() {
            return None;
        }
        Some(self.rank().cmp(&other.rank()))
    }
}

impl fmt::Display for NarrativePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for NarrativePhase {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_phases_are_ordered() {
        let seq = [
            BeforePhase::Idle,
            BeforePhase::Setup(0),
            BeforePhase::Setup(3),
            BeforePhase::Bleed,
            BeforePhase::Ready,
            BeforePhase::Complete,
        ]
        .map(NarrativePhase::Before);
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn variants_do_not_compare() {
        let a = NarrativePhase::Before(BeforePhase::Bleed);
        let b = NarrativePhase::After(AfterPhase::Result);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn buckets_map_ready_and_complete_to_bleed() {
        use NarrativeBucket as B;
        assert_eq!(NarrativePhase::Before(BeforePhase::Ready).bucket(), Some(B::Bleed));
        assert_eq!(NarrativePhase::Before(BeforePhase::Complete).bucket(), Some(B::Bleed));
        assert_eq!(NarrativePhase::Before(BeforePhase::Setup(1)).bucket(), Some(B::Setup));
        assert_eq!(NarrativePhase::After(AfterPhase::Shift).bucket(), Some(B::Shift));
        assert_eq!(NarrativePhase::idle(Variant::After).bucket(), None);
    }

    #[test]
    fn labels_and_parsing() {
        assert_eq!(NarrativePhase::Before(BeforePhase::Setup(2)).to_string(), "setup-2");
        assert_eq!(NarrativePhase::terminal(Variant::After).to_string(), "result");
        assert_eq!("AFTER".parse::<Variant>(), Ok(Variant::After));
        assert!("sideways".parse::<Variant>().is_err());
    }
}
