use crate::geometry::{AnchorSet, BoundingBox};
use crate::matcher::MatchMethod;

/// Outcome of one locate call.
///
/// A miss carries no geometry at all; box and anchors only exist on a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    Found(MatchHit),
    /// No attempt reached the confidence threshold.
    NotFound { attempts: u32 },
}

impl MatchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchOutcome::Found(_))
    }

    pub fn hit(&self) -> Option<&MatchHit> {
        match self {
            MatchOutcome::Found(hit) => Some(hit),
            MatchOutcome::NotFound { .. } => None,
        }
    }
}

/// A template located on screen, with its geometry attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchHit {
    /// Normalized similarity in [0, 1].
    pub confidence: f64,
    pub bounds: BoundingBox,
    pub anchors: AnchorSet,
    /// The strategy that produced the winning score.
    pub method: MatchMethod,
}
