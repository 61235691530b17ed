//! Read-only export of segment internals for logging and offline inspection.

use serde::Serialize;

use crate::polynomial::{CoeffValues, FreeCoefficients, PhaseKind, PolynomialSegment};

/// Copy of one segment's state at the time it was taken.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentSnapshot {
    pub id: usize,
    pub phase: PhaseKind,
    pub duration: f64,
    pub coefficients: CoeffValues,
    pub free_mask: FreeCoefficients,
    /// Number of coefficients exposed to the optimizer.
    pub free_parameters: usize,
}

impl From<&PolynomialSegment> for SegmentSnapshot {
    fn from(seg: &PolynomialSegment) -> Self {
        Self {
            id: seg.id(),
            phase: seg.kind(),
            duration: seg.duration(),
            coefficients: *seg.coefficients(),
            free_mask: *seg.free_mask(),
            free_parameters: seg.free_parameter_count(),
        }
    }
}
